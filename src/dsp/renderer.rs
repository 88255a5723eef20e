//! Session renderer: turns a `SessionGraph` into stereo samples.
//!
//! Routing: every voice sums onto a mono master bus scaled by the chain's
//! master gain. The bus feeds the dry path and each wet send (reverb, delay,
//! chorus); all paths sum into the stereo output.
//!
//! Rendering is incremental. A [`SessionStream`] yields the session in
//! chunks of [`CHUNK_FRAMES`], so live playback can queue the opening chunk
//! long before the whole session is done.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::trace;

use crate::config::check_sample_rate;
use crate::error::Error;
use crate::graph::SessionGraph;

use super::chorus::Chorus;
use super::delay::FeedbackDelay;
use super::reverb::{ConvolutionReverb, PARTITION};
use super::voice::Voice;

/// Frames per streamed chunk. A whole number of reverb partitions.
pub const CHUNK_FRAMES: usize = 4 * PARTITION;

/// Rendered stereo audio.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoBuffer {
    pub sample_rate: u32,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoBuffer {
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample on either side.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(&self.right)
            .fold(0.0_f32, |m, s| m.max(s.abs()))
    }

    /// Interleaved L/R samples (for AudioWorklet playback).
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frames() * 2);
        for (&l, &r) in self.left.iter().zip(&self.right) {
            out.push(l);
            out.push(r);
        }
        out
    }

    /// Interleaved stereo i16 PCM (for WAV export).
    pub fn to_pcm_i16(&self) -> Vec<i16> {
        self.interleaved()
            .iter()
            .map(|&s| (s as f64 * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
            .collect()
    }
}

/// Incremental renderer for one session, from its origin until the effects
/// have decayed.
pub struct SessionStream {
    sample_rate: u32,
    origin: f64,
    voices: Vec<Voice>,
    rng: Pcg32,
    master_gain: f64,
    dry: f32,
    reverb: Option<(ConvolutionReverb, f64)>,
    delay: Option<(FeedbackDelay, f32)>,
    chorus: Option<(Chorus, f32)>,
    position: usize,
    total: usize,
}

impl SessionStream {
    pub fn new(graph: &SessionGraph, sample_rate: u32) -> Result<Self, Error> {
        check_sample_rate(sample_rate)?;
        let sr = sample_rate as f64;
        let mut rng = Pcg32::seed_from_u64(graph.seed);
        let fx = &graph.effects;

        let reverb = match fx.reverb {
            Some(r) => Some((ConvolutionReverb::generate(&mut rng, sr, r.length, r.decay)?, r.wet)),
            None => None,
        };

        Ok(SessionStream {
            sample_rate,
            origin: graph.origin,
            voices: graph.voices.iter().map(|v| Voice::new(v, sr)).collect(),
            rng,
            master_gain: fx.master_gain,
            dry: fx.dry as f32,
            reverb,
            delay: fx
                .delay
                .map(|d| (FeedbackDelay::new(sr, d.time, d.feedback), d.wet as f32)),
            chorus: fx
                .chorus
                .map(|c| (Chorus::new(sr, c.delay, c.depth, c.rate), c.wet as f32)),
            position: 0,
            total: (graph.render_length() * sr).ceil().max(0.0) as usize,
        })
    }

    /// Length of the whole session in frames.
    pub fn total_frames(&self) -> usize {
        self.total
    }

    /// Frames already produced.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Render the next chunk, or `None` once the session is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<StereoBuffer>, Error> {
        let frames = (self.total - self.position).min(CHUNK_FRAMES);
        if frames == 0 {
            return Ok(None);
        }

        let mut bus = vec![0.0_f64; frames];
        for voice in &mut self.voices {
            voice.render_into(self.origin, self.position, &mut self.rng, &mut bus);
        }

        let master: Vec<f32> = bus.iter().map(|&s| (s * self.master_gain) as f32).collect();
        let mut left: Vec<f32> = master.iter().map(|&s| s * self.dry).collect();
        let mut right = left.clone();

        if let Some((reverb, wet)) = &mut self.reverb {
            for (n, block) in master.chunks(PARTITION).enumerate() {
                let (wet_l, wet_r) = reverb.process_block(block)?;
                let at = n * PARTITION;
                mix_into(&mut left[at..], &wet_l, *wet);
                mix_into(&mut right[at..], &wet_r, *wet);
            }
        }

        if let Some((delay, wet)) = &mut self.delay {
            for (i, &s) in master.iter().enumerate() {
                let echo = delay.process(s) * *wet;
                left[i] += echo;
                right[i] += echo;
            }
        }

        if let Some((chorus, wet)) = &mut self.chorus {
            for (i, &s) in master.iter().enumerate() {
                let (l, r) = chorus.process(s);
                left[i] += l * *wet;
                right[i] += r * *wet;
            }
        }

        self.position += frames;
        Ok(Some(StereoBuffer {
            sample_rate: self.sample_rate,
            left,
            right,
        }))
    }
}

impl Iterator for SessionStream {
    type Item = Result<StereoBuffer, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

/// Render a whole session in one go.
pub fn render_session(graph: &SessionGraph, sample_rate: u32) -> Result<StereoBuffer, Error> {
    let stream = SessionStream::new(graph, sample_rate)?;
    let frames = stream.total_frames();
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for chunk in stream {
        let chunk = chunk?;
        left.extend(chunk.left);
        right.extend(chunk.right);
    }

    trace!(
        mode = %graph.mode,
        voices = graph.voices.len(),
        frames,
        "rendered session"
    );

    Ok(StereoBuffer { sample_rate, left, right })
}

fn mix_into(target: &mut [f32], wet: &[f32], gain: f64) {
    let gain = gain as f32;
    for (t, &w) in target.iter_mut().zip(wet) {
        *t += w * gain;
    }
}

/// Render a session to a WAV file as bytes (16-bit stereo PCM).
pub fn render_wav(graph: &SessionGraph, sample_rate: u32) -> Result<Vec<u8>, Error> {
    let buffer = render_session(graph, sample_rate)?;
    Ok(encode_wav(&buffer.to_pcm_i16(), sample_rate, 2))
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
