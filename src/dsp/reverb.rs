//! Streaming convolution reverb with a generated noise impulse.
//!
//! The impulse is white noise under a `(1 - t/length)^decay` envelope, one
//! independent channel per side. It is cut into partitions of [`PARTITION`]
//! samples whose spectra are computed once. Each input block is transformed
//! and joins a line of past spectra; the block's output is the sum of those
//! spectra multiplied by the matching impulse partitions, overlap-added with
//! the previous block's tail. The result is exact linear convolution with no
//! added latency.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::Rng;
use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use crate::error::Error;

use super::noise::decaying_impulse;

/// Samples per impulse partition and per input block.
pub const PARTITION: usize = 512;

// ConvolverNode normalization constants.
const GAIN_CALIBRATION: f64 = 0.00125;
const GAIN_CALIBRATION_SAMPLE_RATE: f64 = 44100.0;
const MIN_POWER: f64 = 0.000125;

/// One output side: its impulse spectra and the tail carried into the next block.
struct Side {
    partitions: Vec<Vec<Complex<f32>>>,
    overlap: Vec<f32>,
}

/// A stereo convolution reverb fed one block at a time.
pub struct ConvolutionReverb {
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
    /// Spectra of recent input blocks, newest first.
    history: VecDeque<Vec<Complex<f32>>>,
    sides: [Side; 2],
    impulse_len: usize,
}

impl ConvolutionReverb {
    /// Build from an explicit stereo impulse. The impulse is normalized the way
    /// a WebAudio `ConvolverNode` normalizes its buffer.
    pub fn new(left: &[f32], right: &[f32], sample_rate: f64) -> Result<Self, Error> {
        let scale = normalization_scale(left, right, sample_rate) as f32;
        let impulse_len = left.len().max(right.len());
        let count = impulse_len.div_ceil(PARTITION);

        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(2 * PARTITION);
        let inverse = planner.plan_fft_inverse(2 * PARTITION);

        let side = |impulse: &[f32]| -> Result<Side, Error> {
            let mut partitions = Vec::with_capacity(count);
            for n in 0..count {
                let start = (n * PARTITION).min(impulse.len());
                let end = (start + PARTITION).min(impulse.len());
                let mut frame = forward.make_input_vec();
                for (slot, &s) in frame.iter_mut().zip(&impulse[start..end]) {
                    *slot = s * scale;
                }
                let mut spectrum = forward.make_output_vec();
                forward.process(&mut frame, &mut spectrum)?;
                partitions.push(spectrum);
            }
            Ok(Side {
                partitions,
                overlap: vec![0.0; PARTITION],
            })
        };
        let sides = [side(left)?, side(right)?];

        let history = (0..count).map(|_| forward.make_output_vec()).collect();
        Ok(ConvolutionReverb {
            forward,
            inverse,
            history,
            sides,
            impulse_len,
        })
    }

    /// Generate a fresh impulse of `length` seconds with the given decay power.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, sample_rate: f64, length: f64, decay: f64) -> Result<Self, Error> {
        let left = decaying_impulse(rng, sample_rate, length, decay);
        let right = decaying_impulse(rng, sample_rate, length, decay);
        Self::new(&left, &right, sample_rate)
    }

    /// Impulse length in samples.
    pub fn len(&self) -> usize {
        self.impulse_len
    }

    pub fn is_empty(&self) -> bool {
        self.impulse_len == 0
    }

    /// Convolve the next block of a mono signal with both impulse sides.
    ///
    /// Blocks hold [`PARTITION`] samples; only the last block of a signal may
    /// be shorter. Returns fully wet (left, right) blocks of the input's length.
    pub fn process_block(&mut self, input: &[f32]) -> Result<(Vec<f32>, Vec<f32>), Error> {
        let len = input.len().min(PARTITION);
        if self.is_empty() {
            return Ok((vec![0.0; len], vec![0.0; len]));
        }

        let mut frame = self.forward.make_input_vec();
        frame[..len].copy_from_slice(&input[..len]);
        let mut spectrum = self.forward.make_output_vec();
        self.forward.process(&mut frame, &mut spectrum)?;
        self.history.pop_back();
        self.history.push_front(spectrum);

        let [left, right] = &mut self.sides;
        let left = accumulate(self.inverse.as_ref(), &self.history, left, len)?;
        let right = accumulate(self.inverse.as_ref(), &self.history, right, len)?;
        Ok((left, right))
    }
}

/// Sum the spectral products for one side, return `len` output samples and
/// keep the remainder as the next block's overlap.
fn accumulate(
    inverse: &dyn ComplexToReal<f32>,
    history: &VecDeque<Vec<Complex<f32>>>,
    side: &mut Side,
    len: usize,
) -> Result<Vec<f32>, Error> {
    let mut sum = inverse.make_input_vec();
    for (input, impulse) in history.iter().zip(&side.partitions) {
        for ((acc, x), h) in sum.iter_mut().zip(input).zip(impulse) {
            *acc += x * h;
        }
    }

    // DC and Nyquist bins of a real signal carry no imaginary part.
    if let Some(first) = sum.first_mut() {
        first.im = 0.0;
    }
    if let Some(last) = sum.last_mut() {
        last.im = 0.0;
    }

    let mut time = inverse.make_output_vec();
    inverse.process(&mut sum, &mut time)?;

    let scale = 1.0 / time.len() as f32;
    let (head, tail) = time.split_at(PARTITION);
    let out = head[..len]
        .iter()
        .zip(&side.overlap)
        .map(|(&s, &carried)| s * scale + carried)
        .collect();
    side.overlap = tail.iter().map(|&s| s * scale).collect();
    Ok(out)
}

/// Scale applied to an impulse so that differently sized impulses produce
/// comparable loudness.
fn normalization_scale(left: &[f32], right: &[f32], sample_rate: f64) -> f64 {
    let samples = left.len() + right.len();
    if samples == 0 {
        return 1.0;
    }
    let energy: f64 = left
        .iter()
        .chain(right)
        .map(|&s| (s as f64) * (s as f64))
        .sum();
    let power = (energy / samples as f64).sqrt().max(MIN_POWER);
    let scale = GAIN_CALIBRATION / power;
    scale * GAIN_CALIBRATION_SAMPLE_RATE / sample_rate
}
