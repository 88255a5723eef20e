//! Signal-graph descriptions.
//!
//! Voice and effects recipes are pure functions that return these values; the
//! renderer in `dsp::renderer` instantiates them. All times are absolute render
//! times in seconds, so one description can be placed anywhere on the shared
//! render clock.

use crate::dsp::automation::Automation;
use crate::dsp::delay::feedback_tail;
use crate::dsp::filter::FilterType;
use crate::dsp::oscillator::Waveform;
use crate::mode::Mode;

/// Periodic pitch modulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vibrato {
    /// LFO rate in Hz.
    pub rate: f64,
    /// Peak deviation in Hz.
    pub depth: f64,
}

/// What a layer plays.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Oscillator {
        waveform: Waveform,
        frequency: Automation,
        /// Detune in cents.
        detune: f64,
        vibrato: Option<Vibrato>,
    },
    /// Uniform white noise.
    Noise,
}

impl Source {
    /// A steady oscillator.
    pub fn tone(waveform: Waveform, frequency: f64) -> Self {
        Self::glide(waveform, Automation::constant(frequency))
    }

    /// An oscillator following a pitch curve.
    pub fn glide(waveform: Waveform, frequency: Automation) -> Self {
        Source::Oscillator {
            waveform,
            frequency,
            detune: 0.0,
            vibrato: None,
        }
    }

    pub fn detuned(mut self, cents: f64) -> Self {
        if let Source::Oscillator { detune, .. } = &mut self {
            *detune = cents;
        }
        self
    }

    pub fn with_vibrato(mut self, rate: f64, depth: f64) -> Self {
        if let Source::Oscillator { vibrato, .. } = &mut self {
            *vibrato = Some(Vibrato { rate, depth });
        }
        self
    }

    pub fn waveform(&self) -> Option<Waveform> {
        match self {
            Source::Oscillator { waveform, .. } => Some(*waveform),
            Source::Noise => None,
        }
    }
}

/// A biquad stage with a possibly automated cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterType,
    pub frequency: Automation,
    pub q: f64,
}

impl FilterSpec {
    pub fn new(kind: FilterType, frequency: f64, q: f64) -> Self {
        Self::sweep(kind, Automation::constant(frequency), q)
    }

    pub fn sweep(kind: FilterType, frequency: Automation, q: f64) -> Self {
        FilterSpec { kind, frequency, q }
    }
}

/// One source → optional filter → gain envelope, alive over `[start, stop)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub source: Source,
    pub filter: Option<FilterSpec>,
    pub gain: Automation,
    pub start: f64,
    pub stop: f64,
}

/// Everything that sounds for one letter.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceGraph {
    /// Position of the letter in the cleaned sequence.
    pub index: usize,
    pub letter: char,
    pub layers: Vec<Layer>,
}

impl VoiceGraph {
    pub fn start(&self) -> f64 {
        self.layers.iter().map(|l| l.start).fold(f64::INFINITY, f64::min)
    }

    pub fn end(&self) -> f64 {
        self.layers.iter().map(|l| l.stop).fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Convolution reverb send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbSpec {
    /// Impulse length in seconds.
    pub length: f64,
    /// Exponent of the impulse envelope.
    pub decay: f64,
    pub wet: f64,
}

/// Feedback delay send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySpec {
    pub time: f64,
    pub feedback: f64,
    pub wet: f64,
}

/// Modulated chorus send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusSpec {
    pub delay: f64,
    pub depth: f64,
    pub rate: f64,
    pub wet: f64,
}

/// The shared bus every voice of a session routes through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectsChain {
    pub master_gain: f64,
    pub dry: f64,
    pub reverb: Option<ReverbSpec>,
    pub delay: Option<DelaySpec>,
    pub chorus: Option<ChorusSpec>,
}

impl EffectsChain {
    /// How long the wet paths keep sounding after the bus goes silent.
    pub fn decay_time(&self) -> f64 {
        let reverb = self.reverb.map_or(0.0, |r| r.length);
        let delay = self.delay.map_or(0.0, |d| feedback_tail(d.time, d.feedback));
        let chorus = self.chorus.map_or(0.0, |c| c.delay + c.depth);
        reverb.max(delay).max(chorus)
    }
}

/// The complete graph for one playback session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGraph {
    pub mode: Mode,
    /// Session start on the render clock.
    pub origin: f64,
    pub voices: Vec<VoiceGraph>,
    pub effects: EffectsChain,
    /// Seed for the reverb impulse and noise sources.
    pub seed: u64,
}

impl SessionGraph {
    /// When the last voice stops.
    pub fn end_time(&self) -> f64 {
        self.voices.iter().map(VoiceGraph::end).fold(self.origin, f64::max)
    }

    /// Seconds of audio needed to hold every voice and the effects decay.
    pub fn render_length(&self) -> f64 {
        self.end_time() - self.origin + self.effects.decay_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(start: f64, stop: f64) -> Layer {
        Layer {
            source: Source::tone(Waveform::Sine, 440.0),
            filter: None,
            gain: Automation::constant(1.0),
            start,
            stop,
        }
    }

    #[test]
    fn voice_bounds_cover_all_layers() {
        let voice = VoiceGraph {
            index: 0,
            letter: 'a',
            layers: vec![layer(1.0, 1.5), layer(0.9, 2.0)],
        };
        assert_eq!(voice.start(), 0.9);
        assert_eq!(voice.end(), 2.0);
    }

    #[test]
    fn source_builders() {
        let s = Source::tone(Waveform::Sine, 220.0).detuned(3.0).with_vibrato(5.0, 1.1);
        match s {
            Source::Oscillator { detune, vibrato, .. } => {
                assert_eq!(detune, 3.0);
                assert_eq!(vibrato, Some(Vibrato { rate: 5.0, depth: 1.1 }));
            }
            Source::Noise => panic!("expected oscillator"),
        }
        assert_eq!(Source::Noise.detuned(3.0), Source::Noise);
    }

    #[test]
    fn decay_time_takes_longest_send() {
        let chain = EffectsChain {
            master_gain: 0.3,
            dry: 0.7,
            reverb: Some(ReverbSpec { length: 2.0, decay: 3.0, wet: 0.3 }),
            delay: Some(DelaySpec { time: 0.15, feedback: 0.2, wet: 0.15 }),
            chorus: None,
        };
        assert_eq!(chain.decay_time(), 2.0);

        let dry_only = EffectsChain { reverb: None, delay: None, ..chain };
        assert_eq!(dry_only.decay_time(), 0.0);
    }

    #[test]
    fn render_length_spans_voices_and_tail() {
        let graph = SessionGraph {
            mode: Mode::Ethereal,
            origin: 10.0,
            voices: vec![VoiceGraph { index: 0, letter: 'a', layers: vec![layer(10.0, 11.5)] }],
            effects: EffectsChain {
                master_gain: 0.3,
                dry: 1.0,
                reverb: Some(ReverbSpec { length: 2.0, decay: 3.0, wet: 0.3 }),
                delay: None,
                chorus: None,
            },
            seed: 0,
        };
        assert!((graph.render_length() - 3.5).abs() < 1e-12);
    }
}
