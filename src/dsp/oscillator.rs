//! Band-limited oscillators driven by a per-sample frequency.

use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Value at `phase` in [0, 1). `step` is the phase advance per sample and
    /// sizes the PolyBLEP correction around each discontinuity.
    fn shape(self, phase: f64, step: f64) -> f64 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Sawtooth => 2.0 * phase - 1.0 - blep(phase, step),
            Waveform::Square => {
                let level = if phase < 0.5 { 1.0 } else { -1.0 };
                level + blep(phase, step) - blep((phase + 0.5).fract(), step)
            }
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

/// Oscillator state: phase plus a fixed detune.
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    sample_rate: f64,
    phase: f64,
    /// `2^(cents/1200)`.
    detune_ratio: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            sample_rate,
            phase: 0.0,
            detune_ratio: 1.0,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Detune in cents, applied on top of every frequency passed in.
    pub fn set_detune(&mut self, cents: f64) {
        self.detune_ratio = 2.0_f64.powf(cents / 1200.0);
    }

    pub fn next_sample(&mut self, frequency: f64) -> f64 {
        let step = (frequency * self.detune_ratio / self.sample_rate).clamp(0.0, 0.5);
        let out = self.waveform.shape(self.phase, step);
        self.phase = (self.phase + step).fract();
        out
    }
}

/// Two-sample polynomial step correction for a unit discontinuity at phase 0.
fn blep(phase: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return 0.0;
    }
    if phase < step {
        let x = phase / step;
        2.0 * x - x * x - 1.0
    } else if phase > 1.0 - step {
        let x = (phase - 1.0) / step;
        x * x + 2.0 * x + 1.0
    } else {
        0.0
    }
}
