//! Biquad filter using the WebAudio BiquadFilterNode coefficient formulas.

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Lowpass,
    Bandpass,
}

/// Normalized biquad coefficients (`a0` divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    b: [f64; 3],
    a: [f64; 2],
}

impl Coefficients {
    /// Audio EQ Cookbook designs. `q` is in dB for lowpass and linear for
    /// bandpass, as WebAudio interprets it.
    fn design(kind: FilterType, frequency: f64, q: f64, sample_rate: f64) -> Self {
        let cutoff = frequency.clamp(1.0, (sample_rate * 0.5 * 0.999).max(1.0));
        let w0 = 2.0 * PI * cutoff / sample_rate;
        let (sin, cos) = w0.sin_cos();

        let resonance = match kind {
            FilterType::Lowpass => 10.0_f64.powf(q / 20.0),
            FilterType::Bandpass => q.max(1e-4),
        };
        let alpha = sin / (2.0 * resonance);

        let b = match kind {
            FilterType::Lowpass => {
                let side = (1.0 - cos) / 2.0;
                [side, 1.0 - cos, side]
            }
            FilterType::Bandpass => [alpha, 0.0, -alpha],
        };
        let a0 = 1.0 + alpha;

        Coefficients {
            b: b.map(|x| x / a0),
            a: [-2.0 * cos / a0, (1.0 - alpha) / a0],
        }
    }
}

/// Second-order IIR section in transposed direct form II.
///
/// Changing the cutoff only marks the coefficients stale; they are redesigned
/// lazily on the next sample.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    kind: FilterType,
    frequency: f64,
    q: f64,
    sample_rate: f64,
    coefficients: Coefficients,
    state: [f64; 2],
    stale: bool,
}

impl BiquadFilter {
    pub fn new(kind: FilterType, frequency: f64, q: f64, sample_rate: f64) -> Self {
        BiquadFilter {
            kind,
            frequency,
            q,
            sample_rate,
            coefficients: Coefficients::design(kind, frequency, q, sample_rate),
            state: [0.0; 2],
            stale: false,
        }
    }

    pub fn process(&mut self, input: f64) -> f64 {
        if self.stale {
            self.coefficients = Coefficients::design(self.kind, self.frequency, self.q, self.sample_rate);
            self.stale = false;
        }
        let Coefficients { b, a } = self.coefficients;
        let [s1, s2] = self.state;

        let output = b[0] * input + s1;
        self.state = [b[1] * input - a[0] * output + s2, b[2] * input - a[1] * output];
        output
    }

    /// Move the cutoff (or centre) frequency.
    pub fn set_frequency(&mut self, frequency: f64) {
        if frequency != self.frequency {
            self.frequency = frequency;
            self.stale = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 44100.0;

    /// Steady-state peak response to a unit sine.
    fn response(filter: &mut BiquadFilter, freq: f64) -> f64 {
        (0..8820)
            .map(|i| filter.process((2.0 * PI * freq * i as f64 / RATE).sin()))
            .skip(4410)
            .fold(0.0_f64, |m, s| m.max(s.abs()))
    }

    fn settle(filter: &mut BiquadFilter, samples: usize) -> f64 {
        (0..samples).map(|_| filter.process(1.0)).last().unwrap_or(0.0)
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut f = BiquadFilter::new(FilterType::Lowpass, 5000.0, 0.0, RATE);
        let out = settle(&mut f, 1000);
        assert!((out - 1.0).abs() < 0.001, "Lowpass should pass DC, got {out}");
    }

    #[test]
    fn bandpass_blocks_dc() {
        let mut f = BiquadFilter::new(FilterType::Bandpass, 1000.0, 0.7, RATE);
        let out = settle(&mut f, 4000);
        assert!(out.abs() < 0.001, "Bandpass should block DC, got {out}");
    }

    #[test]
    fn lowpass_attenuates_high_freq() {
        let mut f = BiquadFilter::new(FilterType::Lowpass, 200.0, 0.0, RATE);
        let amp = response(&mut f, 10000.0);
        assert!(amp < 0.01, "200 Hz lowpass left {amp} of a 10 kHz tone");
    }

    #[test]
    fn bandpass_prefers_centre() {
        let mut centre = BiquadFilter::new(FilterType::Bandpass, 1000.0, 1.0, RATE);
        let mut far = BiquadFilter::new(FilterType::Bandpass, 1000.0, 1.0, RATE);
        let at_centre = response(&mut centre, 1000.0);
        let off_centre = response(&mut far, 8000.0);
        assert!(
            at_centre > 0.9 && off_centre < 0.3,
            "Bandpass gain should peak at centre ({at_centre} vs {off_centre})"
        );
    }

    #[test]
    fn cutoff_above_nyquist_is_clamped() {
        let mut f = BiquadFilter::new(FilterType::Lowpass, 30000.0, 0.0, 8000.0);
        assert!((0..500).map(|i| f.process((i % 7) as f64 - 3.0)).all(f64::is_finite));
    }

    #[test]
    fn tiny_sample_rate_does_not_panic() {
        let mut f = BiquadFilter::new(FilterType::Lowpass, 2000.0, 0.0, 1.0);
        assert!(f.process(1.0).is_finite());
    }

    #[test]
    fn sweep_stays_finite() {
        let mut f = BiquadFilter::new(FilterType::Lowpass, 2500.0, 1.0, RATE);
        for i in 0..10000 {
            if i % 32 == 0 {
                f.set_frequency(2500.0 - i as f64 * 0.17);
            }
            let out = f.process(if i % 100 == 0 { 1.0 } else { 0.0 });
            assert!(out.is_finite(), "Filter output not finite at sample {i}");
        }
    }
}
