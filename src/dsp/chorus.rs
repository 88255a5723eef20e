//! Chorus: a stereo modulated delay for thickening sound.
//!
//! Two taps read the same mono delay line, each swept by its own LFO a
//! quarter cycle apart, so the copies drift against each other.

use std::f64::consts::TAU;

/// A mono-in, stereo-out chorus send. Output is fully wet.
#[derive(Debug, Clone)]
pub struct Chorus {
    line: Vec<f32>,
    head: usize,
    sample_rate: f64,
    /// LFO phases for the left and right taps, in cycles.
    lfo: [f64; 2],
    /// LFO rate in Hz.
    rate: f64,
    /// Sweep depth in seconds.
    depth: f64,
    /// Centre delay in seconds.
    delay: f64,
}

impl Chorus {
    pub fn new(sample_rate: f64, delay: f64, depth: f64, rate: f64) -> Self {
        let delay = delay.clamp(0.001, 0.04);
        let depth = depth.clamp(0.0, 0.01);
        let len = (sample_rate * (delay + depth + 0.005)) as usize + 2;

        Chorus {
            line: vec![0.0; len],
            head: 0,
            sample_rate,
            lfo: [0.0, 0.25],
            rate: rate.clamp(0.05, 10.0),
            depth,
            delay,
        }
    }

    /// Sample `lag` samples behind the write head, linearly interpolated.
    fn tap(&self, lag: f64) -> f32 {
        let len = self.line.len();
        let whole = lag as usize;
        let frac = (lag - whole as f64) as f32;
        let newer = self.line[(self.head + len - whole) % len];
        let older = self.line[(self.head + len - whole - 1) % len];
        newer + frac * (older - newer)
    }

    /// Push one mono sample and return the wet (left, right) pair.
    #[inline]
    pub fn process(&mut self, input: f32) -> (f32, f32) {
        let len = self.line.len();
        self.line[self.head] = input;

        let longest = (len - 2) as f64;
        let [left, right] = self.lfo.map(|phase| {
            let lag = (self.delay + self.depth * (TAU * phase).sin()) * self.sample_rate;
            self.tap(lag.clamp(1.0, longest))
        });

        self.head = (self.head + 1) % len;
        let step = self.rate / self.sample_rate;
        for phase in &mut self.lfo {
            *phase = (*phase + step).fract();
        }

        (left, right)
    }
}
