//! Scheduled value curves for gains, pitches and cutoffs.
//!
//! A curve is a time-sorted list of breakpoints. Each breakpoint either jumps
//! to its value (`Set`) or is reached by a linear or exponential ramp from the
//! previous breakpoint, following WebAudio `AudioParam` semantics.

/// How a breakpoint is approached from the one before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ramp {
    Set,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Breakpoint {
    time: f64,
    value: f64,
    ramp: Ramp,
}

/// A value that changes over absolute render time (seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct Automation {
    /// Value before the first breakpoint.
    default: f64,
    points: Vec<Breakpoint>,
}

impl Automation {
    pub fn new(default: f64) -> Self {
        Automation {
            default,
            points: Vec::new(),
        }
    }

    /// A curve that never changes.
    pub fn constant(value: f64) -> Self {
        Self::new(value)
    }

    /// Jump to `value` at `time`.
    pub fn set(self, time: f64, value: f64) -> Self {
        self.push(time, value, Ramp::Set)
    }

    /// Ramp linearly from the previous breakpoint to `value` at `time`.
    pub fn linear_to(self, time: f64, value: f64) -> Self {
        self.push(time, value, Ramp::Linear)
    }

    /// Ramp exponentially from the previous breakpoint to `value` at `time`.
    ///
    /// Both endpoints must be non-zero and share a sign; otherwise the previous
    /// value is held until `time`.
    pub fn exponential_to(self, time: f64, value: f64) -> Self {
        self.push(time, value, Ramp::Exponential)
    }

    /// Breakpoints stay sorted by time; equal times keep insertion order.
    fn push(mut self, time: f64, value: f64, ramp: Ramp) -> Self {
        let at = self.points.partition_point(|p| p.time <= time);
        self.points.insert(at, Breakpoint { time, value, ramp });
        self
    }

    /// Multiply every value on the curve by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Automation {
            default: self.default * factor,
            points: self
                .points
                .iter()
                .map(|p| Breakpoint {
                    value: p.value * factor,
                    ..*p
                })
                .collect(),
        }
    }

    /// Evaluate the curve at absolute time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        let mut prev_time = 0.0;
        let mut prev_value = self.default;

        for p in &self.points {
            if p.time <= t {
                prev_time = p.time;
                prev_value = p.value;
                continue;
            }

            let span = p.time - prev_time;
            if span <= 0.0 {
                return prev_value;
            }
            let progress = ((t - prev_time) / span).clamp(0.0, 1.0);
            return match p.ramp {
                Ramp::Set => prev_value,
                Ramp::Linear => prev_value + (p.value - prev_value) * progress,
                Ramp::Exponential => {
                    if prev_value * p.value > 0.0 {
                        prev_value * (p.value / prev_value).powf(progress)
                    } else {
                        prev_value
                    }
                }
            };
        }

        prev_value
    }

    /// True when the curve has no breakpoints that change its value.
    pub fn is_constant(&self) -> bool {
        self.points.iter().all(|p| p.value == self.default)
    }

    /// Largest magnitude the curve ever reaches.
    pub fn peak(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.value.abs())
            .fold(self.default.abs(), f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_before_first_point() {
        let a = Automation::new(1.0).set(0.5, 0.0);
        assert_eq!(a.value_at(0.25), 1.0);
        assert_eq!(a.value_at(0.5), 0.0);
    }

    #[test]
    fn linear_ramp_midpoint() {
        let a = Automation::new(0.0).set(1.0, 0.0).linear_to(2.0, 0.8);
        let mid = a.value_at(1.5);
        assert!((mid - 0.4).abs() < 1e-12, "Expected 0.4 at midpoint, got {mid}");
        assert!((a.value_at(5.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn exponential_ramp_is_geometric() {
        let a = Automation::new(0.0).set(0.0, 2500.0).exponential_to(1.0, 800.0);
        let mid = a.value_at(0.5);
        let expected = (2500.0_f64 * 800.0).sqrt();
        assert!(
            (mid - expected).abs() < 1e-6,
            "Geometric midpoint should be {expected}, got {mid}"
        );
    }

    #[test]
    fn exponential_ramp_to_zero_holds() {
        let a = Automation::new(0.0).set(0.0, 0.5).exponential_to(1.0, 0.0);
        assert_eq!(a.value_at(0.9), 0.5);
        assert_eq!(a.value_at(1.0), 0.0);
    }

    #[test]
    fn out_of_order_points_are_sorted() {
        // Release hold scheduled before the decay finishes.
        let a = Automation::new(1.0)
            .set(0.0, 0.0)
            .linear_to(0.1, 1.0)
            .set(0.05, 0.5);
        assert_eq!(a.value_at(0.05), 0.5);
        let later = a.value_at(0.075);
        assert!(
            (later - 0.75).abs() < 1e-12,
            "Ramp should restart from the set point, got {later}"
        );
    }

    #[test]
    fn scaled_multiplies_values() {
        let a = Automation::new(0.0).set(0.0, 0.0).linear_to(1.0, 1.0).scaled(0.2);
        assert!((a.value_at(1.0) - 0.2).abs() < 1e-12);
        assert!((a.peak() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn constant_curve() {
        let a = Automation::constant(1200.0);
        assert!(a.is_constant());
        assert_eq!(a.value_at(3.0), 1200.0);
    }
}
