//! Feedback delay line used as an effects send.

/// A mono delay line whose output is fed back into its input.
///
/// `process` returns only the delayed (wet) signal; the caller scales it and
/// sums it with the dry path.
#[derive(Debug, Clone)]
pub struct FeedbackDelay {
    buffer: Vec<f32>,
    write_pos: usize,
    delay_samples: usize,
    feedback: f32,
}

impl FeedbackDelay {
    /// Create a delay of `delay_time` seconds with the given feedback gain.
    pub fn new(sample_rate: f64, delay_time: f64, feedback: f64) -> Self {
        let delay_samples = ((delay_time.max(0.0) * sample_rate) as usize).max(1);
        Self {
            buffer: vec![0.0; delay_samples + 1],
            write_pos: 0,
            delay_samples,
            feedback: feedback.clamp(0.0, 0.99) as f32,
        }
    }

    /// Push one input sample and return the delayed output.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let buffer_len = self.buffer.len();
        let read_pos = (self.write_pos + buffer_len - self.delay_samples) % buffer_len;
        let delayed = self.buffer[read_pos];

        self.buffer[self.write_pos] = input + delayed * self.feedback;
        self.write_pos = (self.write_pos + 1) % buffer_len;

        delayed
    }
}

/// Seconds until a feedback delay's echoes fall below -60 dB.
pub fn feedback_tail(delay_time: f64, feedback: f64) -> f64 {
    let feedback = feedback.clamp(0.0, 0.99);
    if feedback <= 0.0 {
        return delay_time;
    }
    let repeats = (0.001_f64.ln() / feedback.ln()).ceil();
    delay_time * (repeats + 1.0)
}
