//! Sums overlapping session clips with an output gain.

/// A stereo summing mixer that accumulates audio from many sources.
///
/// Summation is order-independent, so sessions may be added in any order.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_gain: f64,
    left: Vec<f64>,
    right: Vec<f64>,
}

impl Mixer {
    pub fn new(master_gain: f64) -> Self {
        Mixer {
            master_gain,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Prepare `frames` frames of silence.
    pub fn clear(&mut self, frames: usize) {
        self.left.clear();
        self.left.resize(frames, 0.0);
        self.right.clear();
        self.right.resize(frames, 0.0);
    }

    /// Add a stereo frame at the given index.
    pub fn add(&mut self, frame: usize, left: f32, right: f32) {
        if frame < self.left.len() {
            self.left[frame] += left as f64;
            self.right[frame] += right as f64;
        }
    }

    /// Write the mix into an interleaved buffer with `channels` channels.
    ///
    /// Mono devices get the average of both sides; channels beyond the
    /// second are silent.
    pub fn write_interleaved(&self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for (frame, chunk) in out.chunks_mut(channels).enumerate() {
            let l = self.left.get(frame).copied().unwrap_or(0.0);
            let r = self.right.get(frame).copied().unwrap_or(0.0);
            for (ch, sample) in chunk.iter_mut().enumerate() {
                let value = match (channels, ch) {
                    (1, _) => (l + r) * 0.5,
                    (_, 0) => l,
                    (_, 1) => r,
                    _ => 0.0,
                };
                *sample = soft_clip(value * self.master_gain) as f32;
            }
        }
    }

    /// Number of frames in the current block.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Soft clipper using tanh to prevent harsh digital clipping.
fn soft_clip(x: f64) -> f64 {
    x.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_is_silent() {
        let mut m = Mixer::new(0.8);
        m.clear(128);
        let mut out = vec![1.0; 256];
        m.write_interleaved(&mut out, 2);
        assert_eq!(m.len(), 128);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn accumulates_frames() {
        let mut m = Mixer::new(1.0);
        m.clear(4);
        m.add(0, 0.5, 0.1);
        m.add(0, 0.3, 0.1);
        m.add(1, 1.0, -1.0);
        m.add(10, 1.0, 1.0); // out of range, ignored

        let mut out = vec![0.0; 8];
        m.write_interleaved(&mut out, 2);
        assert!((out[0] - soft_clip(0.8) as f32).abs() < 1e-6);
        assert!((out[1] - soft_clip(0.2) as f32).abs() < 1e-6);
        assert!((out[2] - soft_clip(1.0) as f32).abs() < 1e-6);
        assert!((out[3] + soft_clip(1.0) as f32).abs() < 1e-6);
        assert_eq!(out[4], 0.0);
    }

    #[test]
    fn mono_device_averages() {
        let mut m = Mixer::new(1.0);
        m.clear(1);
        m.add(0, 0.4, 0.2);
        let mut out = vec![0.0; 1];
        m.write_interleaved(&mut out, 1);
        assert!((out[0] - soft_clip(0.3) as f32).abs() < 1e-6);
    }

    #[test]
    fn soft_clip_prevents_overflow() {
        let mut m = Mixer::new(1.0);
        m.clear(1);
        m.add(0, 100.0, -100.0);
        let mut out = vec![0.0; 2];
        m.write_interleaved(&mut out, 2);
        assert!(out.iter().all(|s| s.abs() <= 1.0), "Soft clip should keep output <= 1.0, got {out:?}");
    }
}
