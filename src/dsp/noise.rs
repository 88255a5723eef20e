//! White noise and the synthetic reverb impulse.

use rand::Rng;

/// One sample of uniform white noise in [-1, 1).
#[inline]
pub fn white<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..1.0)
}

/// A noise burst shaped by `(1 - t/length)^decay`.
///
/// `length` is in seconds. Each call draws fresh noise, so two impulses with
/// the same parameters have the same envelope but different fine structure.
pub fn decaying_impulse<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: f64,
    length: f64,
    decay: f64,
) -> Vec<f32> {
    let len = (sample_rate * length) as usize;
    (0..len)
        .map(|i| {
            let envelope = (1.0 - i as f64 / len as f64).powf(decay);
            (white(rng) * envelope) as f32
        })
        .collect()
}
