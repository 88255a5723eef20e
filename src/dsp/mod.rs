//! Pure Rust synthesis and effects.
//!
//! Everything here renders offline into buffers, so the same code serves the
//! real-time engine, the AudioWorklet path (via WASM) and WAV export.

pub mod automation;
pub mod chorus;
pub mod delay;
pub mod filter;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod renderer;
pub mod reverb;
pub mod voice;
