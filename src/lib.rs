pub mod config;
pub mod context;
#[cfg(feature = "device")]
pub mod device;
pub mod dsp;
pub mod effects;
#[cfg(feature = "engine")]
pub mod engine;
pub mod error;
pub mod graph;
pub mod mode;
pub mod recipes;
pub mod schedule;
pub mod session;
pub mod tables;

pub use crate::config::EngineConfig;
pub use crate::context::{RenderContext, SharedContext};
pub use crate::dsp::renderer::StereoBuffer;
#[cfg(feature = "engine")]
pub use crate::engine::{Engine, PlaybackCallbacks};
pub use crate::error::Error;
pub use crate::mode::{Mode, ModeInfo};
pub use crate::schedule::{LetterEvent, Schedule};
pub use crate::tables::{get_color, lookup};

use crate::dsp::renderer::{render_session, render_wav};
use crate::graph::SessionGraph;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The timing plan for `name` in `mode`, or `None` if it has no letters.
pub fn plan_name(name: &str, mode: Mode) -> Option<Schedule> {
    Schedule::new(name, mode)
}

/// A freshly seeded graph for `name`, starting at render time zero.
fn offline_graph(name: &str, mode: Mode) -> Option<SessionGraph> {
    plan_name(name, mode).map(|schedule| session::build_graph(&schedule, 0.0, rand::random()))
}

/// Render `name` offline, from session start until the effects have decayed.
///
/// Fails with [`Error::InvalidConfig`] for a sample rate outside
/// [`config::MIN_SAMPLE_RATE`]..=[`config::MAX_SAMPLE_RATE`].
pub fn render_name(name: &str, mode: Mode, sample_rate: u32) -> Result<Option<StereoBuffer>, Error> {
    config::check_sample_rate(sample_rate)?;
    offline_graph(name, mode)
        .map(|graph| render_session(&graph, sample_rate))
        .transpose()
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_mode(mode: &str) -> Result<Mode, JsValue> {
    mode.parse::<Mode>().map_err(js_error)
}

/// WASM-exposed: return the namesong-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: every mode's id, label and dot colour, in picker order.
#[wasm_bindgen]
pub fn list_modes() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&Mode::ALL.map(Mode::info)).map_err(js_error)
}

/// WASM-exposed: colour for the first character of `letter`.
#[wasm_bindgen]
pub fn letter_color(letter: &str, mode: &str) -> Result<String, JsValue> {
    let mode = parse_mode(mode)?;
    let color = letter
        .chars()
        .next()
        .map_or(tables::FALLBACK_COLOR, |c| get_color(c, mode));
    Ok(color.to_string())
}

/// WASM-exposed: the timing plan as a JS object (`null` for an empty name).
/// The page drives its own timers from the event onsets.
#[wasm_bindgen]
pub fn plan_name_js(name: &str, mode: &str) -> Result<JsValue, JsValue> {
    let schedule = plan_name(name, parse_mode(mode)?);
    serde_wasm_bindgen::to_value(&schedule).map_err(js_error)
}

/// WASM-exposed: render to interleaved stereo f32 samples for AudioWorklet
/// playback. Empty for a name with no letters.
#[wasm_bindgen]
pub fn render_name_samples(name: &str, mode: &str, sample_rate: u32) -> Result<Vec<f32>, JsValue> {
    let buffer = render_name(name, parse_mode(mode)?, sample_rate).map_err(js_error)?;
    Ok(buffer.map(|b| b.interleaved()).unwrap_or_default())
}

/// WASM-exposed: render to a 16-bit stereo WAV byte array.
#[wasm_bindgen]
pub fn render_name_wav(name: &str, mode: &str, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    let mode = parse_mode(mode)?;
    config::check_sample_rate(sample_rate).map_err(js_error)?;
    match offline_graph(name, mode) {
        Some(graph) => render_wav(&graph, sample_rate).map_err(js_error),
        None => Ok(Vec::new()),
    }
}
