//! Turns a timing plan into a renderable session graph.

use crate::graph::SessionGraph;
use crate::recipes::Note;
use crate::schedule::Schedule;

/// Build the graph for `schedule` with its session start at render time
/// `origin`. `seed` drives the session's noise and reverb impulse.
pub fn build_graph(schedule: &Schedule, origin: f64, seed: u64) -> SessionGraph {
    let mode = schedule.mode;
    let voices = schedule
        .events
        .iter()
        .map(|event| mode.voice(&Note::new(event, origin, schedule.onset_interval)))
        .collect();

    SessionGraph {
        mode,
        origin,
        voices,
        effects: mode.effects(),
        seed,
    }
}
