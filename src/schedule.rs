//! Session scheduler: text in, timed letter events out.

use serde::Serialize;

use crate::mode::{Mode, Timing};
use crate::tables;

/// Seconds of nominal duration each letter contributes before clamping.
const SECONDS_PER_LETTER: f64 = 0.2;
const MIN_DURATION: f64 = 1.0;
const MAX_DURATION: f64 = 3.0;
/// Where the second letter of a swung pair lands, in onset intervals.
const SWING_OFFSET: f64 = 1.2;

/// Lowercase `name` and keep only `a`-`z`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

/// Nominal session length for `letters` letters, always within 1 to 3 seconds.
pub fn total_duration(letters: usize) -> f64 {
    (letters as f64 * SECONDS_PER_LETTER).clamp(MIN_DURATION, MAX_DURATION)
}

/// Onset of letter `index`, relative to session start.
pub fn onset(timing: Timing, index: usize, interval: f64) -> f64 {
    match timing {
        Timing::Uniform => index as f64 * interval,
        Timing::Swing => {
            if index == 0 {
                return 0.0;
            }
            let pair = (index / 2) as f64;
            let offset = if index % 2 == 1 { SWING_OFFSET * interval } else { 0.0 };
            pair * 2.0 * interval + offset
        }
    }
}

/// One letter of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterEvent {
    /// Position in the cleaned sequence.
    pub index: usize,
    pub letter: char,
    /// Seconds after session start.
    pub onset: f64,
    pub frequency: f64,
    pub is_vowel: bool,
    pub color: &'static str,
}

/// The full timing plan of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub mode: Mode,
    pub onset_interval: f64,
    pub total_duration: f64,
    pub tail: f64,
    pub events: Vec<LetterEvent>,
}

impl Schedule {
    /// Plan `name` in `mode`. `None` when nothing survives sanitizing.
    pub fn new(name: &str, mode: Mode) -> Option<Schedule> {
        let letters = sanitize(name);
        if letters.is_empty() {
            return None;
        }

        let count = letters.len();
        let total = total_duration(count);
        let interval = total / count as f64;
        let timing = mode.timing();

        let events = letters
            .chars()
            .enumerate()
            .map(|(index, letter)| {
                let (frequency, color) = tables::lookup(mode, letter);
                LetterEvent {
                    index,
                    letter,
                    onset: onset(timing, index, interval),
                    frequency,
                    is_vowel: tables::is_vowel(letter),
                    color,
                }
            })
            .collect();

        Some(Schedule {
            mode,
            onset_interval: interval,
            total_duration: total,
            tail: mode.tail(),
            events,
        })
    }

    /// Seconds from session start until completion is reported.
    pub fn complete_offset(&self) -> f64 {
        self.total_duration + self.tail
    }
}
