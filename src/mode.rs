//! The eight sound modes a name can be played in.
//!
//! Each mode bundles a scale, a palette, a voice recipe, an effects recipe,
//! an onset timing style and a completion tail. [`Mode::persona`] is the one
//! place that maps a mode to its bundle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::effects;
use crate::error::Error;
use crate::graph::{EffectsChain, VoiceGraph};
use crate::recipes::{self, Note};
use crate::tables::{self, Palette, Scale};

/// Tail used by every mode without a longer-ringing effects chain.
pub const DEFAULT_TAIL: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Ethereal,
    Piano,
    Ocean,
    #[serde(rename = "8bit", alias = "eight_bit")]
    EightBit,
    Crystal,
    Jazz,
    Fire,
    Love,
}

/// How letter onsets are spaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Letter `i` starts at `i * interval`.
    Uniform,
    /// Long-short pairs: the second letter of each pair lands at `1.2 * interval`.
    Swing,
}

/// Display metadata for a mode picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeInfo {
    pub id: &'static str,
    pub label: &'static str,
    /// Indicator colour.
    pub dot: &'static str,
}

/// Everything a mode owns.
pub struct Persona {
    pub info: ModeInfo,
    pub scale: &'static Scale,
    pub palette: &'static Palette,
    pub voice: fn(&Note) -> VoiceGraph,
    pub effects: fn() -> EffectsChain,
    pub timing: Timing,
    /// Seconds after the nominal duration before completion is reported.
    pub tail: f64,
}

static ETHEREAL: Persona = Persona {
    info: ModeInfo { id: "ethereal", label: "Ethereal", dot: "#A78BFA" },
    scale: &tables::ETHEREAL_SCALE,
    palette: &tables::ETHEREAL_PALETTE,
    voice: recipes::ethereal,
    effects: effects::ethereal,
    timing: Timing::Uniform,
    tail: DEFAULT_TAIL,
};

static PIANO: Persona = Persona {
    info: ModeInfo { id: "piano", label: "Piano", dot: "#F5F5F4" },
    scale: &tables::PIANO_SCALE,
    palette: &tables::PIANO_PALETTE,
    voice: recipes::piano,
    effects: effects::piano,
    timing: Timing::Uniform,
    tail: DEFAULT_TAIL,
};

static OCEAN: Persona = Persona {
    info: ModeInfo { id: "ocean", label: "Ocean", dot: "#38BDF8" },
    scale: &tables::OCEAN_SCALE,
    palette: &tables::OCEAN_PALETTE,
    voice: recipes::ocean,
    effects: effects::ocean,
    timing: Timing::Uniform,
    tail: 1.5,
};

static EIGHT_BIT: Persona = Persona {
    info: ModeInfo { id: "8bit", label: "8-Bit", dot: "#4ADE80" },
    scale: &tables::EIGHT_BIT_SCALE,
    palette: &tables::EIGHT_BIT_PALETTE,
    voice: recipes::eight_bit,
    effects: effects::eight_bit,
    timing: Timing::Uniform,
    tail: DEFAULT_TAIL,
};

static CRYSTAL: Persona = Persona {
    info: ModeInfo { id: "crystal", label: "Crystal", dot: "#BAE6FD" },
    scale: &tables::CRYSTAL_SCALE,
    palette: &tables::CRYSTAL_PALETTE,
    voice: recipes::crystal,
    effects: effects::crystal,
    timing: Timing::Uniform,
    tail: 1.2,
};

static JAZZ: Persona = Persona {
    info: ModeInfo { id: "jazz", label: "Jazz", dot: "#F59E0B" },
    scale: &tables::JAZZ_SCALE,
    palette: &tables::JAZZ_PALETTE,
    voice: recipes::jazz,
    effects: effects::jazz,
    timing: Timing::Swing,
    tail: DEFAULT_TAIL,
};

static FIRE: Persona = Persona {
    info: ModeInfo { id: "fire", label: "Fire", dot: "#F97316" },
    scale: &tables::FIRE_SCALE,
    palette: &tables::FIRE_PALETTE,
    voice: recipes::fire,
    effects: effects::fire,
    timing: Timing::Uniform,
    tail: 0.6,
};

static LOVE: Persona = Persona {
    info: ModeInfo { id: "love", label: "Love", dot: "#F472B6" },
    scale: &tables::LOVE_SCALE,
    palette: &tables::LOVE_PALETTE,
    voice: recipes::love,
    effects: effects::love,
    timing: Timing::Uniform,
    tail: 1.5,
};

impl Mode {
    /// All modes, in picker order.
    pub const ALL: [Mode; 8] = [
        Mode::Ethereal,
        Mode::Piano,
        Mode::Ocean,
        Mode::EightBit,
        Mode::Crystal,
        Mode::Jazz,
        Mode::Fire,
        Mode::Love,
    ];

    pub fn persona(self) -> &'static Persona {
        match self {
            Mode::Ethereal => &ETHEREAL,
            Mode::Piano => &PIANO,
            Mode::Ocean => &OCEAN,
            Mode::EightBit => &EIGHT_BIT,
            Mode::Crystal => &CRYSTAL,
            Mode::Jazz => &JAZZ,
            Mode::Fire => &FIRE,
            Mode::Love => &LOVE,
        }
    }

    pub fn id(self) -> &'static str {
        self.persona().info.id
    }

    pub fn info(self) -> ModeInfo {
        self.persona().info
    }

    pub fn scale(self) -> &'static Scale {
        self.persona().scale
    }

    pub fn palette(self) -> &'static Palette {
        self.persona().palette
    }

    pub fn timing(self) -> Timing {
        self.persona().timing
    }

    pub fn tail(self) -> f64 {
        self.persona().tail
    }

    /// Build the voice graph for one letter.
    pub fn voice(self, note: &Note) -> VoiceGraph {
        (self.persona().voice)(note)
    }

    /// Build the session's shared effects bus.
    pub fn effects(self) -> EffectsChain {
        (self.persona().effects)()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if matches!(wanted.as_str(), "eight_bit" | "8-bit") {
            return Ok(Mode::EightBit);
        }
        Mode::ALL
            .into_iter()
            .find(|m| m.id() == wanted)
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(mode.id().parse::<Mode>().unwrap(), mode);
            assert_eq!(mode.to_string(), mode.id());
        }
    }

    #[test]
    fn parse_accepts_aliases_and_case() {
        assert_eq!("eight_bit".parse::<Mode>().unwrap(), Mode::EightBit);
        assert_eq!("8-bit".parse::<Mode>().unwrap(), Mode::EightBit);
        assert_eq!(" Jazz ".parse::<Mode>().unwrap(), Mode::Jazz);
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let err = "dubstep".parse::<Mode>().unwrap_err();
        assert!(matches!(err, Error::UnknownMode(ref m) if m == "dubstep"));
    }

    #[test]
    fn serde_uses_ids() {
        assert_eq!(serde_json::to_string(&Mode::EightBit).unwrap(), "\"8bit\"");
        assert_eq!(serde_json::to_string(&Mode::Crystal).unwrap(), "\"crystal\"");
        let m: Mode = serde_json::from_str("\"eight_bit\"").unwrap();
        assert_eq!(m, Mode::EightBit);
        let m: Mode = serde_json::from_str("\"love\"").unwrap();
        assert_eq!(m, Mode::Love);
    }

    #[test]
    fn tails_per_mode() {
        assert_eq!(Mode::Ocean.tail(), 1.5);
        assert_eq!(Mode::Crystal.tail(), 1.2);
        assert_eq!(Mode::Love.tail(), 1.5);
        assert_eq!(Mode::Fire.tail(), 0.6);
        for mode in [Mode::Ethereal, Mode::Piano, Mode::EightBit, Mode::Jazz] {
            assert_eq!(mode.tail(), DEFAULT_TAIL);
        }
    }

    #[test]
    fn only_jazz_swings() {
        for mode in Mode::ALL {
            let expected = if mode == Mode::Jazz { Timing::Swing } else { Timing::Uniform };
            assert_eq!(mode.timing(), expected, "{mode}");
        }
    }

    #[test]
    fn info_matches_id() {
        for mode in Mode::ALL {
            assert_eq!(mode.info().id, mode.id());
            assert!(!mode.info().label.is_empty());
        }
        assert_eq!(Mode::default(), Mode::Ethereal);
    }
}
