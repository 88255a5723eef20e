//! Effects recipes: the shared bus each mode routes its voices through.

use crate::graph::{ChorusSpec, DelaySpec, EffectsChain, ReverbSpec};

const fn reverb(length: f64, decay: f64, wet: f64) -> Option<ReverbSpec> {
    Some(ReverbSpec { length, decay, wet })
}

const fn delay(time: f64, feedback: f64, wet: f64) -> Option<DelaySpec> {
    Some(DelaySpec { time, feedback, wet })
}

pub fn ethereal() -> EffectsChain {
    EffectsChain {
        master_gain: 0.3,
        dry: 0.7,
        reverb: reverb(2.0, 3.0, 0.3),
        delay: delay(0.15, 0.2, 0.15),
        chorus: None,
    }
}

pub fn piano() -> EffectsChain {
    EffectsChain {
        master_gain: 0.35,
        dry: 0.8,
        reverb: reverb(1.5, 4.0, 0.2),
        delay: None,
        chorus: None,
    }
}

/// Half dry, half drowned.
pub fn ocean() -> EffectsChain {
    EffectsChain {
        master_gain: 0.3,
        dry: 0.5,
        reverb: reverb(3.0, 2.0, 0.5),
        delay: delay(0.3, 0.35, 0.2),
        chorus: None,
    }
}

/// Almost entirely dry with a whisper of room.
pub fn eight_bit() -> EffectsChain {
    EffectsChain {
        master_gain: 0.25,
        dry: 0.95,
        reverb: reverb(0.5, 5.0, 0.05),
        delay: None,
        chorus: None,
    }
}

/// The reverb carries most of the sound.
pub fn crystal() -> EffectsChain {
    EffectsChain {
        master_gain: 0.3,
        dry: 0.4,
        reverb: reverb(2.5, 2.5, 0.6),
        delay: delay(0.2, 0.25, 0.15),
        chorus: None,
    }
}

pub fn jazz() -> EffectsChain {
    EffectsChain {
        master_gain: 0.3,
        dry: 0.75,
        reverb: reverb(1.2, 3.5, 0.25),
        delay: None,
        chorus: None,
    }
}

pub fn fire() -> EffectsChain {
    EffectsChain {
        master_gain: 0.3,
        dry: 0.8,
        reverb: reverb(1.0, 4.0, 0.2),
        delay: delay(0.1, 0.3, 0.12),
        chorus: None,
    }
}

pub fn love() -> EffectsChain {
    EffectsChain {
        master_gain: 0.3,
        dry: 0.6,
        reverb: reverb(2.5, 2.5, 0.4),
        delay: None,
        chorus: Some(ChorusSpec {
            delay: 0.02,
            depth: 0.003,
            rate: 1.2,
            wet: 0.3,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    fn reverb_wet(chain: &EffectsChain) -> f64 {
        chain.reverb.map_or(0.0, |r| r.wet)
    }

    #[test]
    fn signature_dry_wet_balances() {
        let ocean = ocean();
        assert_eq!((ocean.dry, reverb_wet(&ocean)), (0.5, 0.5));
        let bit = eight_bit();
        assert_eq!((bit.dry, reverb_wet(&bit)), (0.95, 0.05));
        let crystal = crystal();
        assert_eq!((crystal.dry, reverb_wet(&crystal)), (0.4, 0.6));
    }

    #[test]
    fn ethereal_matches_classic_bus() {
        let chain = ethereal();
        assert_eq!(chain.master_gain, 0.3);
        assert_eq!(chain.reverb, Some(ReverbSpec { length: 2.0, decay: 3.0, wet: 0.3 }));
        assert_eq!(chain.delay, Some(DelaySpec { time: 0.15, feedback: 0.2, wet: 0.15 }));
    }

    #[test]
    fn only_love_has_chorus() {
        for mode in Mode::ALL {
            assert_eq!(mode.effects().chorus.is_some(), mode == Mode::Love, "{mode}");
        }
    }

    #[test]
    fn every_chain_is_sane() {
        for mode in Mode::ALL {
            let chain = mode.effects();
            assert!(chain.master_gain > 0.0 && chain.master_gain <= 1.0, "{mode}");
            assert!(chain.dry > 0.0 && chain.dry <= 1.0, "{mode}");
            let reverb = chain.reverb.expect("every mode has a room");
            assert!(reverb.length > 0.0 && reverb.decay > 0.0, "{mode}");
            if let Some(d) = chain.delay {
                assert!(d.feedback < 1.0, "{mode} delay would never decay");
            }
        }
    }
}
