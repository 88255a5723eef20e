//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lowest sample rate the voice recipes stay meaningful at.
pub const MIN_SAMPLE_RATE: u32 = 8000;
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Reject sample rates outside `MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE`.
pub fn check_sample_rate(sample_rate: u32) -> Result<(), Error> {
    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        return Err(Error::InvalidConfig(format!(
            "sampleRate must be between {MIN_SAMPLE_RATE} and {MAX_SAMPLE_RATE} Hz, got {sample_rate}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Render and device sample rate in Hz.
    pub sample_rate: u32,
    /// Seconds between capturing the session clock and the first onset.
    pub lookahead: f64,
    /// Gain applied by the shared mixer before the soft clip.
    pub output_gain: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: 44100,
            lookahead: 0.05,
            output_gain: 0.8,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        check_sample_rate(self.sample_rate)?;
        if !self.lookahead.is_finite() || self.lookahead < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "lookahead must be a non-negative number of seconds, got {}",
                self.lookahead
            )));
        }
        if !self.output_gain.is_finite() || self.output_gain < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "outputGain must be non-negative, got {}",
                self.output_gain
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.sample_rate, 44100);
        assert_eq!(c.lookahead, 0.05);
        assert_eq!(c.output_gain, 0.8);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c = EngineConfig::from_json(r#"{ "sampleRate": 48000 }"#).unwrap();
        assert_eq!(c.sample_rate, 48000);
        assert_eq!(c.lookahead, 0.05);

        let c = EngineConfig::from_json("{}").unwrap();
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "sampleRate": 0 }"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "lookahead": -1.0 }"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "outputGain": -0.5 }"#),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn sample_rate_has_a_floor() {
        for rate in [1, 2, 7999, 400_000] {
            let json = format!(r#"{{ "sampleRate": {rate} }}"#);
            assert!(matches!(EngineConfig::from_json(&json), Err(Error::InvalidConfig(_))), "{rate}");
        }
        assert!(check_sample_rate(MIN_SAMPLE_RATE).is_ok());
        assert!(check_sample_rate(48000).is_ok());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(EngineConfig::from_json("{ sampleRate"), Err(Error::Config(_))));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&EngineConfig::default()).unwrap();
        assert!(json.contains("\"sampleRate\":44100"));
        assert!(json.contains("\"outputGain\""));
    }
}
