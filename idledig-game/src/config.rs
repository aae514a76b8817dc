//! Engine configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables for a mission engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineCfg {
    /// RNG seed; `0` seeds from OS entropy.
    #[serde(default)]
    pub seed: u64,
    /// Slack (seconds) under which a mission timer counts as complete.
    #[serde(default = "EngineCfg::default_resolution_epsilon")]
    pub resolution_epsilon: f64,
}

impl EngineCfg {
    pub const MAX_RESOLUTION_EPSILON: f64 = 0.5;

    #[must_use]
    pub const fn default_resolution_epsilon() -> f64 {
        1e-6
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `EngineConfigError` when the epsilon is non-finite or out of range.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        let eps = self.resolution_epsilon;
        if !eps.is_finite() || !(0.0..Self::MAX_RESOLUTION_EPSILON).contains(&eps) {
            return Err(EngineConfigError::ResolutionEpsilon {
                max: Self::MAX_RESOLUTION_EPSILON,
                value: eps,
            });
        }
        Ok(())
    }
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            seed: 0,
            resolution_epsilon: Self::default_resolution_epsilon(),
        }
    }
}

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum EngineConfigError {
    #[error("resolution_epsilon must be finite and in [0, {max}) (got {value})")]
    ResolutionEpsilon { max: f64, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = EngineCfg::default();
        assert_eq!(cfg.seed, 0);
        assert!(cfg.validate().is_ok());
        assert!(EngineCfg::seeded(9).validate().is_ok());
    }

    #[test]
    fn rejects_bad_epsilon() {
        for value in [f64::NAN, -1e-3, 0.5, 3.0] {
            let cfg = EngineCfg {
                seed: 1,
                resolution_epsilon: value,
            };
            assert!(matches!(
                cfg.validate(),
                Err(EngineConfigError::ResolutionEpsilon { .. })
            ));
        }
    }

    #[test]
    fn deserializes_with_defaults() {
        let cfg: EngineCfg = serde_json::from_str(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(cfg, EngineCfg::seeded(42));
    }
}
