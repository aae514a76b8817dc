//! Outcome resolution for completed missions.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::MissionDefinition;

/// Trichotomous result of a completed mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionOutcome {
    Success,
    PartialSuccess,
    Failure,
}

impl MissionOutcome {
    /// Stable lowercase label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialSuccess => "partial_success",
            Self::Failure => "failure",
        }
    }
}

/// Resolve a uniform draw in `[0, 1)` against the definition's probability bands.
///
/// Bands are laid out as `[0, s)` success, `[s, s + p)` partial success and the
/// remainder failure. Each chance is clamped into `[0, 1]` first; when the two
/// add up past one the failure band simply vanishes.
#[must_use]
pub fn resolve_outcome(definition: &MissionDefinition, draw: f64) -> MissionOutcome {
    let success = definition.effective_success_chance();
    let partial_threshold = success + definition.effective_partial_success_chance();

    if draw < success {
        MissionOutcome::Success
    } else if draw < partial_threshold {
        MissionOutcome::PartialSuccess
    } else {
        MissionOutcome::Failure
    }
}

/// Draw from `rng` and resolve, returning the outcome with the draw that produced it.
pub fn roll_outcome<R>(definition: &MissionDefinition, rng: &mut R) -> (MissionOutcome, f64)
where
    R: Rng + ?Sized,
{
    let draw = rng.r#gen::<f64>();
    (resolve_outcome(definition, draw), draw)
}
