use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inline storage for the handful of rewards a mission usually carries.
pub type MissionRewards = SmallVec<[MissionReward; 4]>;

/// Reward granted for a mission. Applying it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReward {
    /// Opaque resource key (e.g. `currency.soft`, `item.core`).
    pub reward_id: String,
    #[serde(default = "default_amount")]
    pub amount: u32,
}

const fn default_amount() -> u32 {
    1
}

/// Authored mission definition as supplied by the catalog loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDefinition {
    /// Unique key within the catalog. Empty ids are backfilled on first use.
    #[serde(default)]
    pub mission_id: String,
    #[serde(default = "MissionDefinition::default_display_name")]
    pub display_name: String,
    #[serde(default = "MissionDefinition::default_duration_seconds")]
    pub duration_seconds: f32,
    #[serde(default = "MissionDefinition::default_success_chance")]
    pub success_chance: f32,
    #[serde(default = "MissionDefinition::default_partial_success_chance")]
    pub partial_success_chance: f32,
    /// Free-form difficulty/requirement hint for presentation layers.
    #[serde(default = "MissionDefinition::default_flavor_tag")]
    pub flavor_tag: String,
    #[serde(default)]
    pub rewards: MissionRewards,
}

impl MissionDefinition {
    /// Shortest duration a mission may run for, in seconds.
    pub const MIN_DURATION_SECONDS: f32 = 1.0;

    fn default_display_name() -> String {
        String::from("New Mission")
    }

    const fn default_duration_seconds() -> f32 {
        30.0
    }

    const fn default_success_chance() -> f32 {
        0.6
    }

    const fn default_partial_success_chance() -> f32 {
        0.3
    }

    fn default_flavor_tag() -> String {
        String::from("NORMAL")
    }

    /// Build a definition with authoring defaults for everything but id and timing.
    #[must_use]
    pub fn new(mission_id: impl Into<String>, duration_seconds: f32) -> Self {
        Self {
            mission_id: mission_id.into(),
            duration_seconds,
            ..Self::default()
        }
    }

    /// Override both outcome chances.
    #[must_use]
    pub fn with_chances(mut self, success: f32, partial_success: f32) -> Self {
        self.success_chance = success;
        self.partial_success_chance = partial_success;
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    #[must_use]
    pub fn with_reward(mut self, reward_id: impl Into<String>, amount: u32) -> Self {
        self.rewards.push(MissionReward {
            reward_id: reward_id.into(),
            amount,
        });
        self
    }

    /// Duration actually used by the timer: never shorter than one second.
    #[must_use]
    pub fn effective_duration(&self) -> f64 {
        if self.duration_seconds.is_finite() {
            f64::from(self.duration_seconds.max(Self::MIN_DURATION_SECONDS))
        } else {
            f64::from(Self::MIN_DURATION_SECONDS)
        }
    }

    /// Success chance clamped into `[0, 1]`.
    #[must_use]
    pub fn effective_success_chance(&self) -> f64 {
        clamp_chance(self.success_chance)
    }

    /// Partial-success chance clamped into `[0, 1]`.
    #[must_use]
    pub fn effective_partial_success_chance(&self) -> f64 {
        clamp_chance(self.partial_success_chance)
    }

    /// Whether an identifier has been assigned yet.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.mission_id.is_empty()
    }
}

impl Default for MissionDefinition {
    fn default() -> Self {
        Self {
            mission_id: String::new(),
            display_name: Self::default_display_name(),
            duration_seconds: Self::default_duration_seconds(),
            success_chance: Self::default_success_chance(),
            partial_success_chance: Self::default_partial_success_chance(),
            flavor_tag: Self::default_flavor_tag(),
            rewards: MissionRewards::new(),
        }
    }
}

fn clamp_chance(value: f32) -> f64 {
    if value.is_finite() {
        f64::from(value.clamp(0.0, 1.0))
    } else {
        0.0
    }
}

/// Serialized form of a mission pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MissionPoolData {
    #[serde(default)]
    pub missions: Vec<MissionDefinition>,
}

impl MissionPoolData {
    /// Create an empty pool (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            missions: Vec::new(),
        }
    }

    /// Load pool data from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid mission data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_missions(missions: Vec<MissionDefinition>) -> Self {
        Self { missions }
    }
}
