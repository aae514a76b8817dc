//! Mission execution state machine.
//!
//! The machine is either idle or running exactly one mission. Resolution and
//! re-selection are fused: when [`MissionMachine::advance`] completes a
//! mission it rolls the outcome, logs it and immediately starts the next one,
//! so both live ticking and offline catch-up drive the machine through the
//! same single primitive.

use thiserror::Error;

use crate::catalog::{MissionCatalog, MissionIndex};
use crate::config::{EngineCfg, EngineConfigError};
use crate::data::MissionDefinition;
use crate::journal::{MissionLog, MissionLogEntry};
use crate::outcome::{MissionOutcome, roll_outcome};
use crate::rng::RngBundle;

/// Observable machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Idle,
    Running,
}

/// Timer for the single mission currently executing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionRuntimeState {
    index: MissionIndex,
    elapsed_seconds: f64,
}

impl MissionRuntimeState {
    const fn new(index: MissionIndex) -> Self {
        Self {
            index,
            elapsed_seconds: 0.0,
        }
    }

    #[must_use]
    pub const fn index(&self) -> MissionIndex {
        self.index
    }

    #[must_use]
    pub const fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }
}

/// Errors returned by explicit external commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("no mission with id '{mission_id}' in the catalog")]
    UnknownMission { mission_id: String },
}

/// Owns the catalog, the active mission slot, the cumulative clock and the log.
#[derive(Debug)]
pub struct MissionMachine {
    catalog: MissionCatalog,
    rng: RngBundle,
    active: Option<MissionRuntimeState>,
    total_elapsed: f64,
    epsilon: f64,
    log: MissionLog,
}

impl MissionMachine {
    /// Build an idle machine over `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `EngineConfigError` when `cfg` fails validation.
    pub fn new(catalog: MissionCatalog, cfg: &EngineCfg) -> Result<Self, EngineConfigError> {
        cfg.validate()?;
        Ok(Self {
            catalog,
            rng: RngBundle::from_user_seed(cfg.seed),
            active: None,
            total_elapsed: 0.0,
            epsilon: cfg.resolution_epsilon,
            log: MissionLog::new(),
        })
    }

    #[must_use]
    pub const fn state(&self) -> MachineState {
        if self.active.is_some() {
            MachineState::Running
        } else {
            MachineState::Idle
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub const fn runtime(&self) -> Option<&MissionRuntimeState> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn active_mission(&self) -> Option<&MissionDefinition> {
        self.active
            .as_ref()
            .and_then(|runtime| self.catalog.get(runtime.index))
    }

    /// Seconds the active mission has run; `0` when idle.
    #[must_use]
    pub fn active_elapsed(&self) -> f64 {
        self.active.map_or(0.0, |runtime| runtime.elapsed_seconds)
    }

    /// Seconds until the active mission completes.
    #[must_use]
    pub fn remaining_seconds(&self) -> Option<f64> {
        let runtime = self.active.as_ref()?;
        let definition = self.catalog.get(runtime.index)?;
        Some((definition.effective_duration() - runtime.elapsed_seconds).max(0.0))
    }

    /// Running total of all time advanced through the machine.
    #[must_use]
    pub const fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    #[must_use]
    pub const fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn log(&self) -> &MissionLog {
        &self.log
    }

    pub const fn log_mut(&mut self) -> &mut MissionLog {
        &mut self.log
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    /// Idle → Running with a uniformly drawn mission.
    ///
    /// Returns `false` when the machine is already running or the catalog is
    /// empty; either way the state is left untouched.
    pub fn select_next(&mut self, offline: bool) -> bool {
        if self.active.is_some() {
            return false;
        }
        let (selection, identity) = self.rng.selection_with_identity();
        let Some(index) = self.catalog.pick_uniform(selection, identity) else {
            log::debug!("no mission available to start");
            return false;
        };
        self.begin(index, offline);
        true
    }

    /// Advance the active mission by `delta_seconds`.
    ///
    /// When the timer reaches the mission duration (within the resolution
    /// epsilon) the outcome is rolled and logged, and the next mission is
    /// selected before returning. Idle machines and negative or non-finite
    /// deltas are ignored. Any overshoot past the duration is discarded.
    pub fn advance(&mut self, delta_seconds: f64, offline: bool) -> Option<MissionOutcome> {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            log::warn!("ignoring invalid mission delta {delta_seconds}");
            return None;
        }
        let runtime = self.active.as_mut()?;
        runtime.elapsed_seconds += delta_seconds;
        self.total_elapsed += delta_seconds;

        let elapsed = runtime.elapsed_seconds;
        let index = runtime.index;
        let duration = self
            .catalog
            .get(index)
            .map_or(0.0, MissionDefinition::effective_duration);
        if elapsed + self.epsilon < duration {
            return None;
        }
        Some(self.resolve(index, offline))
    }

    /// Start `mission_id` right away, abandoning any running mission.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::UnknownMission` when the id is not in the
    /// catalog; the machine is left exactly as it was.
    pub fn force_start(&mut self, mission_id: &str) -> Result<(), CommandError> {
        let Some(index) = self.catalog.find_by_id(mission_id, self.rng.identity()) else {
            return Err(CommandError::UnknownMission {
                mission_id: mission_id.to_string(),
            });
        };
        self.abandon_active();
        self.begin(index, false);
        Ok(())
    }

    /// Abandon the running mission (if any) and start another one.
    ///
    /// Returns whether a new mission is running afterwards.
    pub fn skip_to_next(&mut self) -> bool {
        self.abandon_active();
        self.select_next(false)
    }

    fn begin(&mut self, index: MissionIndex, offline: bool) {
        self.active = Some(MissionRuntimeState::new(index));
        let Some(definition) = self.catalog.get(index) else {
            return;
        };
        log::debug!(
            "mission '{}' started at {:.3}s (offline: {offline})",
            definition.mission_id,
            self.total_elapsed
        );
        self.log.push(MissionLogEntry::started(
            definition,
            self.total_elapsed,
            offline,
        ));
    }

    fn resolve(&mut self, index: MissionIndex, offline: bool) -> MissionOutcome {
        self.active = None;
        let outcome = match self.catalog.get(index) {
            Some(definition) => {
                let (outcome, draw) = roll_outcome(definition, self.rng.outcome());
                log::debug!(
                    "mission '{}' resolved {} (draw {draw:.4}) at {:.3}s",
                    definition.mission_id,
                    outcome.label(),
                    self.total_elapsed
                );
                self.log.push(MissionLogEntry::resolved(
                    definition,
                    outcome,
                    self.total_elapsed,
                    offline,
                ));
                outcome
            }
            None => MissionOutcome::Failure,
        };
        self.select_next(offline);
        outcome
    }

    fn abandon_active(&mut self) {
        let Some(runtime) = self.active.take() else {
            return;
        };
        let Some(definition) = self.catalog.get(runtime.index) else {
            return;
        };
        log::debug!(
            "mission '{}' terminated early after {:.3}s",
            definition.mission_id,
            runtime.elapsed_seconds
        );
        self.log.push(MissionLogEntry::terminated_early(
            definition,
            self.total_elapsed,
        ));
    }
}
