use crate::catalog::MissionCatalog;
use crate::config::{EngineCfg, EngineConfigError};
use crate::data::MissionDefinition;
use crate::journal::{MissionLogEntry, SubscriptionId};
use crate::machine::{CommandError, MachineState, MissionMachine};
use crate::offline::CatchUpReport;

/// Host-facing wrapper around a single mission machine.
///
/// The host drives cadence: call [`MissionSession::tick`] once per frame and
/// [`MissionSession::simulate_offline`] once on resume with the time the game
/// was closed for. A fresh session is idle until started or ticked.
#[derive(Debug)]
pub struct MissionSession {
    machine: MissionMachine,
}

impl MissionSession {
    /// Construct an idle session over `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `EngineConfigError` when `cfg` fails validation.
    pub fn new(catalog: MissionCatalog, cfg: &EngineCfg) -> Result<Self, EngineConfigError> {
        Ok(Self {
            machine: MissionMachine::new(catalog, cfg)?,
        })
    }

    /// Start the first mission if none is running. Returns whether one is running now.
    pub fn start(&mut self) -> bool {
        self.machine.select_next(false) || self.machine.is_running()
    }

    /// Advance live play by `delta_seconds`.
    ///
    /// Idle sessions try to start a mission first. The delta is consumed in
    /// boundary-sized steps, so a long frame resolves every mission it spans
    /// and the leftover carries into the next one.
    pub fn tick(&mut self, delta_seconds: f64) -> CatchUpReport {
        self.machine.consume_budget(delta_seconds, false)
    }

    /// Replay time that passed while the game was closed.
    pub fn simulate_offline(&mut self, elapsed_seconds: f64) -> CatchUpReport {
        self.machine.simulate(elapsed_seconds)
    }

    /// Start a specific mission immediately.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::UnknownMission` if the id is not in the catalog.
    pub fn force_start(&mut self, mission_id: &str) -> Result<(), CommandError> {
        self.machine.force_start(mission_id)
    }

    /// Abandon the current mission and move on to another one.
    pub fn skip_to_next(&mut self) -> bool {
        self.machine.skip_to_next()
    }

    #[must_use]
    pub const fn state(&self) -> MachineState {
        self.machine.state()
    }

    #[must_use]
    pub fn active_mission(&self) -> Option<&MissionDefinition> {
        self.machine.active_mission()
    }

    #[must_use]
    pub fn active_mission_elapsed(&self) -> f64 {
        self.machine.active_elapsed()
    }

    #[must_use]
    pub const fn total_elapsed(&self) -> f64 {
        self.machine.total_elapsed()
    }

    #[must_use]
    pub fn log_entries(&self) -> &[MissionLogEntry] {
        self.machine.log().entries()
    }

    /// Register a listener for every future log entry.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&MissionLogEntry) + 'static,
    ) -> SubscriptionId {
        self.machine.log_mut().subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.machine.log_mut().unsubscribe(id)
    }

    #[must_use]
    pub const fn catalog(&self) -> &MissionCatalog {
        self.machine.catalog()
    }

    /// Seed driving this session's random streams.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.machine.rng().seed()
    }

    #[must_use]
    pub const fn machine(&self) -> &MissionMachine {
        &self.machine
    }
}
