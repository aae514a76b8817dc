//! IdleDig Mission Engine
//!
//! Platform-agnostic progression core for the IdleDig automation loop: picks a
//! mission from the pool, runs its timer against live or offline time,
//! resolves the outcome and records everything in an ordered log. Rewards,
//! persistence and presentation belong to the host.

pub mod catalog;
pub mod config;
pub mod data;
pub mod journal;
pub mod machine;
pub mod offline;
pub mod outcome;
pub mod rng;
pub mod session;

// Re-export commonly used types
pub use catalog::{CatalogError, MissionCatalog, MissionIndex};
pub use config::{EngineCfg, EngineConfigError};
pub use data::{MissionDefinition, MissionPoolData, MissionReward, MissionRewards};
pub use journal::{LogObserver, MissionLog, MissionLogEntry, MissionLogType, SubscriptionId};
pub use machine::{CommandError, MachineState, MissionMachine, MissionRuntimeState};
pub use offline::CatchUpReport;
pub use outcome::{MissionOutcome, resolve_outcome, roll_outcome};
pub use rng::{CountingRng, RngBundle};
pub use session::MissionSession;

/// Trait for abstracting where mission pools come from
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the mission pool from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be loaded.
    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error>;
}

/// Loader that serves the catalog bundled with this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalogLoader;

impl CatalogLoader for StaticCatalogLoader {
    type Error = std::convert::Infallible;

    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        Ok(MissionCatalog::load_from_static())
    }
}

/// Errors raised while building a session.
#[derive(Debug, thiserror::Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to load mission catalog")]
    Catalog(#[source] E),
    #[error(transparent)]
    Config(#[from] EngineConfigError),
}

/// Main engine for creating mission sessions
pub struct MissionEngine<L>
where
    L: CatalogLoader,
{
    loader: L,
    cfg: EngineCfg,
}

impl<L> MissionEngine<L>
where
    L: CatalogLoader,
{
    /// Create a new engine with the provided catalog loader and configuration
    pub const fn new(loader: L, cfg: EngineCfg) -> Self {
        Self { loader, cfg }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineCfg {
        &self.cfg
    }

    /// Build an idle session over a freshly loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the configuration is invalid.
    pub fn create_session(&self) -> Result<MissionSession, EngineError<L::Error>> {
        self.create_session_with_seed(self.cfg.seed)
    }

    /// Like [`MissionEngine::create_session`] with the seed overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the configuration is invalid.
    pub fn create_session_with_seed(
        &self,
        seed: u64,
    ) -> Result<MissionSession, EngineError<L::Error>> {
        let catalog = self.loader.load_catalog().map_err(EngineError::Catalog)?;
        let cfg = EngineCfg {
            seed,
            ..self.cfg.clone()
        };
        Ok(MissionSession::new(catalog, &cfg)?)
    }
}
