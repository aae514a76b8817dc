use anyhow::{Context, Result};
use colored::Colorize;
use idledig_game::{
    CatchUpReport, CatalogLoader, MissionCatalog, MissionEngine, MissionLogEntry,
    MissionLogType, MissionOutcome, MissionSession,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// How a single seed is exercised.
#[derive(Debug, Clone, Copy)]
pub struct RunPlan {
    /// Seconds of live play, fed as fixed frames.
    pub live_seconds: f64,
    /// Frame delta used for live play.
    pub frame_seconds: f64,
    /// Seconds replayed through offline catch-up after the live span.
    pub offline_seconds: f64,
}

impl RunPlan {
    pub fn total_seconds(&self) -> f64 {
        self.live_seconds.max(0.0) + self.offline_seconds.max(0.0)
    }
}

/// Outcome of running one seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResult {
    pub seed: u64,
    pub log_entries: usize,
    pub live: CatchUpReport,
    pub offline: CatchUpReport,
    pub outcomes: BTreeMap<String, u64>,
    pub warnings: u64,
    pub rewards: BTreeMap<String, u64>,
    pub parity_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parity_detail: Option<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Log observer acting as the reward-applying host.
///
/// Rewards are granted on `Success` only; partial results are counted but pay
/// nothing here.
#[derive(Debug, Default)]
pub struct RewardLedger {
    outcomes: BTreeMap<String, u64>,
    successes: Vec<String>,
    warnings: u64,
}

impl RewardLedger {
    pub fn attach(session: &mut MissionSession) -> Rc<RefCell<Self>> {
        let ledger = Rc::new(RefCell::new(Self::default()));
        let sink = Rc::clone(&ledger);
        session.subscribe(move |entry| sink.borrow_mut().observe(entry));
        ledger
    }

    fn observe(&mut self, entry: &MissionLogEntry) {
        match (entry.kind, entry.outcome) {
            (MissionLogType::Outcome, Some(outcome)) => {
                *self
                    .outcomes
                    .entry(outcome.label().to_string())
                    .or_default() += 1;
                if outcome == MissionOutcome::Success {
                    self.successes.push(entry.mission_id.clone());
                }
            }
            (MissionLogType::Warning, _) => self.warnings += 1,
            _ => {}
        }
    }

    /// Total reward amounts per reward id for every success seen.
    pub fn settle(&self, catalog: &MissionCatalog) -> BTreeMap<String, u64> {
        let mut totals = BTreeMap::new();
        for mission_id in &self.successes {
            let Some(definition) = catalog.iter().find(|m| &m.mission_id == mission_id) else {
                log::warn!("success for unknown mission {mission_id}");
                continue;
            };
            for reward in &definition.rewards {
                *totals.entry(reward.reward_id.clone()).or_default() += u64::from(reward.amount);
            }
        }
        totals
    }
}

/// Drives sessions for the requested seeds.
pub struct Runner<L: CatalogLoader> {
    engine: MissionEngine<L>,
    verbose: bool,
}

impl<L> Runner<L>
where
    L: CatalogLoader,
{
    pub const fn new(engine: MissionEngine<L>, verbose: bool) -> Self {
        Self { engine, verbose }
    }

    fn session(&self, seed: u64) -> Result<MissionSession> {
        self.engine
            .create_session_with_seed(seed)
            .with_context(|| format!("failed to create session for seed {seed}"))
    }

    pub fn run_seed(&self, seed: u64, plan: RunPlan) -> Result<SeedResult> {
        let start = Instant::now();
        let mut session = self.session(seed)?;
        let ledger = RewardLedger::attach(&mut session);

        let live = tick_for(&mut session, plan.live_seconds, plan.frame_seconds);
        let offline = session.simulate_offline(plan.offline_seconds);
        let parity = self.check_parity(seed, plan)?;

        let ledger = ledger.borrow();
        let result = SeedResult {
            seed,
            log_entries: session.log_entries().len(),
            live,
            offline,
            outcomes: ledger.outcomes.clone(),
            warnings: ledger.warnings,
            rewards: ledger.settle(session.catalog()),
            parity_ok: parity.is_none(),
            parity_detail: parity,
            duration: start.elapsed(),
        };

        if self.verbose {
            for entry in session.log_entries() {
                print_entry(entry);
            }
        }
        Ok(result)
    }

    /// Tick one session and replay another offline over the same span; report
    /// the first diverging outcome, if any.
    fn check_parity(&self, seed: u64, plan: RunPlan) -> Result<Option<String>> {
        let total = plan.total_seconds();
        let mut ticked = self.session(seed)?;
        tick_for(&mut ticked, total, plan.frame_seconds);
        let mut replayed = self.session(seed)?;
        replayed.simulate_offline(total);

        let live = outcome_trail(ticked.log_entries());
        let offline = outcome_trail(replayed.log_entries());
        if live == offline {
            return Ok(None);
        }
        let position = live
            .iter()
            .zip(&offline)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| live.len().min(offline.len()));
        Ok(Some(format!(
            "outcome #{position} diverged: live {:?} vs offline {:?} ({} live / {} offline outcomes)",
            live.get(position),
            offline.get(position),
            live.len(),
            offline.len()
        )))
    }
}

/// Feed `seconds` to the session in `frame`-sized ticks, summing the reports.
pub fn tick_for(session: &mut MissionSession, seconds: f64, frame: f64) -> CatchUpReport {
    let mut total = CatchUpReport::default();
    if !(seconds > 0.0) || !(frame > 0.0) {
        return total;
    }
    let mut spent = 0.0;
    while spent < seconds {
        let delta = frame.min(seconds - spent);
        let report = session.tick(delta);
        total.consumed_seconds += report.consumed_seconds;
        total.steps += report.steps;
        total.completed += report.completed;
        total.started += report.started;
        spent += delta;
    }
    total
}

fn outcome_trail(entries: &[MissionLogEntry]) -> Vec<(String, MissionOutcome)> {
    entries
        .iter()
        .filter_map(|e| e.outcome.map(|o| (e.mission_id.clone(), o)))
        .collect()
}

fn print_entry(entry: &MissionLogEntry) {
    let stamp = format!("[{:>10.2}s]", entry.total_elapsed_seconds);
    let origin = if entry.generated_offline {
        "offline".dimmed()
    } else {
        "live".normal()
    };
    let message = match entry.kind {
        MissionLogType::Info => entry.message.normal(),
        MissionLogType::Outcome => match entry.outcome {
            Some(MissionOutcome::Success) => entry.message.green(),
            Some(MissionOutcome::PartialSuccess) => entry.message.yellow(),
            _ => entry.message.red(),
        },
        MissionLogType::Warning => entry.message.bright_yellow().bold(),
    };
    println!("  {stamp} {origin:>7} {message}");
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
