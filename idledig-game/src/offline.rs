//! Budgeted stepping used for offline catch-up and live ticks.
//!
//! A budget is consumed in steps that never cross the active mission's
//! completion boundary, so each boundary passed produces exactly one outcome
//! no matter how large the budget is.

use serde::{Deserialize, Serialize};

use crate::journal::MissionLogType;
use crate::machine::MissionMachine;

/// Summary of one budgeted run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CatchUpReport {
    /// Seconds actually fed into the machine.
    pub consumed_seconds: f64,
    /// Calls made to `advance`.
    pub steps: u64,
    /// Missions resolved during the run.
    pub completed: u64,
    /// Missions started during the run.
    pub started: u64,
}

impl CatchUpReport {
    /// Whether the run stopped early because no mission could be started.
    #[must_use]
    pub fn starved(&self, budget_seconds: f64) -> bool {
        self.consumed_seconds < budget_seconds
    }
}

impl MissionMachine {
    /// Replay `budget_seconds` of unobserved time as discrete mission completions.
    ///
    /// All emitted entries are flagged offline. Non-positive or non-finite
    /// budgets are a no-op. The run stops early only when the catalog cannot
    /// supply a mission.
    pub fn simulate(&mut self, budget_seconds: f64) -> CatchUpReport {
        if !budget_seconds.is_finite() {
            log::warn!("ignoring non-finite offline budget {budget_seconds}");
            return CatchUpReport::default();
        }
        let report = self.consume_budget(budget_seconds, true);
        if report.steps > 0 {
            log::info!(
                "offline catch-up consumed {:.3}s of {:.3}s: {} completed, {} started",
                report.consumed_seconds,
                budget_seconds,
                report.completed,
                report.started
            );
        }
        report
    }

    /// Feed `budget_seconds` through `advance`, never stepping past the next
    /// mission boundary. Starts a mission first whenever the machine is idle.
    pub fn consume_budget(&mut self, budget_seconds: f64, offline: bool) -> CatchUpReport {
        let mut report = CatchUpReport::default();
        if !budget_seconds.is_finite() || budget_seconds <= 0.0 {
            return report;
        }
        let log_start = self.log().len();
        let mut remaining = budget_seconds;

        while remaining > 0.0 {
            if !self.is_running() && !self.select_next(offline) {
                break;
            }
            let Some(left) = self.remaining_seconds() else {
                break;
            };
            let step = left.min(remaining);
            log::trace!("catch-up step {step:.6}s (remaining budget {remaining:.6}s)");
            if self.advance(step, offline).is_some() {
                report.completed += 1;
            }
            remaining -= step;
            report.steps += 1;
            report.consumed_seconds += step;
        }

        let started = self.log().entries()[log_start..]
            .iter()
            .filter(|entry| entry.kind == MissionLogType::Info)
            .count();
        report.started = u64::try_from(started).unwrap_or(u64::MAX);
        report
    }
}
