//! Append-only mission log and its observer list.
//!
//! Every engine transition that represents an event (start, resolution, early
//! termination) lands here as exactly one [`MissionLogEntry`]. Observers are
//! invoked synchronously, once per append and in append order; nothing is
//! buffered or coalesced, so listeners must cope with bursts during offline
//! catch-up.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::MissionDefinition;
use crate::outcome::MissionOutcome;

/// Category of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionLogType {
    Info,
    Outcome,
    Warning,
}

/// Immutable record of one engine event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionLogEntry {
    pub mission_id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: MissionLogType,
    /// Present iff `kind` is [`MissionLogType::Outcome`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<MissionOutcome>,
    /// Cumulative engine time when the event was emitted.
    pub total_elapsed_seconds: f64,
    pub generated_offline: bool,
}

impl MissionLogEntry {
    #[must_use]
    pub fn started(definition: &MissionDefinition, total_elapsed: f64, offline: bool) -> Self {
        Self {
            mission_id: definition.mission_id.clone(),
            message: format!("Mission '{}' started", definition.display_name),
            kind: MissionLogType::Info,
            outcome: None,
            total_elapsed_seconds: total_elapsed,
            generated_offline: offline,
        }
    }

    #[must_use]
    pub fn resolved(
        definition: &MissionDefinition,
        outcome: MissionOutcome,
        total_elapsed: f64,
        offline: bool,
    ) -> Self {
        let verb = match outcome {
            MissionOutcome::Success => "succeeded",
            MissionOutcome::PartialSuccess => "partially succeeded",
            MissionOutcome::Failure => "failed",
        };
        Self {
            mission_id: definition.mission_id.clone(),
            message: format!("Mission '{}' {verb}", definition.display_name),
            kind: MissionLogType::Outcome,
            outcome: Some(outcome),
            total_elapsed_seconds: total_elapsed,
            generated_offline: offline,
        }
    }

    #[must_use]
    pub fn terminated_early(definition: &MissionDefinition, total_elapsed: f64) -> Self {
        Self {
            mission_id: definition.mission_id.clone(),
            message: format!("Mission '{}' was terminated early", definition.display_name),
            kind: MissionLogType::Warning,
            outcome: None,
            total_elapsed_seconds: total_elapsed,
            generated_offline: false,
        }
    }
}

/// Handle returned by [`MissionLog::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked for each appended entry.
pub type LogObserver = Box<dyn FnMut(&MissionLogEntry)>;

/// Ordered, append-only sequence of log entries plus registered observers.
#[derive(Default)]
pub struct MissionLog {
    entries: Vec<MissionLogEntry>,
    observers: Vec<(SubscriptionId, LogObserver)>,
    next_subscription: u64,
}

impl MissionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and notify observers before returning.
    pub fn push(&mut self, entry: MissionLogEntry) {
        self.entries.push(entry);
        let Some(latest) = self.entries.last() else {
            return;
        };
        for (_, observer) in &mut self.observers {
            observer(latest);
        }
    }

    /// Read-only view of every entry so far.
    #[must_use]
    pub fn entries(&self) -> &[MissionLogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&MissionLogEntry) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for MissionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MissionLog")
            .field("entries", &self.entries)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn mission() -> MissionDefinition {
        MissionDefinition::new("dig", 10.0).with_display_name("Dig")
    }

    #[test]
    fn observers_see_entries_in_append_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut log = MissionLog::new();
        let sink = Rc::clone(&seen);
        log.subscribe(move |entry| sink.borrow_mut().push(entry.message.clone()));

        log.push(MissionLogEntry::started(&mission(), 0.0, false));
        log.push(MissionLogEntry::resolved(
            &mission(),
            MissionOutcome::Failure,
            10.0,
            true,
        ));

        assert_eq!(
            *seen.borrow(),
            vec!["Mission 'Dig' started", "Mission 'Dig' failed"]
        );
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let count = Rc::new(RefCell::new(0_u32));
        let mut log = MissionLog::new();
        let counter = Rc::clone(&count);
        let id = log.subscribe(move |_| *counter.borrow_mut() += 1);

        log.push(MissionLogEntry::started(&mission(), 0.0, false));
        assert!(log.unsubscribe(id));
        assert!(!log.unsubscribe(id));
        log.push(MissionLogEntry::terminated_early(&mission(), 1.0));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(log.observer_count(), 0);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn outcome_field_only_on_outcome_entries() {
        let started = MissionLogEntry::started(&mission(), 0.0, true);
        let resolved =
            MissionLogEntry::resolved(&mission(), MissionOutcome::PartialSuccess, 10.0, true);
        let warned = MissionLogEntry::terminated_early(&mission(), 3.0);

        assert_eq!(started.outcome, None);
        assert_eq!(resolved.kind, MissionLogType::Outcome);
        assert_eq!(resolved.outcome, Some(MissionOutcome::PartialSuccess));
        assert_eq!(resolved.message, "Mission 'Dig' partially succeeded");
        assert_eq!(warned.kind, MissionLogType::Warning);
        assert!(!warned.generated_offline);

        let json = serde_json::to_value(&started).unwrap();
        assert!(json.get("outcome").is_none());
        assert_eq!(json["type"], "info");
    }
}
