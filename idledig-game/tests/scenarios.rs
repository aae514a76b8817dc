use idledig_game::{
    EngineCfg, MachineState, MissionCatalog, MissionDefinition, MissionLogType, MissionOutcome,
    MissionSession,
};

fn session_with(missions: Vec<MissionDefinition>, seed: u64) -> MissionSession {
    MissionSession::new(MissionCatalog::new(missions), &EngineCfg::seeded(seed)).unwrap()
}

#[test]
fn certain_success_tick_logs_outcome_then_restart() {
    let mut session = session_with(
        vec![MissionDefinition::new("A", 10.0).with_chances(1.0, 0.0)],
        1,
    );
    session.start();
    session.tick(10.0);

    let entries = session.log_entries();
    let outcome_positions: Vec<_> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == MissionLogType::Outcome)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(outcome_positions.len(), 1);

    let resolved = &entries[outcome_positions[0]];
    assert_eq!(resolved.outcome, Some(MissionOutcome::Success));
    assert_eq!(resolved.mission_id, "A");

    let next = &entries[outcome_positions[0] + 1];
    assert_eq!(next.kind, MissionLogType::Info);
    assert_eq!(next.mission_id, "A");
    assert_eq!(entries.len(), outcome_positions[0] + 2);
}

#[test]
fn offline_twelve_seconds_over_five_second_failures() {
    let mut session = session_with(
        vec![MissionDefinition::new("A", 5.0).with_chances(0.0, 0.0)],
        2,
    );
    session.simulate_offline(12.0);

    let entries = session.log_entries();
    let outcomes: Vec<_> = entries
        .iter()
        .filter(|e| e.kind == MissionLogType::Outcome)
        .collect();
    assert_eq!(outcomes.len(), 2);
    assert!(
        outcomes
            .iter()
            .all(|e| e.outcome == Some(MissionOutcome::Failure))
    );
    assert!((outcomes[0].total_elapsed_seconds - 5.0).abs() < 1e-9);
    assert!((outcomes[1].total_elapsed_seconds - 10.0).abs() < 1e-9);

    let started = entries
        .iter()
        .filter(|e| e.kind == MissionLogType::Info)
        .count();
    assert_eq!(started, 3);
    assert!(entries.iter().all(|e| e.generated_offline));
    assert_eq!(session.active_mission().unwrap().mission_id, "A");
    assert!((session.active_mission_elapsed() - 2.0).abs() < 1e-9);
}

#[test]
fn empty_catalog_never_logs() {
    let mut session = session_with(Vec::new(), 3);
    for delta in [0.016, 1.0, 500.0] {
        session.tick(delta);
    }
    session.simulate_offline(100.0);
    assert!(session.log_entries().is_empty());
    assert!(session.active_mission().is_none());
    assert_eq!(session.state(), MachineState::Idle);
}

#[test]
fn thirty_second_boundary() {
    let mission = MissionDefinition::new("B", 30.0).with_chances(1.0, 0.0);

    let mut short = session_with(vec![mission.clone()], 4);
    short.start();
    short.tick(29.9999);
    assert!(
        short
            .log_entries()
            .iter()
            .all(|e| e.kind != MissionLogType::Outcome)
    );

    let mut long = session_with(vec![mission], 4);
    long.start();
    long.tick(29.9999);
    long.tick(0.0002);
    assert_eq!(
        long.log_entries()
            .iter()
            .filter(|e| e.kind == MissionLogType::Outcome)
            .count(),
        1
    );
}

#[test]
fn skip_emits_warning_before_next_start() {
    let mut session = session_with(
        vec![
            MissionDefinition::new("A", 10.0),
            MissionDefinition::new("B", 10.0),
        ],
        5,
    );
    session.start();
    for _ in 0..20 {
        session.tick(0.7);
        let before = session.log_entries().len();
        assert!(session.skip_to_next());
        let added = &session.log_entries()[before..];
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].kind, MissionLogType::Warning);
        assert_eq!(added[1].kind, MissionLogType::Info);
    }
}

#[test]
fn force_start_is_not_offline_tagged() {
    let mut session = session_with(
        vec![
            MissionDefinition::new("A", 10.0),
            MissionDefinition::new("B", 10.0),
        ],
        6,
    );
    session.simulate_offline(15.0);
    session.force_start("B").unwrap();

    let last = session.log_entries().last().unwrap();
    assert_eq!(last.kind, MissionLogType::Info);
    assert_eq!(last.mission_id, "B");
    assert!(!last.generated_offline);
    assert!(session.force_start("C").is_err());
    assert_eq!(session.active_mission().unwrap().mission_id, "B");
}

#[test]
fn id_backfill_is_assigned_once() {
    let mut session = session_with(vec![MissionDefinition::new("", 3.0)], 7);
    session.start();
    let first = session.active_mission().unwrap().mission_id.clone();
    assert!(!first.is_empty());

    session.simulate_offline(10.0);
    assert!(session.log_entries().iter().all(|e| e.mission_id == first));
    assert_eq!(session.catalog().iter().next().unwrap().mission_id, first);
}

#[test]
fn single_active_mission_and_bounded_elapsed() {
    let missions = vec![
        MissionDefinition::new("quick", 1.0),
        MissionDefinition::new("mid", 7.5),
        MissionDefinition::new("slow", 42.0),
    ];
    let mut session = session_with(missions, 8);
    let epsilon = EngineCfg::default_resolution_epsilon();
    let deltas = [0.016, 0.5, 3.3, 0.0, 61.0, 0.25];

    for round in 0..400 {
        session.tick(deltas[round % deltas.len()]);
        if round % 37 == 0 {
            session.simulate_offline(95.5);
        }
        let active = session.active_mission().expect("catalog is non-empty");
        assert!(session.active_mission_elapsed() <= active.effective_duration() + epsilon);
        assert_eq!(session.state(), MachineState::Running);

        let outstanding = session.log_entries().iter().fold(0_i64, |open, e| match e.kind {
            MissionLogType::Info => open + 1,
            MissionLogType::Outcome | MissionLogType::Warning => open - 1,
        });
        assert_eq!(outstanding, 1);
    }
}
