//! Integration coverage for the full combat lifecycle: content registries
//! feeding a session, trigger passes firing at the right points, events
//! draining to the sink, and replay determinism.

use dice_content::{AffixRegistry, DieTemplateRegistry};
use runtime::{AggregatingSink, CombatSession, FileReplayLog, NullSink, SessionConfig, SessionError};

fn registries() -> (AffixRegistry, DieTemplateRegistry) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let affixes = AffixRegistry::load().expect("affix catalogs load");
    let dice = DieTemplateRegistry::load(&affixes).expect("die catalog loads");
    (affixes, dice)
}

fn session(loadout: &[&str], seed: u64) -> CombatSession<AggregatingSink> {
    let (_, dice) = registries();
    CombatSession::new(
        SessionConfig {
            loadout: loadout.iter().map(|s| s.to_string()).collect(),
            seed: Some(seed),
        },
        &dice,
        AggregatingSink::new(),
    )
    .expect("session builds")
}

#[test]
fn full_combat_lifecycle_runs_clean() {
    let mut session = session(&["ember_d6", "frost_d8", "plain_d6"], 1234);

    session.begin_combat();
    session.begin_turn();

    let hand_size = session.pool().hand().len();
    assert_eq!(hand_size, 3);

    // Ghost hand: playing every die never shrinks the hand.
    for slot in 0..hand_size {
        session.play_die(slot).expect("die plays");
        assert_eq!(session.pool().hand().len(), hand_size);
    }
    assert_eq!(session.pool().unconsumed_count(), 0);

    session.end_turn();
    session.begin_turn();
    assert_eq!(session.pool().unconsumed_count(), 3);

    session.finish_combat();
    assert!(!session.pool().in_combat());
    assert_eq!(session.history().len(), 2);

    // ember_d6 and frost_d8 both queue status events when played.
    assert!(!session.sink().statuses.is_empty());
}

#[test]
fn playing_the_same_slot_twice_is_rejected() {
    let mut session = session(&["plain_d6", "plain_d6"], 7);
    session.begin_combat();
    session.begin_turn();

    session.play_die(0).expect("first play");
    match session.play_die(0) {
        Err(SessionError::Pool(_)) => {}
        other => panic!("expected pool error, got {other:?}"),
    }
}

#[test]
fn combat_start_banner_buffs_other_dice_every_turn() {
    // banner_d6 carries war_banner (OnCombatStart, +1 to all others), which
    // must materialize as a persistent modifier and shape every rolled hand.
    let mut session = session(&["banner_d6", "plain_d6", "plain_d6"], 42);
    session.begin_combat();
    assert!(!session.pool().modifiers().is_empty());

    for _ in 0..2 {
        session.begin_turn();
        let hand = session.pool().hand();
        for die in &hand[1..] {
            // d6 face is 1..=6; the banner bonus pushes the total past it.
            assert!(
                die.total_value() > die.base_value(),
                "banner bonus missing on slot {}",
                die.slot_index
            );
        }
        session.end_turn();
    }
}

#[test]
fn sessions_with_equal_seeds_replay_identically() {
    let loadout = ["ember_d6", "storm_d6", "gamblers_d20"];

    let mut first = session(&loadout, 99);
    let mut second = session(&loadout, 99);
    for run in [&mut first, &mut second] {
        run.begin_combat();
        run.begin_turn();
        run.play_die(0).unwrap();
        run.end_turn();
        run.begin_turn();
        run.finish_combat();
    }

    assert_eq!(first.history(), second.history());
}

#[test]
fn unknown_template_is_a_build_error() {
    let (_, dice) = registries();
    let result = CombatSession::new(
        SessionConfig {
            loadout: vec!["no_such_die".into()],
            seed: Some(1),
        },
        &dice,
        NullSink,
    );
    assert!(matches!(result, Err(SessionError::UnknownTemplate(_))));
}

#[test]
fn replay_log_round_trips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = FileReplayLog::new(dir.path()).expect("log creates");

    let mut session = session(&["ember_d6", "plain_d6"], 5);
    session.begin_combat();
    session.begin_turn();
    session.play_die(1).unwrap();
    session.end_turn();
    session.finish_combat();

    log.save_all(session.history()).expect("save");
    let loaded = log.load().expect("load");
    assert_eq!(loaded, session.history());
}
