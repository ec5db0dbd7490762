//! Integration tests for durable preferences.
//!
//! Notify states, the offset and the rotation order must survive a restart
//! when backed by the SQLite store.

use std::sync::Arc;

use chrono::NaiveDate;
use starwatch_core::{
    Catalog, Config, FixedClock, NotifyId, NotifyStateTree, Preferences, RecordingNotifier,
    RotationState, Scheduler, SchedulerSettings, SqlitePreferenceStore,
};

fn open(path: &std::path::Path, catalog: &Catalog) -> Preferences {
    let config = Config::default();
    let store = SqlitePreferenceStore::open(path).unwrap();
    Preferences::restore(
        NotifyStateTree::from_catalog(catalog),
        Box::new(store),
        config.notifications.default_offset_minutes,
        config.notifications.offset_choices,
    )
}

#[test]
fn test_notify_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("starwatch.db");
    let catalog = Catalog::builtin().unwrap();

    {
        let mut prefs = open(&path, &catalog);
        prefs.toggle(&NotifyId::category("hot"), false).unwrap();
        prefs.toggle(&NotifyId::event("octovine"), true).unwrap();
        prefs.set_offset(20).unwrap();
        assert_eq!(prefs.pending_writes(), 0);
    }

    let prefs = open(&path, &catalog);
    assert!(!prefs.is_enabled(&NotifyId::category("hot")));
    assert!(!prefs.is_enabled(&NotifyId::event("chak-gerent")));
    assert!(prefs.is_enabled(&NotifyId::event("octovine")));
    assert!(prefs.is_enabled(&NotifyId::category("core")));
    assert_eq!(prefs.offset_minutes(), 20);
}

#[test]
fn test_rotation_is_persisted_by_scheduler() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("starwatch.db");
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let tuesday = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();

    let scheduler = Scheduler::new(
        Arc::clone(&catalog),
        open(&path, &catalog),
        Arc::new(FixedClock(tuesday.and_hms_opt(12, 0, 0).unwrap())),
        Arc::new(RecordingNotifier::new()),
        SchedulerSettings::default(),
    );
    scheduler.tick_once().unwrap();
    let order = scheduler.handle().rotation_order().unwrap();
    assert_eq!(order, vec!["r4", "r5", "r6", "r1", "r2", "r3"]);
    drop(scheduler);

    let prefs = open(&path, &catalog);
    let mut rotation = RotationState::new(catalog.rotation().clone());
    assert!(prefs.restore_rotation(&mut rotation, tuesday));
    assert_eq!(rotation.order(), order.as_slice());
    assert!(!rotation.advance_for(tuesday));

    // A stored order from another day is ignored.
    let mut rotation = RotationState::new(catalog.rotation().clone());
    assert!(!prefs.restore_rotation(&mut rotation, tuesday.succ_opt().unwrap()));
}

#[test]
fn test_rotation_day_is_utc_under_local_offset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("starwatch.db");
    let catalog = Arc::new(Catalog::builtin().unwrap().translated(-600));
    let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

    // Local Monday 14:20 at UTC-10 is Tuesday in UTC.
    let scheduler = Scheduler::new(
        Arc::clone(&catalog),
        open(&path, &catalog),
        Arc::new(FixedClock(monday.and_hms_opt(14, 20, 0).unwrap())),
        Arc::new(RecordingNotifier::new()),
        SchedulerSettings::default(),
    );
    let outcome = scheduler.tick_once().unwrap();
    assert!(outcome.candidates.iter().any(|c| c.event_id == "shiverpeaks-rift"));
    assert_eq!(scheduler.handle().rotation_order().unwrap()[0], "r4");
    drop(scheduler);

    let prefs = open(&path, &catalog);
    let mut rotation = RotationState::new(catalog.rotation().clone());
    assert!(prefs.restore_rotation(&mut rotation, monday.succ_opt().unwrap()));
}
