//! End-to-end scheduling tests against an on-disk review log.

use chrono::{DateTime, Duration, TimeZone, Utc};
use flashcard_scheduler::{
    CardLedger, DueSetSelector, Grade, ManualClock, Result, Scheduler, SchedulerError,
};
use flashcard_scheduler::models::review_policy::MAX_INTERVAL;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn open_ledger(temp_dir: &TempDir) -> Result<CardLedger> {
    CardLedger::open(
        temp_dir.path().join("reviews.sqlite3"),
        std::time::Duration::from_secs(5),
    )
}

/// Register, review on successive days, then fail the card.
#[test]
fn test_mitosis_scenario() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(t0()));
    let scheduler = Scheduler::new(open_ledger(&temp_dir)?, clock.clone());

    assert!(scheduler.register_card("alice", "bio", "Mitosis", "Division into two cells")?);
    let due = scheduler.list_due("alice", "bio")?;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].card_name, "Mitosis");
    assert_eq!(due[0].reps, 0);

    let first = scheduler.submit_review("alice", "bio", "Mitosis", "Division into two cells", 5)?;
    assert_eq!(first.reps, 1);
    assert_eq!(first.interval, 1.0);
    assert!(approx(first.ease_factor, 2.875));
    assert_eq!(first.next_due_at, Some(t0() + Duration::days(1)));
    assert!(scheduler.list_due("alice", "bio")?.is_empty());

    clock.set(t0() + Duration::days(1));
    let second = scheduler.submit_review("alice", "bio", "Mitosis", "Division into two cells", 4)?;
    assert_eq!(second.reps, 2);
    assert_eq!(second.interval, 2.0);
    assert!(approx(second.ease_factor, 3.1625));
    assert_eq!(second.next_due_at, Some(t0() + Duration::days(3)));

    clock.set(t0() + Duration::days(3));
    let third = scheduler.submit_review("alice", "bio", "Mitosis", "Division into two cells", 2)?;
    assert_eq!(third.reps, 0);
    assert_eq!(third.interval, 1.0);
    assert!(approx(third.ease_factor, 3.1625 * 0.9));

    let history = scheduler.history("alice", "bio", "Mitosis")?;
    assert_eq!(history.len(), 4);
    assert_eq!(scheduler.current_snapshot("alice", "bio", "Mitosis")?, third);

    Ok(())
}

#[test]
fn test_third_success_multiplies_by_ease() -> Result<()> {
    let ledger = CardLedger::open_in_memory()?;
    ledger.register_card("alice", "bio", "Mitosis", "x", t0())?;
    ledger.append_review("alice", "bio", "Mitosis", "x", Grade::Ok, t0())?;
    let second = ledger.append_review("alice", "bio", "Mitosis", "x", Grade::Easy, t0())?;
    let third = ledger.append_review("alice", "bio", "Mitosis", "x", Grade::Easy, t0())?;

    assert_eq!(third.reps, 3);
    assert!(approx(third.interval, 2.0 * second.ease_factor));
    Ok(())
}

/// A card graded easy over and over keeps accepting successful grades.
#[test]
fn test_many_easy_reviews_stay_schedulable() -> Result<()> {
    let ledger = CardLedger::open_in_memory()?;
    ledger.register_card("alice", "bio", "Mitosis", "x", t0())?;

    let mut last = None;
    for _ in 0..40 {
        last = Some(ledger.append_review("alice", "bio", "Mitosis", "x", Grade::VeryEasy, t0())?);
    }
    let last = last.unwrap();
    assert_eq!(last.reps, 40);
    assert_eq!(last.interval, MAX_INTERVAL);
    assert_eq!(last.next_due_at, Some(t0() + Duration::days(36_500)));
    assert_eq!(ledger.current_snapshot("alice", "bio", "Mitosis")?, last);

    let failed = ledger.append_review("alice", "bio", "Mitosis", "x", Grade::Hard, t0())?;
    assert_eq!((failed.reps, failed.interval), (0, 1.0));
    Ok(())
}

#[test]
fn test_register_twice_leaves_one_event() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ledger = open_ledger(&temp_dir)?;

    assert!(ledger.register_card("alice", "bio", "Mitosis", "x", t0())?);
    assert!(!ledger.register_card("alice", "bio", "Mitosis", "x", t0() + Duration::hours(2))?);

    let history = ledger.history("alice", "bio", "Mitosis")?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reps, 0);
    Ok(())
}

#[test]
fn test_review_of_unregistered_card() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(t0()));
    let scheduler = Scheduler::new(open_ledger(&temp_dir)?, clock);

    let result = scheduler.submit_review("alice", "bio", "Mitosis", "x", 3);
    assert!(matches!(result, Err(SchedulerError::NotFound { .. })));
    Ok(())
}

/// Reviews for distinct cards, interleaved across threads, end in the same
/// state as the same reviews applied one card at a time.
#[test]
fn test_concurrent_reviews_of_distinct_cards() -> Result<()> {
    let grades = [Grade::VeryEasy, Grade::Ok, Grade::Hard, Grade::Easy, Grade::Easy];
    let cards: Vec<String> = (0..8).map(|i| format!("card-{}", i)).collect();

    let temp_dir = TempDir::new()?;
    let shared = Arc::new(open_ledger(&temp_dir)?);
    for name in &cards {
        shared.register_card("alice", "bio", name, "x", t0())?;
    }

    let handles: Vec<_> = cards
        .iter()
        .cloned()
        .map(|name| {
            let ledger = Arc::clone(&shared);
            thread::spawn(move || -> Result<()> {
                for (day, grade) in grades.iter().enumerate() {
                    let now = t0() + Duration::days(day as i64);
                    ledger.append_review("alice", "bio", &name, "x", *grade, now)?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("review thread panicked")?;
    }

    let sequential = CardLedger::open_in_memory()?;
    sequential.register_card("alice", "bio", "solo", "x", t0())?;
    let mut expected = None;
    for (day, grade) in grades.iter().enumerate() {
        let now = t0() + Duration::days(day as i64);
        expected = Some(sequential.append_review("alice", "bio", "solo", "x", *grade, now)?);
    }
    let expected = expected.unwrap();

    for name in &cards {
        let snapshot = shared.current_snapshot("alice", "bio", name)?;
        assert_eq!(snapshot.reps, expected.reps);
        assert_eq!(snapshot.interval, expected.interval);
        assert_eq!(snapshot.ease_factor, expected.ease_factor);
        assert_eq!(snapshot.next_due_at, expected.next_due_at);
        assert_eq!(shared.history("alice", "bio", name)?.len(), grades.len() + 1);
    }
    Ok(())
}

/// Concurrent reviews of the same card are applied one after the other, so no
/// grade is lost.
#[test]
fn test_concurrent_reviews_of_same_card_are_serialized() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let shared = Arc::new(open_ledger(&temp_dir)?);
    shared.register_card("alice", "bio", "Mitosis", "x", t0())?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ledger = Arc::clone(&shared);
            thread::spawn(move || -> Result<()> {
                for _ in 0..3 {
                    ledger.append_review("alice", "bio", "Mitosis", "x", Grade::Ok, t0())?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("review thread panicked")?;
    }

    let snapshot = shared.current_snapshot("alice", "bio", "Mitosis")?;
    assert_eq!(snapshot.reps, 12);
    let history = shared.history("alice", "bio", "Mitosis")?;
    assert_eq!(history.len(), 13);
    assert!(history.windows(2).all(|w| w[1].reps == w[0].reps + 1));
    Ok(())
}

#[test]
fn test_session_snapshot_is_fixed_at_start() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ledger = open_ledger(&temp_dir)?;
    for name in ["Mitosis", "Meiosis", "Osmosis"] {
        ledger.register_card("alice", "bio", name, "x", t0())?;
    }

    let selector = DueSetSelector::new(&ledger);
    let mut session = flashcard_scheduler::StudySession::start(&selector, "alice", "bio", t0())?;
    assert_eq!(session.total_count(), 3);

    while !session.is_complete() {
        session.submit(&ledger, Grade::VeryEasy, t0())?;
    }
    assert!(selector.list_due("alice", "bio", t0())?.is_empty());
    assert!(matches!(
        session.submit(&ledger, Grade::Ok, t0()),
        Err(SchedulerError::SessionComplete)
    ));
    Ok(())
}
