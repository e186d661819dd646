//! Selection of the cards that are due for review.
//!
//! A card's latest event decides whether it is due. An earlier event of the same
//! card that is still due in the future keeps the card out of the list, so a card
//! reviewed ahead of schedule does not resurface early.

use super::db::{self, EVENT_COLUMNS};
use super::ledger::CardLedger;
use crate::error::Result;
use crate::models::CardSnapshot;
use crate::models::card::require_non_empty;
use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

/// Default grace window applied to reviewed cards, absorbing clock skew.
pub const DEFAULT_GRACE: Duration = Duration::minutes(1);

/// Lists due cards from a ledger. Results are recomputed on every call.
#[derive(Debug, Clone, Copy)]
pub struct DueSetSelector<'a> {
    ledger: &'a CardLedger,
    grace: Duration,
}

impl<'a> DueSetSelector<'a> {
    pub fn new(ledger: &'a CardLedger) -> Self {
        Self {
            ledger,
            grace: DEFAULT_GRACE,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Cards of a user's collection that are eligible for review at `now`.
    ///
    /// A card is eligible when its latest event is due:
    /// - a reviewed card once `next_due_at <= now - grace`
    /// - a never-reviewed card once `next_due_at <= now` (or at once if the
    ///   registration carries no due date)
    ///
    /// and no other event of the card has `next_due_at > now`.
    ///
    /// Ordered by ascending `reps`, then by registration order.
    pub fn list_due(
        &self,
        user_id: &str,
        collection_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<CardSnapshot>> {
        require_non_empty("user id", user_id)?;
        require_non_empty("collection id", collection_id)?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS}
             FROM review_events e
             JOIN (SELECT card_name, MAX(seq) AS latest_seq, MIN(seq) AS first_seq
                   FROM review_events
                   WHERE user_id = ?1 AND collection_id = ?2
                   GROUP BY card_name) g ON e.seq = g.latest_seq
             WHERE ((e.last_studied_at IS NULL AND (e.next_due_at IS NULL OR e.next_due_at <= ?3))
                    OR (e.last_studied_at IS NOT NULL AND e.next_due_at <= ?4))
               AND NOT EXISTS (SELECT 1 FROM review_events o
                               WHERE o.user_id = ?1 AND o.collection_id = ?2
                                 AND o.card_name = e.card_name AND o.seq <> e.seq
                                 AND o.next_due_at > ?3)
             ORDER BY e.reps ASC, g.first_seq ASC"
        );

        let conn = self.ledger.lock();
        let mut stmt = conn.prepare(&sql)?;
        let due = stmt
            .query_map(
                params![
                    user_id,
                    collection_id,
                    db::to_millis(now),
                    db::to_millis(now - self.grace)
                ],
                db::event_from_row,
            )?
            .map(|event| event.map(CardSnapshot::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;

        log::debug!(
            "{} card(s) due for {}/{} at {}",
            due.len(),
            user_id,
            collection_id,
            now
        );
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    fn names(cards: &[CardSnapshot]) -> Vec<&str> {
        cards.iter().map(|c| c.card_name.as_str()).collect()
    }

    #[test]
    fn test_registered_card_is_due_immediately() {
        let ledger = CardLedger::open_in_memory().unwrap();
        ledger.register_card("alice", "bio", "Mitosis", "x", t0()).unwrap();

        let due = DueSetSelector::new(&ledger).list_due("alice", "bio", t0()).unwrap();
        assert_eq!(names(&due), vec!["Mitosis"]);
    }

    #[test]
    fn test_card_registered_in_the_future_is_not_due() {
        let ledger = CardLedger::open_in_memory().unwrap();
        ledger
            .register_card("alice", "bio", "Mitosis", "x", t0() + Duration::hours(1))
            .unwrap();

        let due = DueSetSelector::new(&ledger).list_due("alice", "bio", t0()).unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn test_reviewed_card_leaves_and_returns_after_grace() {
        let ledger = CardLedger::open_in_memory().unwrap();
        ledger.register_card("alice", "bio", "Mitosis", "x", t0()).unwrap();
        ledger
            .append_review("alice", "bio", "Mitosis", "x", Grade::Ok, t0())
            .unwrap();

        let selector = DueSetSelector::new(&ledger);
        let due_at = t0() + Duration::days(1);

        assert!(selector.list_due("alice", "bio", t0()).unwrap().is_empty());
        assert!(selector.list_due("alice", "bio", due_at).unwrap().is_empty());
        assert!(
            selector
                .list_due("alice", "bio", due_at + Duration::seconds(59))
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            selector
                .list_due("alice", "bio", due_at + Duration::minutes(1))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_custom_grace_window() {
        let ledger = CardLedger::open_in_memory().unwrap();
        ledger.register_card("alice", "bio", "Mitosis", "x", t0()).unwrap();
        ledger
            .append_review("alice", "bio", "Mitosis", "x", Grade::Ok, t0())
            .unwrap();

        let selector = DueSetSelector::new(&ledger).with_grace(Duration::zero());
        let due = selector
            .list_due("alice", "bio", t0() + Duration::days(1))
            .unwrap();
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_earlier_event_due_in_the_future_hides_card() {
        let ledger = CardLedger::open_in_memory().unwrap();
        ledger.register_card("alice", "bio", "Mitosis", "x", t0()).unwrap();
        // Build up a long interval, then fail the card.
        for _ in 0..4 {
            ledger
                .append_review("alice", "bio", "Mitosis", "x", Grade::VeryEasy, t0())
                .unwrap();
        }
        let failed_at = t0() + Duration::days(2);
        ledger
            .append_review("alice", "bio", "Mitosis", "x", Grade::VeryHard, failed_at)
            .unwrap();

        // The latest event is due a day after the failure, but earlier ones are
        // still due later than that.
        let history = ledger.history("alice", "bio", "Mitosis").unwrap();
        let check_at = failed_at + Duration::days(1) + Duration::minutes(5);
        let pending = history
            .iter()
            .filter(|e| e.next_due_at.unwrap() > check_at)
            .count();
        assert_eq!(pending, 2);

        let selector = DueSetSelector::new(&ledger);
        assert!(selector.list_due("alice", "bio", check_at).unwrap().is_empty());

        let latest_pending = history.iter().filter_map(|e| e.next_due_at).max().unwrap();
        let due = selector
            .list_due("alice", "bio", latest_pending + Duration::minutes(1))
            .unwrap();
        assert_eq!(names(&due), vec!["Mitosis"]);
        assert_eq!(due[0].reps, 0);
    }

    #[test]
    fn test_never_returns_card_whose_latest_event_is_in_the_future() {
        let ledger = CardLedger::open_in_memory().unwrap();
        for name in ["a", "b", "c"] {
            ledger.register_card("alice", "bio", name, "x", t0()).unwrap();
        }
        ledger
            .append_review("alice", "bio", "b", "x", Grade::Hard, t0())
            .unwrap();

        for offset_hours in [0, 12, 24, 48] {
            let now = t0() + Duration::hours(offset_hours);
            for card in DueSetSelector::new(&ledger).list_due("alice", "bio", now).unwrap() {
                assert!(card.next_due_at.unwrap() <= now);
            }
        }
    }

    #[test]
    fn test_ordering_by_reps_then_registration() {
        let ledger = CardLedger::open_in_memory().unwrap();
        for name in ["first", "second", "third"] {
            ledger.register_card("alice", "bio", name, "x", t0()).unwrap();
        }
        ledger
            .append_review("alice", "bio", "first", "x", Grade::Ok, t0())
            .unwrap();

        let later = t0() + Duration::days(2);
        let due = DueSetSelector::new(&ledger).list_due("alice", "bio", later).unwrap();
        assert_eq!(names(&due), vec!["second", "third", "first"]);
    }

    #[test]
    fn test_scoped_to_user_and_collection() {
        let ledger = CardLedger::open_in_memory().unwrap();
        ledger.register_card("alice", "bio", "Mitosis", "x", t0()).unwrap();
        ledger.register_card("alice", "chem", "Ion", "x", t0()).unwrap();
        ledger.register_card("bob", "bio", "Osmosis", "x", t0()).unwrap();

        let due = DueSetSelector::new(&ledger).list_due("alice", "bio", t0()).unwrap();
        assert_eq!(names(&due), vec!["Mitosis"]);
    }
}
