//! Append-only review log for cards.
//!
//! Every registration and every review appends one `ReviewEvent`; rows are never
//! updated or deleted. A card's current state is the event with the highest
//! `seq` for its identity, read as a whole.

use super::db::{self, EVENT_COLUMNS};
use crate::error::Result;
use crate::models::card::require_non_empty;
use crate::models::review_policy::{self, INITIAL_EASE_FACTOR, INITIAL_INTERVAL};
use crate::models::{CardKey, CardSnapshot, Grade, ReviewEvent};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Owns the connection to the review log.
///
/// The connection sits behind a mutex, and every read-then-append runs inside an
/// IMMEDIATE transaction while the mutex is held. Two reviews of the same card
/// are therefore applied one after the other, each reading the state the other
/// left behind, including when another process shares the database file.
pub struct CardLedger {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for CardLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardLedger").finish_non_exhaustive()
    }
}

impl CardLedger {
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let conn = db::open_database(path.as_ref(), busy_timeout)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(db::open_in_memory()?))
    }

    /// Wraps a connection whose schema is already initialised.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        // SQLite rolls back any transaction left open by a panicking holder,
        // so a poisoned connection is still consistent.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a card, due immediately.
    ///
    /// Returns `false` without writing anything if the identity already has
    /// events. Registering twice is not an error.
    pub fn register_card(
        &self,
        user_id: &str,
        collection_id: &str,
        card_name: &str,
        card_text: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let key = CardKey::new(user_id, collection_id, card_name)?;

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM review_events
             WHERE user_id = ?1 AND collection_id = ?2 AND card_name = ?3)",
            params![key.user_id, key.collection_id, key.card_name],
            |row| row.get(0),
        )?;

        if exists {
            log::warn!("Card {} is already registered, not adding it again", key);
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO review_events
                 (user_id, collection_id, card_name, card_text, last_studied_at, next_due_at, interval_days, ease_factor, reps)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7, 0)",
            params![
                key.user_id,
                key.collection_id,
                key.card_name,
                card_text,
                db::to_millis(now),
                INITIAL_INTERVAL,
                INITIAL_EASE_FACTOR
            ],
        )?;
        tx.commit()?;

        log::info!("Registered card {}", key);
        Ok(true)
    }

    /// Applies a grade to a registered card and appends the resulting event.
    ///
    /// `card_text` is recorded on the new event, so the latest text wins.
    pub fn append_review(
        &self,
        user_id: &str,
        collection_id: &str,
        card_name: &str,
        card_text: &str,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<CardSnapshot> {
        let key = CardKey::new(user_id, collection_id, card_name)?;

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = latest_event(&tx, &key)?.ok_or_else(|| key.not_found())?;
        let outcome = review_policy::next_state(
            grade,
            current.interval,
            current.ease_factor,
            current.reps,
            now,
        )?;

        tx.execute(
            "INSERT INTO review_events
                 (user_id, collection_id, card_name, card_text, last_studied_at, next_due_at, interval_days, ease_factor, reps)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                key.user_id,
                key.collection_id,
                key.card_name,
                card_text,
                db::to_millis(now),
                db::to_millis(outcome.next_due_at),
                outcome.interval,
                outcome.ease_factor,
                outcome.reps
            ],
        )?;
        let seq = tx.last_insert_rowid();
        tx.commit()?;

        log::info!(
            "Reviewed {} with grade {}: reps={} interval={:.3}d ease={:.4}",
            key,
            grade,
            outcome.reps,
            outcome.interval,
            outcome.ease_factor
        );

        Ok(CardSnapshot {
            seq,
            card_name: key.card_name,
            card_text: card_text.to_string(),
            last_studied_at: Some(now),
            next_due_at: Some(outcome.next_due_at),
            interval: outcome.interval,
            ease_factor: outcome.ease_factor,
            reps: outcome.reps,
        })
    }

    /// Current state of a card: its highest-`seq` event.
    pub fn current_snapshot(
        &self,
        user_id: &str,
        collection_id: &str,
        card_name: &str,
    ) -> Result<CardSnapshot> {
        let key = CardKey::new(user_id, collection_id, card_name)?;
        let conn = self.lock();
        let event = latest_event(&conn, &key)?.ok_or_else(|| key.not_found())?;
        Ok(event.into())
    }

    /// Collections holding at least one card for the user, sorted by name.
    pub fn list_collections(&self, user_id: &str) -> Result<Vec<String>> {
        require_non_empty("user id", user_id)?;
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT collection_id FROM review_events
             WHERE user_id = ?1
             ORDER BY collection_id",
        )?;
        let collections = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(collections)
    }

    /// Current snapshot of every card in a collection, in registration order.
    pub fn list_cards(&self, user_id: &str, collection_id: &str) -> Result<Vec<CardSnapshot>> {
        require_non_empty("user id", user_id)?;
        require_non_empty("collection id", collection_id)?;

        let conn = self.lock();
        let sql = format!(
            "SELECT {EVENT_COLUMNS}
             FROM review_events e
             JOIN (SELECT card_name, MAX(seq) AS latest_seq, MIN(seq) AS first_seq
                   FROM review_events
                   WHERE user_id = ?1 AND collection_id = ?2
                   GROUP BY card_name) g ON e.seq = g.latest_seq
             ORDER BY g.first_seq ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params![user_id, collection_id], db::event_from_row)?
            .map(|event| event.map(CardSnapshot::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    /// Full event log of one card, oldest first. Empty if never registered.
    pub fn history(
        &self,
        user_id: &str,
        collection_id: &str,
        card_name: &str,
    ) -> Result<Vec<ReviewEvent>> {
        let key = CardKey::new(user_id, collection_id, card_name)?;
        let conn = self.lock();
        let sql = format!(
            "SELECT {EVENT_COLUMNS}
             FROM review_events e
             WHERE e.user_id = ?1 AND e.collection_id = ?2 AND e.card_name = ?3
             ORDER BY e.seq ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let events = stmt
            .query_map(
                params![key.user_id, key.collection_id, key.card_name],
                db::event_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }
}

fn latest_event(conn: &Connection, key: &CardKey) -> rusqlite::Result<Option<ReviewEvent>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS}
         FROM review_events e
         WHERE e.user_id = ?1 AND e.collection_id = ?2 AND e.card_name = ?3
         ORDER BY e.seq DESC
         LIMIT 1"
    );
    conn.query_row(
        &sql,
        params![key.user_id, key.collection_id, key.card_name],
        db::event_from_row,
    )
    .optional()
}
