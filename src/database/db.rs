//! SQLite plumbing for the review log
//!
//! Opens connections, creates the append-only `review_events` table and converts
//! rows to `ReviewEvent`s. Timestamps are stored as UTC milliseconds since the
//! Unix epoch; `seq` is the insertion-order authority.

use crate::models::ReviewEvent;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result, Row};
use std::path::Path;
use std::time::Duration;

/// Columns of `review_events` in the order `event_from_row` expects,
/// qualified with the `e` alias every query uses.
pub const EVENT_COLUMNS: &str = "e.seq, e.user_id, e.collection_id, e.card_name, e.card_text, \
     e.last_studied_at, e.next_due_at, e.interval_days, e.ease_factor, e.reps";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS review_events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    collection_id TEXT NOT NULL,
    card_name TEXT NOT NULL,
    card_text TEXT NOT NULL,
    last_studied_at INTEGER,
    next_due_at INTEGER,
    interval_days REAL NOT NULL CHECK (interval_days >= 1),
    ease_factor REAL NOT NULL CHECK (ease_factor >= 1.3),
    reps INTEGER NOT NULL CHECK (reps >= 0)
);

CREATE INDEX IF NOT EXISTS idx_review_events_card
    ON review_events(user_id, collection_id, card_name, seq);
";

/// Opens (or creates) the review log at `path`.
///
/// Parent directories are created as needed. `busy_timeout` bounds how long a
/// write waits for another connection holding the database lock.
pub fn open_database(path: &Path, busy_timeout: Duration) -> crate::error::Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    log::debug!("journal_mode = {}", mode);
    init_schema(&conn)?;
    log::debug!("Opened review log at {}", path.display());
    Ok(conn)
}

/// Opens a throwaway in-memory review log.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates the table and index if they do not exist yet.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

pub fn to_millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

pub fn from_millis(idx: usize, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

fn optional_instant(row: &Row<'_>, idx: usize) -> Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<i64>>(idx)?
        .map(|millis| from_millis(idx, millis))
        .transpose()
}

/// Maps a row selected with `EVENT_COLUMNS`.
pub fn event_from_row(row: &Row<'_>) -> Result<ReviewEvent> {
    Ok(ReviewEvent {
        seq: row.get(0)?,
        user_id: row.get(1)?,
        collection_id: row.get(2)?,
        card_name: row.get(3)?,
        card_text: row.get(4)?,
        last_studied_at: optional_instant(row, 5)?,
        next_due_at: optional_instant(row, 6)?,
        interval: row.get(7)?,
        ease_factor: row.get(8)?,
        reps: row.get(9)?,
    })
}
