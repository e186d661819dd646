//! Current state of a card, reduced from its event log.
use super::ReviewEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All fields come from a single event: the one with the highest `seq` for the
/// card. Fields are never mixed across events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub seq: i64,
    pub card_name: String,
    pub card_text: String,
    pub last_studied_at: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
    pub interval: f64,
    pub ease_factor: f64,
    pub reps: u32,
}

impl From<ReviewEvent> for CardSnapshot {
    fn from(event: ReviewEvent) -> Self {
        Self {
            seq: event.seq,
            card_name: event.card_name,
            card_text: event.card_text,
            last_studied_at: event.last_studied_at,
            next_due_at: event.next_due_at,
            interval: event.interval,
            ease_factor: event.ease_factor,
            reps: event.reps,
        }
    }
}

/// What the presentation layer needs to show a due card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DueCard {
    pub card_name: String,
    pub card_text: String,
    pub reps: u32,
}

impl From<&CardSnapshot> for DueCard {
    fn from(snapshot: &CardSnapshot) -> Self {
        Self {
            card_name: snapshot.card_name.clone(),
            card_text: snapshot.card_text.clone(),
            reps: snapshot.reps,
        }
    }
}
