use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable row of the review log.
///
/// `seq` is assigned by the store on insert and is the only ordering authority
/// between events of the same card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub seq: i64,
    pub user_id: String,
    pub collection_id: String,
    pub card_name: String,
    pub card_text: String,
    pub last_studied_at: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
    pub interval: f64,
    pub ease_factor: f64,
    pub reps: u32,
}

impl ReviewEvent {
    /// Registration events are the only ones without a study timestamp.
    pub fn is_registration(&self) -> bool {
        self.last_studied_at.is_none()
    }
}
