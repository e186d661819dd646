//! Study session over a fixed list of due cards.
//!
//! The list is captured once when the session starts and is never re-queried:
//! a card that stops being due mid-session stays in the list. The caller owns
//! the session value and passes the ledger in on every submit.

use super::{CardSnapshot, Grade};
use crate::database::{CardLedger, DueSetSelector};
use crate::error::{Result, SchedulerError};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct StudySession {
    user_id: String,
    collection_id: String,
    cards: Vec<CardSnapshot>,
    position: usize,
}

impl StudySession {
    /// Starts a session from the cards due at `now`.
    pub fn start(
        selector: &DueSetSelector<'_>,
        user_id: &str,
        collection_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let cards = selector.list_due(user_id, collection_id, now)?;
        log::debug!(
            "Starting study session for {}/{} with {} card(s)",
            user_id,
            collection_id,
            cards.len()
        );
        Ok(Self::from_cards(user_id, collection_id, cards))
    }

    pub fn from_cards(user_id: &str, collection_id: &str, cards: Vec<CardSnapshot>) -> Self {
        Self {
            user_id: user_id.to_string(),
            collection_id: collection_id.to_string(),
            cards,
            position: 0,
        }
    }

    /// The card to review next, or `None` once the session is complete.
    pub fn current(&self) -> Option<&CardSnapshot> {
        self.cards.get(self.position)
    }

    /// Grades the current card, records the review and moves to the next card.
    ///
    /// The cursor only advances if the review was recorded.
    pub fn submit(
        &mut self,
        ledger: &CardLedger,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<CardSnapshot> {
        let card = self.current().ok_or(SchedulerError::SessionComplete)?;
        let updated = ledger.append_review(
            &self.user_id,
            &self.collection_id,
            &card.card_name,
            &card.card_text,
            grade,
            now,
        )?;
        self.position += 1;
        Ok(updated)
    }

    pub fn is_complete(&self) -> bool {
        self.position == self.cards.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total_count(&self) -> usize {
        self.cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.cards.len() - self.position
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn progress_message(&self) -> String {
        if self.is_complete() {
            format!("Session complete: {} card(s) reviewed", self.total_count())
        } else {
            format!("Card {} of {}", self.position + 1, self.total_count())
        }
    }
}
