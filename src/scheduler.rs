//! Operations offered to the presentation layer.
//!
//! `Scheduler` binds a `CardLedger` to a `Clock` so callers never pass "now"
//! themselves, and accepts grades as raw 1-5 integers, validating them here.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::database::{CardLedger, DueSetSelector, due::DEFAULT_GRACE};
use crate::error::Result;
use crate::models::{CardSnapshot, DueCard, Grade, NewCard, ReviewEvent, StudySession};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

pub struct Scheduler {
    ledger: CardLedger,
    clock: Arc<dyn Clock>,
    grace: Duration,
}

impl Scheduler {
    pub fn new(ledger: CardLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            clock,
            grace: DEFAULT_GRACE,
        }
    }

    /// Opens the ledger named by the config, on wall-clock time.
    pub fn from_config(config: &Config) -> Result<Self> {
        let ledger = CardLedger::open(&config.database_path, config.busy_timeout())?;
        Ok(Self::new(ledger, Arc::new(SystemClock)).with_grace(config.due_grace()))
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ledger(&self) -> &CardLedger {
        &self.ledger
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn selector(&self) -> DueSetSelector<'_> {
        DueSetSelector::new(&self.ledger).with_grace(self.grace)
    }

    /// Registers one card. `false` means it already existed.
    pub fn register_card(
        &self,
        user_id: &str,
        collection_id: &str,
        card_name: &str,
        card_text: &str,
    ) -> Result<bool> {
        self.ledger
            .register_card(user_id, collection_id, card_name, card_text, self.now())
    }

    /// Registers a batch from a card source and returns how many were new.
    ///
    /// Stops at the first failing card; cards before it stay registered.
    pub fn register_cards(&self, user_id: &str, collection_id: &str, cards: &[NewCard]) -> Result<usize> {
        let now = self.now();
        let mut added = 0;
        for card in cards {
            if self
                .ledger
                .register_card(user_id, collection_id, &card.name, &card.text, now)?
            {
                added += 1;
            }
        }
        log::info!(
            "Registered {} of {} card(s) in {}/{}",
            added,
            cards.len(),
            user_id,
            collection_id
        );
        Ok(added)
    }

    pub fn list_due(&self, user_id: &str, collection_id: &str) -> Result<Vec<DueCard>> {
        let due = self.selector().list_due(user_id, collection_id, self.now())?;
        Ok(due.iter().map(DueCard::from).collect())
    }

    /// Records one review. `grade` must be 1 (Very Hard) to 5 (Very Easy).
    pub fn submit_review(
        &self,
        user_id: &str,
        collection_id: &str,
        card_name: &str,
        card_text: &str,
        grade: u8,
    ) -> Result<CardSnapshot> {
        let grade = Grade::try_from(grade)?;
        self.ledger
            .append_review(user_id, collection_id, card_name, card_text, grade, self.now())
    }

    pub fn start_session(&self, user_id: &str, collection_id: &str) -> Result<StudySession> {
        StudySession::start(&self.selector(), user_id, collection_id, self.now())
    }

    pub fn submit(&self, session: &mut StudySession, grade: Grade) -> Result<CardSnapshot> {
        session.submit(&self.ledger, grade, self.now())
    }

    pub fn current_snapshot(
        &self,
        user_id: &str,
        collection_id: &str,
        card_name: &str,
    ) -> Result<CardSnapshot> {
        self.ledger.current_snapshot(user_id, collection_id, card_name)
    }

    pub fn list_collections(&self, user_id: &str) -> Result<Vec<String>> {
        self.ledger.list_collections(user_id)
    }

    pub fn list_cards(&self, user_id: &str, collection_id: &str) -> Result<Vec<CardSnapshot>> {
        self.ledger.list_cards(user_id, collection_id)
    }

    pub fn history(&self, user_id: &str, collection_id: &str, card_name: &str) -> Result<Vec<ReviewEvent>> {
        self.ledger.history(user_id, collection_id, card_name)
    }
}
