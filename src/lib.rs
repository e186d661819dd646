//! Spaced-repetition review scheduler.
//!
//! Cards are registered into an append-only review log, listed when due, and
//! rescheduled from the grade given at each review.

pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use database::{CardLedger, DueSetSelector};
pub use error::{Result, SchedulerError};
pub use models::{CardKey, CardSnapshot, DueCard, Grade, NewCard, ReviewEvent, StudySession};
pub use scheduler::Scheduler;
