//! Review policy: turns a grade into the card's next scheduling state.
//!
//! A simplified SM-2 variant:
//! - Grades 3-5 count as a successful recall. Repetitions increase by one and the
//!   interval goes 1 day, then 2 days, then `interval * ease_factor`
//! - Grades 1-2 reset repetitions to 0 and the interval to 1 day
//! - The ease factor is multiplied by a per-grade delta after every review and
//!   never drops below 1.3
//! - The interval never exceeds `MAX_INTERVAL` days
//! - The next due date is `now + interval` days, with no rounding to midnight

use super::Grade;
use crate::error::{Result, SchedulerError};
use chrono::{DateTime, Duration, Utc};

/// Ease factor floor.
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Ease factor assigned to a newly registered card.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;
/// Interval, in days, assigned to a newly registered card.
pub const INITIAL_INTERVAL: f64 = 1.0;
/// Longest interval, in days, a card can be scheduled out (100 years).
pub const MAX_INTERVAL: f64 = 36_500.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Scheduling state produced by one review.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewOutcome {
    pub interval: f64,
    pub ease_factor: f64,
    pub reps: u32,
    pub next_due_at: DateTime<Utc>,
}

/// Computes the next scheduling state.
///
/// `interval` must be at least 1 and `ease_factor` at least 1.3; anything else
/// is rejected as an invalid argument.
pub fn next_state(
    grade: Grade,
    interval: f64,
    ease_factor: f64,
    reps: u32,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome> {
    if !interval.is_finite() || interval < 1.0 {
        return Err(SchedulerError::InvalidArgument(format!(
            "interval must be at least 1 day, got {}",
            interval
        )));
    }
    if !ease_factor.is_finite() || ease_factor < MIN_EASE_FACTOR {
        return Err(SchedulerError::InvalidArgument(format!(
            "ease factor must be at least {}, got {}",
            MIN_EASE_FACTOR, ease_factor
        )));
    }

    let (new_interval, new_reps) = if grade.is_success() {
        let new_reps = reps + 1;
        let new_interval = match new_reps {
            1 => 1.0,
            2 => 2.0,
            _ => (interval * ease_factor).min(MAX_INTERVAL),
        };
        (new_interval, new_reps)
    } else {
        (1.0, 0)
    };

    // Stays finite however many easy grades pile up.
    let new_ease_factor = (ease_factor * grade.ease_delta()).clamp(MIN_EASE_FACTOR, f64::MAX);

    Ok(ReviewOutcome {
        interval: new_interval,
        ease_factor: new_ease_factor,
        reps: new_reps,
        next_due_at: due_after(now, new_interval),
    })
}

/// `now` plus a possibly fractional number of days, at millisecond precision.
///
/// Saturates at the latest representable instant.
pub fn due_after(now: DateTime<Utc>, interval_days: f64) -> DateTime<Utc> {
    Duration::try_milliseconds((interval_days * MILLIS_PER_DAY).round() as i64)
        .and_then(|offset| now.checked_add_signed(offset))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
