//! Reviewer's self-assessed recall quality for one review.
//!
//! Grades run from 1 (Very Hard) to 5 (Very Easy). 3 is the boundary: a grade of
//! 3 or more counts as a successful recall.

use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Grade {
    VeryHard = 1,
    Hard = 2,
    Ok = 3,
    Easy = 4,
    VeryEasy = 5,
}

impl Grade {
    pub const ALL: [Grade; 5] = [
        Grade::VeryEasy,
        Grade::Easy,
        Grade::Ok,
        Grade::Hard,
        Grade::VeryHard,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self >= Grade::Ok
    }

    /// Multiplier applied to the ease factor after a review with this grade.
    pub fn ease_delta(self) -> f64 {
        match self {
            Grade::VeryEasy => 1.15,
            Grade::Easy => 1.10,
            Grade::Ok => 1.0,
            Grade::Hard => 0.9,
            Grade::VeryHard => 0.8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::VeryEasy => "Very Easy",
            Grade::Easy => "Easy",
            Grade::Ok => "OK",
            Grade::Hard => "Hard",
            Grade::VeryHard => "Very Hard",
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Grade::VeryHard),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Ok),
            4 => Ok(Grade::Easy),
            5 => Ok(Grade::VeryEasy),
            other => Err(SchedulerError::InvalidArgument(format!(
                "grade must be between 1 and 5, got {}",
                other
            ))),
        }
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> u8 {
        grade.value()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.label())
    }
}
