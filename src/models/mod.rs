pub mod card;
pub mod card_snapshot;
pub mod grade;
pub mod review_event;
pub mod review_policy;
pub mod study_session;

pub use card::{CardKey, NewCard};
pub use card_snapshot::{CardSnapshot, DueCard};
pub use grade::Grade;
pub use review_event::ReviewEvent;
pub use review_policy::ReviewOutcome;
pub use study_session::StudySession;
