pub mod card;
pub mod problem;
pub mod review;

pub use card::{ReviewCard, UserProgress};
pub use problem::{Problem, ProblemId};
pub use review::{AnswerOutcome, Quality, PASS_THRESHOLD};
