use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque problem identifier owned by the host catalog
pub type ProblemId = String;

/// Static catalog metadata for one practice problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
  pub id: ProblemId,
  pub unit: String,
  pub topic: String,
  pub calculator_required: bool,
  pub estimated_time_seconds: u32,
  /// Planning-only copy of the learner's next review date (see `attach_review_dates`)
  #[serde(default)]
  pub next_review_date: Option<DateTime<Utc>>,
}

impl Problem {
  pub fn new(
    id: impl Into<ProblemId>,
    unit: impl Into<String>,
    topic: impl Into<String>,
    calculator_required: bool,
    estimated_time_seconds: u32,
  ) -> Self {
    Self {
      id: id.into(),
      unit: unit.into(),
      topic: topic.into(),
      calculator_required,
      estimated_time_seconds,
      next_review_date: None,
    }
  }

  pub fn with_next_review(mut self, date: DateTime<Utc>) -> Self {
    self.next_review_date = Some(date);
    self
  }
}
