use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::problem::ProblemId;
use super::review::Quality;

/// Per-problem SM-2 memory state for one learner.
///
/// Cards are only ever produced by `srs::initialize_card` and
/// `srs::calculate_next_review`, which keep the ease factor at or above the
/// floor, the interval at one day or more, and at most one streak counter
/// non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewCard {
  pub problem_id: ProblemId,
  pub ease_factor: f64,
  pub interval_days: i64,
  pub repetitions: i64,
  pub next_review: DateTime<Utc>,
  pub last_reviewed: Option<DateTime<Utc>>,
  /// Quality of the most recent review
  pub quality: Option<Quality>,
  pub consecutive_correct: u32,
  pub consecutive_incorrect: u32,
}

impl ReviewCard {
  pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
    self.next_review <= as_of
  }

  pub fn has_been_reviewed(&self) -> bool {
    self.last_reviewed.is_some()
  }
}

/// Snapshot of a learner's cards, handed in by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
  pub cards: Vec<ReviewCard>,
}

impl UserProgress {
  pub fn new(cards: Vec<ReviewCard>) -> Self {
    Self { cards }
  }

  pub fn card(&self, problem_id: &str) -> Option<&ReviewCard> {
    self.cards.iter().find(|c| c.problem_id == problem_id)
  }

  /// Share of reviewed cards whose last review passed, or None if nothing
  /// has been reviewed yet
  pub fn recent_accuracy(&self) -> Option<f64> {
    let rated: Vec<Quality> = self.cards.iter().filter_map(|c| c.quality).collect();
    if rated.is_empty() {
      return None;
    }
    let passed = rated.iter().filter(|q| q.is_passing()).count();
    Some(passed as f64 / rated.len() as f64)
  }
}
