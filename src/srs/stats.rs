//! Summary statistics over a prioritized review list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::card_selector::PrioritizedReview;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
  pub total: usize,
  pub overdue: usize,
  pub weak: usize,
  pub by_unit: BTreeMap<String, usize>,
  pub by_topic: BTreeMap<String, usize>,
  pub estimated_minutes: u32,
  pub calculator_required: usize,
  pub non_calculator: usize,
  pub average_priority: f64,
}

/// Whole minutes needed for `seconds`, rounded up
pub(crate) fn minutes_ceil(seconds: u64) -> u32 {
  seconds.div_ceil(60) as u32
}

pub fn get_review_stats(reviews: &[PrioritizedReview]) -> ReviewStats {
  let mut stats = ReviewStats {
    total: reviews.len(),
    ..Default::default()
  };
  let mut seconds: u64 = 0;
  let mut priority_sum = 0.0;

  for review in reviews {
    if review.is_overdue() {
      stats.overdue += 1;
    }
    if review.is_weak() {
      stats.weak += 1;
    }
    if review.calculator_required {
      stats.calculator_required += 1;
    } else {
      stats.non_calculator += 1;
    }
    *stats.by_unit.entry(review.unit.clone()).or_insert(0) += 1;
    *stats.by_topic.entry(review.topic.clone()).or_insert(0) += 1;
    seconds += review.estimated_time_seconds as u64;
    priority_sum += review.priority;
  }

  stats.estimated_minutes = minutes_ceil(seconds);
  if !reviews.is_empty() {
    stats.average_priority = priority_sum / reviews.len() as f64;
  }
  stats
}
