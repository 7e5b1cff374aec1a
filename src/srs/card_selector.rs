//! Due-set selection and priority scoring.
//!
//! Priority favours, in order of weight:
//! - Cards that are furthest past their review date
//! - Cards with a run of recent misses
//! - Cards without an established correct streak
//! - Cards whose ease factor has sunk low

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::PriorityWeights;
use crate::domain::{Problem, ReviewCard};

/// Ease factor below which a card counts as weak
pub const LOW_EASE_THRESHOLD: f64 = 2.0;

/// Correct streaks shorter than this (but non-zero) are still shaky
pub const SHAKY_STREAK: u32 = 3;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A due card joined with its catalog metadata and scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizedReview {
  pub card: ReviewCard,
  pub unit: String,
  pub topic: String,
  pub calculator_required: bool,
  pub estimated_time_seconds: u32,
  pub priority: f64,
  /// Fractional days past `next_review` at scoring time
  pub days_overdue: f64,
  pub weakness: f64,
  pub reasons: Vec<String>,
}

impl PrioritizedReview {
  /// Unscored join of a card with its problem
  pub fn new(card: ReviewCard, problem: &Problem) -> Self {
    Self {
      card,
      unit: problem.unit.clone(),
      topic: problem.topic.clone(),
      calculator_required: problem.calculator_required,
      estimated_time_seconds: problem.estimated_time_seconds,
      priority: 0.0,
      days_overdue: 0.0,
      weakness: 0.0,
      reasons: Vec::new(),
    }
  }

  pub fn problem_id(&self) -> &str {
    &self.card.problem_id
  }

  pub fn whole_days_overdue(&self) -> i64 {
    self.days_overdue.floor() as i64
  }

  /// At least one whole day late
  pub fn is_overdue(&self) -> bool {
    self.whole_days_overdue() >= 1
  }

  pub fn is_weak(&self) -> bool {
    self.card.consecutive_incorrect > 0 || self.card.ease_factor < LOW_EASE_THRESHOLD
  }
}

pub fn get_review_queue(cards: &[ReviewCard]) -> Vec<ReviewCard> {
  get_review_queue_at(cards, Utc::now())
}

/// Cards due at `as_of`, most overdue first
pub fn get_review_queue_at(cards: &[ReviewCard], as_of: DateTime<Utc>) -> Vec<ReviewCard> {
  let mut due: Vec<ReviewCard> = cards.iter().filter(|c| c.is_due(as_of)).cloned().collect();
  due.sort_by(|a, b| a.next_review.cmp(&b.next_review));
  due
}

/// Join due cards with the catalog, dropping cards for unknown problems
pub fn join_with_catalog(due: &[ReviewCard], catalog: &[Problem]) -> Vec<PrioritizedReview> {
  let by_id: HashMap<&str, &Problem> = catalog.iter().map(|p| (p.id.as_str(), p)).collect();
  due
    .iter()
    .filter_map(|card| {
      by_id
        .get(card.problem_id.as_str())
        .map(|problem| PrioritizedReview::new(card.clone(), problem))
    })
    .collect()
}

/// Weakness score of a card and the reasons behind it
pub fn weakness_score(card: &ReviewCard, weights: &PriorityWeights) -> (f64, Vec<String>) {
  let mut score = 0.0;
  let mut reasons = Vec::new();

  if card.consecutive_incorrect > 0 {
    score += card.consecutive_incorrect as f64 * weights.per_consecutive_miss;
    reasons.push(match card.consecutive_incorrect {
      1 => "missed last attempt".to_string(),
      n => format!("struggling: {} consecutive misses", n),
    });
  }

  match card.consecutive_correct {
    0 => {
      score += weights.unestablished;
      if card.consecutive_incorrect == 0 {
        reasons.push("not yet established".to_string());
      }
    }
    n if n < SHAKY_STREAK => {
      score += weights.shaky;
      reasons.push(format!("still shaky: {} correct in a row", n));
    }
    _ => {}
  }

  if card.ease_factor < LOW_EASE_THRESHOLD {
    score += weights.low_ease;
    reasons.push(format!("low ease factor ({:.2})", card.ease_factor));
  }

  (score, reasons)
}

fn overdue_reason(whole_days: i64) -> String {
  match whole_days {
    i64::MIN..=0 => "due today".to_string(),
    1 => "1 day overdue".to_string(),
    n => format!("{} days overdue", n),
  }
}

/// Score every review and sort by descending priority.
///
/// Ties go to the weaker card, then the earlier review date, then the
/// problem id so the order is fully deterministic.
pub fn prioritize_reviews(
  reviews: Vec<PrioritizedReview>,
  as_of: DateTime<Utc>,
  weights: &PriorityWeights,
) -> Vec<PrioritizedReview> {
  let mut scored: Vec<PrioritizedReview> = reviews
    .into_iter()
    .map(|mut review| {
      let late_seconds = (as_of - review.card.next_review).num_seconds().max(0);
      review.days_overdue = late_seconds as f64 / SECONDS_PER_DAY;

      let (weakness, weak_reasons) = weakness_score(&review.card, weights);
      review.weakness = weakness;
      review.priority = weights.base + review.days_overdue * weights.per_overdue_day + weakness;

      review.reasons = Vec::with_capacity(weak_reasons.len() + 1);
      review.reasons.push(overdue_reason(review.whole_days_overdue()));
      review.reasons.extend(weak_reasons);
      review
    })
    .collect();

  scored.sort_by(compare_priority);
  scored
}

fn compare_priority(a: &PrioritizedReview, b: &PrioritizedReview) -> Ordering {
  b.priority
    .total_cmp(&a.priority)
    .then_with(|| b.weakness.total_cmp(&a.weakness))
    .then_with(|| a.card.next_review.cmp(&b.card.next_review))
    .then_with(|| a.card.problem_id.cmp(&b.card.problem_id))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::srs::sm2::initialize_card_at;
  use chrono::Duration;

  fn card_due(id: &str, now: DateTime<Utc>, offset: Duration) -> ReviewCard {
    ReviewCard {
      next_review: now + offset,
      ..initialize_card_at(id, now)
    }
  }

  fn review(card: ReviewCard) -> PrioritizedReview {
    let problem = Problem::new(card.problem_id.clone(), "Unit", "Topic", false, 60);
    PrioritizedReview::new(card, &problem)
  }

  // Due-set tests

  #[test]
  fn test_review_queue_selects_and_orders() {
    let now = Utc::now();
    let cards = vec![
      card_due("tomorrow", now, Duration::days(1)),
      card_due("now", now, Duration::zero()),
      card_due("two_ago", now, Duration::days(-2)),
      card_due("one_ago", now, Duration::days(-1)),
    ];

    let due = get_review_queue_at(&cards, now);
    let ids: Vec<&str> = due.iter().map(|c| c.problem_id.as_str()).collect();
    assert_eq!(ids, vec!["two_ago", "one_ago", "now"]);
  }

  #[test]
  fn test_review_queue_idempotent() {
    let now = Utc::now();
    let cards = vec![
      card_due("a", now, Duration::hours(-5)),
      card_due("b", now, Duration::hours(-30)),
      card_due("c", now, Duration::hours(3)),
    ];
    assert_eq!(get_review_queue_at(&cards, now), get_review_queue_at(&cards, now));
  }

  #[test]
  fn test_review_queue_empty_cases() {
    let now = Utc::now();
    assert!(get_review_queue_at(&[], now).is_empty());

    let cards = vec![card_due("a", now, Duration::hours(1)), card_due("b", now, Duration::days(3))];
    assert!(get_review_queue_at(&cards, now).is_empty());
  }

  #[test]
  fn test_join_drops_unknown_problems() {
    let now = Utc::now();
    let due = vec![card_due("known", now, Duration::zero()), card_due("gone", now, Duration::zero())];
    let catalog = vec![Problem::new("known", "Integrals", "By parts", true, 150)];

    let joined = join_with_catalog(&due, &catalog);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].problem_id(), "known");
    assert_eq!(joined[0].unit, "Integrals");
    assert!(joined[0].calculator_required);
    assert_eq!(joined[0].estimated_time_seconds, 150);
  }

  // Priority tests

  #[test]
  fn test_priority_always_positive() {
    let now = Utc::now();
    let weights = PriorityWeights {
      per_overdue_day: 0.0,
      per_consecutive_miss: 0.0,
      unestablished: 0.0,
      shaky: 0.0,
      low_ease: 0.0,
      ..Default::default()
    };
    let scored = prioritize_reviews(vec![review(card_due("a", now, Duration::zero()))], now, &weights);
    assert!(scored[0].priority > 0.0);
  }

  #[test]
  fn test_more_overdue_ranks_higher() {
    let now = Utc::now();
    let scored = prioritize_reviews(
      vec![
        review(card_due("recent", now, Duration::days(-1))),
        review(card_due("old", now, Duration::days(-4))),
      ],
      now,
      &PriorityWeights::default(),
    );
    assert_eq!(scored[0].problem_id(), "old");
    assert_eq!(scored[0].whole_days_overdue(), 4);
    assert!(scored[0].reasons.contains(&"4 days overdue".to_string()));
  }

  #[test]
  fn test_weaker_ranks_higher_when_equally_overdue() {
    let now = Utc::now();
    let mut strong = card_due("strong", now, Duration::days(-2));
    strong.consecutive_correct = 5;
    let mut weak = card_due("weak", now, Duration::days(-2));
    weak.consecutive_incorrect = 2;

    let scored = prioritize_reviews(vec![review(strong), review(weak)], now, &PriorityWeights::default());
    assert_eq!(scored[0].problem_id(), "weak");
    assert!(scored[0].reasons.contains(&"struggling: 2 consecutive misses".to_string()));
  }

  #[test]
  fn test_tie_broken_by_weakness() {
    let now = Utc::now();
    let weights = PriorityWeights {
      unestablished: 0.0,
      shaky: 0.0,
      low_ease: 0.0,
      ..Default::default()
    };
    // One day late and solid vs. due now with two misses: both score 11
    let mut late = card_due("late", now, Duration::days(-1));
    late.consecutive_correct = 5;
    let mut weak = card_due("weak", now, Duration::zero());
    weak.consecutive_incorrect = 2;

    let scored = prioritize_reviews(vec![review(late), review(weak)], now, &weights);
    assert!((scored[0].priority - scored[1].priority).abs() < 1e-9);
    assert_eq!(scored[0].problem_id(), "weak");
  }

  #[test]
  fn test_reasons_for_fresh_card() {
    let now = Utc::now();
    let scored = prioritize_reviews(
      vec![review(card_due("a", now, Duration::hours(-2)))],
      now,
      &PriorityWeights::default(),
    );
    assert_eq!(scored[0].reasons, vec!["due today".to_string(), "not yet established".to_string()]);
    assert!(!scored[0].is_overdue());
  }

  #[test]
  fn test_weakness_score_components() {
    let weights = PriorityWeights::default();
    let mut card = initialize_card_at("a", Utc::now());

    card.consecutive_correct = 2;
    let (shaky, reasons) = weakness_score(&card, &weights);
    assert!((shaky - weights.shaky).abs() < f64::EPSILON);
    assert_eq!(reasons, vec!["still shaky: 2 correct in a row".to_string()]);

    card.consecutive_correct = 6;
    let (solid, reasons) = weakness_score(&card, &weights);
    assert_eq!(solid, 0.0);
    assert!(reasons.is_empty());

    card.consecutive_correct = 0;
    card.consecutive_incorrect = 1;
    card.ease_factor = 1.6;
    let (weak, reasons) = weakness_score(&card, &weights);
    let expected = weights.per_consecutive_miss + weights.unestablished + weights.low_ease;
    assert!((weak - expected).abs() < 1e-9);
    assert_eq!(reasons, vec!["missed last attempt".to_string(), "low ease factor (1.60)".to_string()]);
  }

  #[test]
  fn test_prioritize_does_not_touch_cards() {
    let now = Utc::now();
    let card = card_due("a", now, Duration::days(-3));
    let scored = prioritize_reviews(vec![review(card.clone())], now, &PriorityWeights::default());
    assert_eq!(scored[0].card, card);
  }
}
