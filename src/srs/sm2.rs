use chrono::{DateTime, Duration, Utc};

use crate::domain::{AnswerOutcome, ProblemId, Quality, ReviewCard};

use super::quality::calculate_quality;

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const FIRST_INTERVAL_DAYS: i64 = 1;
pub const SECOND_INTERVAL_DAYS: i64 = 6;
/// Intervals stop growing at a century so review dates stay representable
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// Fresh card for a problem the learner has not reviewed yet
pub fn initialize_card(problem_id: impl Into<ProblemId>) -> ReviewCard {
  initialize_card_at(problem_id, Utc::now())
}

pub fn initialize_card_at(problem_id: impl Into<ProblemId>, now: DateTime<Utc>) -> ReviewCard {
  ReviewCard {
    problem_id: problem_id.into(),
    ease_factor: DEFAULT_EASE_FACTOR,
    interval_days: FIRST_INTERVAL_DAYS,
    repetitions: 0,
    next_review: now + Duration::days(FIRST_INTERVAL_DAYS),
    last_reviewed: None,
    quality: None,
    consecutive_correct: 0,
    consecutive_incorrect: 0,
  }
}

pub fn calculate_next_review(card: &ReviewCard, quality: Quality) -> ReviewCard {
  calculate_next_review_at(card, quality, Utc::now())
}

/// Apply one SM-2 review to `card` and return the resulting card.
///
/// Failed reviews (quality < 3) reset repetitions and the interval; passing
/// reviews step 1 day -> 6 days -> previous interval * new ease factor.
pub fn calculate_next_review_at(card: &ReviewCard, quality: Quality, now: DateTime<Utc>) -> ReviewCard {
  let q = quality.value() as f64;

  // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
  let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
  let ease_factor = (card.ease_factor + ease_delta).max(MIN_EASE_FACTOR);

  let (interval_days, repetitions) = if quality.is_passing() {
    let repetitions = card.repetitions + 1;
    let interval = match repetitions {
      1 => FIRST_INTERVAL_DAYS,
      2 => SECOND_INTERVAL_DAYS,
      _ => grown_interval(card.interval_days, ease_factor),
    };
    (interval.clamp(FIRST_INTERVAL_DAYS, MAX_INTERVAL_DAYS), repetitions)
  } else {
    (FIRST_INTERVAL_DAYS, 0)
  };

  let (consecutive_correct, consecutive_incorrect) = if quality.is_passing() {
    (card.consecutive_correct + 1, 0)
  } else {
    (0, card.consecutive_incorrect + 1)
  };

  tracing::trace!(
    problem_id = %card.problem_id,
    quality = quality.value(),
    ease_factor,
    interval_days,
    "applied SM-2 review"
  );

  ReviewCard {
    problem_id: card.problem_id.clone(),
    ease_factor,
    interval_days,
    repetitions,
    next_review: now + Duration::days(interval_days),
    last_reviewed: Some(now),
    quality: Some(quality),
    consecutive_correct,
    consecutive_incorrect,
  }
}

/// round(interval * ease), saturated to the interval cap before the cast
fn grown_interval(interval_days: i64, ease_factor: f64) -> i64 {
  let grown = (interval_days as f64 * ease_factor).round();
  if grown.is_nan() {
    return MAX_INTERVAL_DAYS;
  }
  grown.clamp(FIRST_INTERVAL_DAYS as f64, MAX_INTERVAL_DAYS as f64) as i64
}

/// Rate a raw answer and schedule the card in one step
pub fn record_review(
  card: &ReviewCard,
  outcome: &AnswerOutcome,
  expected_time_seconds: f64,
  now: DateTime<Utc>,
) -> ReviewCard {
  let quality = calculate_quality(
    outcome.correct,
    outcome.time_spent_seconds,
    expected_time_seconds,
    outcome.hints_used,
  );
  calculate_next_review_at(card, quality, now)
}
