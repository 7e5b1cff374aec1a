//! Maps a raw answer outcome to an SM-2 quality rating.

use crate::domain::Quality;

/// Expected solve time when the catalog has no estimate
pub const DEFAULT_EXPECTED_TIME_SECONDS: f64 = 60.0;

/// Rating for a correct answer whose time was not measured
pub const UNTIMED_CORRECT_QUALITY: Quality = Quality::HESITATION;

/// Rate an answer on the 0-5 scale.
///
/// Misses are rated by how much help was needed (no hints: 2, one hint: 1,
/// more: 0). Correct answers are rated by time taken relative to the
/// expected time: over 1.5x is 3, over 1.0x is 4, otherwise 5. A negative or
/// non-finite time carries no timing signal and rates as 4.
pub fn calculate_quality(
  correct: bool,
  time_spent_seconds: f64,
  expected_time_seconds: f64,
  hints_used: u32,
) -> Quality {
  if !correct {
    return match hints_used {
      0 => Quality::PARTIAL_RECALL,
      1 => Quality::HEAVY_ASSISTANCE,
      _ => Quality::BLACKOUT,
    };
  }

  if !time_spent_seconds.is_finite() || time_spent_seconds < 0.0 {
    return UNTIMED_CORRECT_QUALITY;
  }

  let expected = if expected_time_seconds.is_finite() && expected_time_seconds > 0.0 {
    expected_time_seconds
  } else {
    DEFAULT_EXPECTED_TIME_SECONDS
  };
  let ratio = time_spent_seconds / expected;

  if ratio > 1.5 {
    Quality::SERIOUS_DIFFICULTY
  } else if ratio > 1.0 {
    Quality::HESITATION
  } else {
    Quality::FLUENT
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_incorrect_by_hints() {
    assert_eq!(calculate_quality(false, 30.0, 60.0, 0), Quality::PARTIAL_RECALL);
    assert_eq!(calculate_quality(false, 30.0, 60.0, 1), Quality::HEAVY_ASSISTANCE);
    assert_eq!(calculate_quality(false, 30.0, 60.0, 2), Quality::BLACKOUT);
    assert_eq!(calculate_quality(false, 30.0, 60.0, 9), Quality::BLACKOUT);
  }

  #[test]
  fn test_incorrect_ignores_time() {
    assert_eq!(calculate_quality(false, 1.0, 60.0, 0), Quality::PARTIAL_RECALL);
    assert_eq!(calculate_quality(false, 900.0, 60.0, 0), Quality::PARTIAL_RECALL);
  }

  #[test]
  fn test_correct_fast_is_fluent() {
    assert_eq!(calculate_quality(true, 20.0, 60.0, 0), Quality::FLUENT);
    // Exactly on time still counts as fluent
    assert_eq!(calculate_quality(true, 60.0, 60.0, 0), Quality::FLUENT);
  }

  #[test]
  fn test_correct_hesitation_band() {
    assert_eq!(calculate_quality(true, 61.0, 60.0, 0), Quality::HESITATION);
    // Upper edge of the band is inclusive
    assert_eq!(calculate_quality(true, 90.0, 60.0, 0), Quality::HESITATION);
  }

  #[test]
  fn test_correct_slow_is_difficult() {
    assert_eq!(calculate_quality(true, 91.0, 60.0, 0), Quality::SERIOUS_DIFFICULTY);
    assert_eq!(calculate_quality(true, 600.0, 60.0, 0), Quality::SERIOUS_DIFFICULTY);
  }

  #[test]
  fn test_correct_hints_do_not_change_time_rating() {
    assert_eq!(calculate_quality(true, 20.0, 60.0, 3), Quality::FLUENT);
  }

  #[test]
  fn test_non_positive_expected_time_falls_back() {
    assert_eq!(calculate_quality(true, 50.0, 0.0, 0), Quality::FLUENT);
    assert_eq!(calculate_quality(true, 80.0, -5.0, 0), Quality::HESITATION);
    assert_eq!(calculate_quality(true, 100.0, f64::NAN, 0), Quality::SERIOUS_DIFFICULTY);
    assert_eq!(calculate_quality(true, 100.0, f64::INFINITY, 0), Quality::SERIOUS_DIFFICULTY);
  }

  #[test]
  fn test_unusable_time_has_no_timing_signal() {
    assert_eq!(calculate_quality(true, f64::NAN, 60.0, 0), UNTIMED_CORRECT_QUALITY);
    assert_eq!(calculate_quality(true, -10.0, 60.0, 0), UNTIMED_CORRECT_QUALITY);
    assert_eq!(calculate_quality(true, f64::INFINITY, 60.0, 0), UNTIMED_CORRECT_QUALITY);
    // Misses are still rated by hints alone
    assert_eq!(calculate_quality(false, f64::NAN, 60.0, 1), Quality::HEAVY_ASSISTANCE);
  }
}
