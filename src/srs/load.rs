//! Daily review count sizing.

use crate::config::SchedulerConfig;
use crate::domain::UserProgress;

/// Below this recent accuracy the count is never raised above target
pub const STRUGGLING_ACCURACY: f64 = 0.6;

/// How many reviews to schedule today for a backlog of `backlog` due items.
///
/// Step function of the backlog relative to the target `t`:
/// - under t/2: 3t/4 (learner is ahead)
/// - up to 2t: t
/// - up to 4t: 3t/2
/// - beyond: 2t
///
/// Steps above `t` are held at `t` while the learner is failing most
/// reviews. The result is always clamped to the configured min/max.
pub fn calculate_optimal_review_count(
  progress: &UserProgress,
  backlog: usize,
  config: &SchedulerConfig,
) -> usize {
  let target = config.target_daily_reviews;

  let stepped = if backlog * 2 < target {
    target * 3 / 4
  } else if backlog <= target * 2 {
    target
  } else if backlog <= target * 4 {
    target * 3 / 2
  } else {
    target * 2
  };

  let struggling = progress
    .recent_accuracy()
    .is_some_and(|accuracy| accuracy < STRUGGLING_ACCURACY);
  let count = if struggling { stepped.min(target) } else { stepped };

  let count = count.clamp(config.min_daily_reviews, config.max_daily_reviews);
  tracing::debug!(backlog, target, struggling, count, "sized daily review count");
  count
}
