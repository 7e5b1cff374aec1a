pub mod card_selector;
pub mod daily_queue;
pub mod distribution;
pub mod load;
pub mod quality;
pub mod sm2;
pub mod stats;

pub use card_selector::{get_review_queue, get_review_queue_at, join_with_catalog, prioritize_reviews, PrioritizedReview};
pub use daily_queue::{build_daily_plan, build_daily_queue, build_daily_queue_at};
pub use distribution::{
  attach_review_dates, distribute_reviews, distribute_reviews_from_today, DaySchedule, DistributionReport,
  DistributionStats,
};
pub use load::calculate_optimal_review_count;
pub use quality::{calculate_quality, DEFAULT_EXPECTED_TIME_SECONDS, UNTIMED_CORRECT_QUALITY};
pub use sm2::{
  calculate_next_review, calculate_next_review_at, initialize_card, initialize_card_at, record_review,
  MAX_INTERVAL_DAYS, MIN_EASE_FACTOR,
};
pub use stats::{get_review_stats, ReviewStats};
