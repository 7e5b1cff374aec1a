//! Forward projection of review load over the coming days.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::{Problem, ProblemId, UserProgress};

use super::stats::minutes_ceil;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
  pub date: NaiveDate,
  pub problem_ids: Vec<ProblemId>,
  pub units: BTreeMap<String, usize>,
  pub topics: BTreeMap<String, usize>,
  pub estimated_minutes: u32,
}

impl DaySchedule {
  fn new(date: NaiveDate) -> Self {
    Self {
      date,
      problem_ids: Vec::new(),
      units: BTreeMap::new(),
      topics: BTreeMap::new(),
      estimated_minutes: 0,
    }
  }

  fn push(&mut self, problem: &Problem) {
    self.problem_ids.push(problem.id.clone());
    *self.units.entry(problem.unit.clone()).or_insert(0) += 1;
    *self.topics.entry(problem.topic.clone()).or_insert(0) += 1;
  }

  pub fn review_count(&self) -> usize {
    self.problem_ids.len()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
  pub total_reviews: usize,
  pub average_per_day: f64,
  pub peak_day: Option<NaiveDate>,
  pub lightest_day: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
  pub days: Vec<DaySchedule>,
  pub stats: DistributionStats,
}

pub fn distribute_reviews_from_today(catalog: &[Problem], days: usize) -> DistributionReport {
  distribute_reviews(catalog, days, Utc::now().date_naive())
}

/// Bucket the catalog's planned review dates into `days` daily schedules
/// starting at `start`.
///
/// Problems already past due land on the first day; problems beyond the
/// horizon or without a planned date are left out.
pub fn distribute_reviews(catalog: &[Problem], days: usize, start: NaiveDate) -> DistributionReport {
  let mut schedules: Vec<DaySchedule> = start.iter_days().take(days).map(DaySchedule::new).collect();
  let mut seconds = vec![0u64; schedules.len()];

  for problem in catalog {
    let Some(next_review) = problem.next_review_date else {
      continue;
    };
    let offset = (next_review.date_naive() - start).num_days().max(0) as usize;
    if let Some(day) = schedules.get_mut(offset) {
      day.push(problem);
      seconds[offset] += problem.estimated_time_seconds as u64;
    }
  }
  for (day, secs) in schedules.iter_mut().zip(seconds) {
    day.estimated_minutes = minutes_ceil(secs);
  }

  let stats = summarize(&schedules);
  DistributionReport {
    days: schedules,
    stats,
  }
}

fn summarize(days: &[DaySchedule]) -> DistributionStats {
  if days.is_empty() {
    return DistributionStats::default();
  }
  let total_reviews: usize = days.iter().map(DaySchedule::review_count).sum();

  // First day wins ties in both directions
  let mut peak = &days[0];
  let mut lightest = &days[0];
  for day in &days[1..] {
    if day.review_count() > peak.review_count() {
      peak = day;
    }
    if day.review_count() < lightest.review_count() {
      lightest = day;
    }
  }

  DistributionStats {
    total_reviews,
    average_per_day: total_reviews as f64 / days.len() as f64,
    peak_day: Some(peak.date),
    lightest_day: Some(lightest.date),
  }
}

/// Copy each problem's next review date from the learner's cards
pub fn attach_review_dates(catalog: &[Problem], progress: &UserProgress) -> Vec<Problem> {
  let dates: HashMap<&str, _> = progress
    .cards
    .iter()
    .map(|c| (c.problem_id.as_str(), c.next_review))
    .collect();

  catalog
    .iter()
    .map(|problem| Problem {
      next_review_date: dates.get(problem.id.as_str()).copied(),
      ..problem.clone()
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::srs::sm2::initialize_card_at;
  use chrono::{DateTime, Duration, TimeZone};

  fn noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
  }

  fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
  }

  fn planned(id: &str, unit: &str, topic: &str, secs: u32, day_offset: i64) -> Problem {
    Problem::new(id, unit, topic, false, secs).with_next_review(noon(start()) + Duration::days(day_offset))
  }

  #[test]
  fn test_buckets_by_date() {
    let catalog = vec![
      planned("a", "Limits", "Continuity", 60, 0),
      planned("b", "Limits", "Squeeze", 90, 0),
      planned("c", "Derivatives", "Chain rule", 30, 2),
      planned("d", "Derivatives", "Chain rule", 30, 2),
      planned("e", "Integrals", "Substitution", 120, 2),
    ];
    let report = distribute_reviews(&catalog, 3, start());

    assert_eq!(report.days.len(), 3);
    assert_eq!(report.days[0].date, start());
    assert_eq!(report.days[0].problem_ids, vec!["a", "b"]);
    assert_eq!(report.days[0].units.get("Limits"), Some(&2));
    assert_eq!(report.days[0].estimated_minutes, 3);
    assert!(report.days[1].problem_ids.is_empty());
    assert_eq!(report.days[2].topics.get("Chain rule"), Some(&2));
    assert_eq!(report.days[2].estimated_minutes, 3);

    assert_eq!(report.stats.total_reviews, 5);
    assert!((report.stats.average_per_day - 5.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.stats.peak_day, Some(start() + Duration::days(2)));
    assert_eq!(report.stats.lightest_day, Some(start() + Duration::days(1)));
  }

  #[test]
  fn test_overdue_lands_on_first_day_and_horizon_excluded() {
    let catalog = vec![
      planned("late", "U", "T", 60, -4),
      planned("far", "U", "T", 60, 30),
      Problem::new("undated", "U", "T", false, 60),
    ];
    let report = distribute_reviews(&catalog, 7, start());
    assert_eq!(report.days[0].problem_ids, vec!["late"]);
    assert_eq!(report.stats.total_reviews, 1);
  }

  #[test]
  fn test_zero_days() {
    let catalog = vec![planned("a", "U", "T", 60, 0)];
    let report = distribute_reviews(&catalog, 0, start());
    assert!(report.days.is_empty());
    assert_eq!(report.stats, DistributionStats::default());
  }

  #[test]
  fn test_peak_ties_go_to_first_day() {
    let catalog = vec![planned("a", "U", "T", 60, 0), planned("b", "U", "T", 60, 1)];
    let report = distribute_reviews(&catalog, 2, start());
    assert_eq!(report.stats.peak_day, Some(start()));
    assert_eq!(report.stats.lightest_day, Some(start()));
  }

  #[test]
  fn test_attach_review_dates() {
    let now = noon(start());
    let mut card = initialize_card_at("a", now);
    card.next_review = now + Duration::days(3);
    let progress = UserProgress::new(vec![card]);
    let catalog = vec![
      Problem::new("a", "U", "T", false, 60),
      Problem::new("b", "U", "T", false, 60),
    ];

    let dated = attach_review_dates(&catalog, &progress);
    assert_eq!(dated[0].next_review_date, Some(now + Duration::days(3)));
    assert!(dated[1].next_review_date.is_none());

    let report = distribute_reviews(&dated, 5, start());
    assert_eq!(report.days[3].problem_ids, vec!["a"]);
  }
}
