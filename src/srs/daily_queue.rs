//! Daily practice queue construction.
//!
//! Turns the learner's due cards into a bounded, ordered list for today:
//! sized by the load balancer, ordered by priority, interleaved so topics
//! and units do not cluster, then nudged toward the configured calculator mix.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::SchedulerConfig;
use crate::domain::{Problem, ProblemId, UserProgress};

use super::card_selector::{get_review_queue_at, join_with_catalog, prioritize_reviews, PrioritizedReview};
use super::load::calculate_optimal_review_count;

/// Longest allowed same-topic and same-unit runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
  pub topic: usize,
  pub unit: usize,
}

impl From<&SchedulerConfig> for RunLimits {
  fn from(config: &SchedulerConfig) -> Self {
    Self {
      topic: config.max_consecutive_same_topic,
      unit: config.max_consecutive_same_unit,
    }
  }
}

pub fn build_daily_queue(
  catalog: &[Problem],
  progress: &UserProgress,
  target_size: usize,
  config: &SchedulerConfig,
) -> Vec<ProblemId> {
  build_daily_queue_at(catalog, progress, target_size, Utc::now(), config)
}

/// Ordered problem ids to practice today
pub fn build_daily_queue_at(
  catalog: &[Problem],
  progress: &UserProgress,
  target_size: usize,
  as_of: DateTime<Utc>,
  config: &SchedulerConfig,
) -> Vec<ProblemId> {
  build_daily_plan(catalog, progress, target_size, as_of, config)
    .into_iter()
    .map(|review| review.card.problem_id)
    .collect()
}

/// Same selection as [`build_daily_queue_at`], keeping the scored reviews
pub fn build_daily_plan(
  catalog: &[Problem],
  progress: &UserProgress,
  target_size: usize,
  as_of: DateTime<Utc>,
  config: &SchedulerConfig,
) -> Vec<PrioritizedReview> {
  let due = get_review_queue_at(&progress.cards, as_of);
  let candidates = join_with_catalog(&due, catalog);
  if candidates.is_empty() || target_size == 0 {
    tracing::debug!(due = due.len(), target_size, "no reviews to queue");
    return Vec::new();
  }

  let mut scored = prioritize_reviews(candidates, as_of, &config.priority);
  // A problem appears once even if the host passed duplicate cards
  let mut seen = HashSet::new();
  scored.retain(|review| seen.insert(review.card.problem_id.clone()));

  let balanced = calculate_optimal_review_count(progress, scored.len(), config);
  let size = target_size.min(balanced).min(scored.len());

  let limits = RunLimits::from(config);
  let mut order = select_interleaved(&scored, size, limits);
  balance_calculator_mix(
    &mut order,
    &scored,
    config.calculator_ratio,
    config.calculator_swap_tolerance,
    limits,
  );

  tracing::debug!(
    available = scored.len(),
    requested = target_size,
    balanced,
    selected = order.len(),
    violations = count_violations(&order, &scored, limits),
    "built daily queue"
  );

  let mut slots: Vec<Option<PrioritizedReview>> = scored.into_iter().map(Some).collect();
  order.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Length of the run at the end of `order` whose key equals `value`
fn trailing_run<'a>(
  order: &[usize],
  scored: &'a [PrioritizedReview],
  key: impl Fn(&'a PrioritizedReview) -> &'a str,
  value: &str,
) -> usize {
  order.iter().rev().take_while(|&&i| key(&scored[i]) == value).count()
}

fn fits(order: &[usize], scored: &[PrioritizedReview], candidate: usize, limits: RunLimits) -> bool {
  let next = &scored[candidate];
  trailing_run(order, scored, |r| r.topic.as_str(), &next.topic) < limits.topic
    && trailing_run(order, scored, |r| r.unit.as_str(), &next.unit) < limits.unit
}

/// Number of positions that extend a topic or unit run past its limit
fn count_violations(order: &[usize], scored: &[PrioritizedReview], limits: RunLimits) -> usize {
  let mut violations = 0;
  let mut topic_run = 0;
  let mut unit_run = 0;
  for (pos, &i) in order.iter().enumerate() {
    let current = &scored[i];
    let previous = pos.checked_sub(1).map(|p| &scored[order[p]]);

    topic_run = match previous {
      Some(prev) if prev.topic == current.topic => topic_run + 1,
      _ => 1,
    };
    unit_run = match previous {
      Some(prev) if prev.unit == current.unit => unit_run + 1,
      _ => 1,
    };

    if topic_run > limits.topic {
      violations += 1;
    }
    if unit_run > limits.unit {
      violations += 1;
    }
  }
  violations
}

/// Greedily pick `size` indices from priority-sorted `scored`.
///
/// Each step takes the highest-priority remaining item that keeps topic and
/// unit runs within limits. If none qualifies the highest-priority remaining
/// item is taken anyway, so the result always has `size` entries when enough
/// items exist.
pub fn select_interleaved(scored: &[PrioritizedReview], size: usize, limits: RunLimits) -> Vec<usize> {
  let size = size.min(scored.len());
  let mut taken = vec![false; scored.len()];
  let mut order = Vec::with_capacity(size);

  while order.len() < size {
    let compliant = (0..scored.len()).find(|&i| !taken[i] && fits(&order, scored, i, limits));
    let next = match compliant {
      Some(i) => i,
      None => {
        let Some(i) = (0..scored.len()).find(|&i| !taken[i]) else {
          break;
        };
        tracing::warn!(
          problem_id = %scored[i].card.problem_id,
          position = order.len(),
          "no candidate satisfies interleaving limits, relaxing"
        );
        i
      }
    };
    taken[next] = true;
    order.push(next);
  }

  order
}

/// Positions past the run limit within the maximal runs touching `pos`.
///
/// Replacing the item at `pos` can only change runs inside this span, so
/// comparing it before and after a swap gives the exact change in
/// [`count_violations`].
fn excess_near(
  order: &[usize],
  scored: &[PrioritizedReview],
  pos: usize,
  limit: usize,
  key: impl Fn(&PrioritizedReview) -> &str,
) -> usize {
  let same = |a: usize, b: usize| key(&scored[order[a]]) == key(&scored[order[b]]);

  let mut lo = pos;
  if pos > 0 {
    lo = pos - 1;
    while lo > 0 && same(lo - 1, lo) {
      lo -= 1;
    }
  }
  let mut hi = pos;
  if pos + 1 < order.len() {
    hi = pos + 1;
    while hi + 1 < order.len() && same(hi, hi + 1) {
      hi += 1;
    }
  }

  let mut excess = 0;
  let mut run = 0;
  for p in lo..=hi {
    run = if p > lo && same(p - 1, p) { run + 1 } else { 1 };
    if run > limit {
      excess += 1;
    }
  }
  excess
}

fn violations_near(order: &[usize], scored: &[PrioritizedReview], pos: usize, limits: RunLimits) -> usize {
  excess_near(order, scored, pos, limits.topic, |r| r.topic.as_str())
    + excess_near(order, scored, pos, limits.unit, |r| r.unit.as_str())
}

/// Substitute selected items to approach `ratio` calculator-required items.
///
/// The lowest-priority item of the over-represented kind is swapped for the
/// highest-priority unselected item of the other kind, provided that item's
/// priority is within `tolerance` of the one it replaces and the swap does
/// not add interleaving violations. The selection size never changes.
pub fn balance_calculator_mix(
  order: &mut [usize],
  scored: &[PrioritizedReview],
  ratio: f64,
  tolerance: f64,
  limits: RunLimits,
) {
  if order.is_empty() {
    return;
  }
  let desired = (ratio * order.len() as f64).round() as usize;
  let mut current = order.iter().filter(|&&i| scored[i].calculator_required).count();
  if current == desired {
    return;
  }
  // Every swap moves one step toward `desired`, so the surplus kind never flips
  let surplus_kind = current > desired;

  let selected: HashSet<usize> = order.iter().copied().collect();
  let mut replacements = Replacements::new(scored, |i| {
    !selected.contains(&i) && scored[i].calculator_required != surplus_kind
  });

  while current != desired {
    let mut positions: Vec<usize> = (0..order.len())
      .filter(|&pos| scored[order[pos]].calculator_required == surplus_kind)
      .collect();
    positions.sort_by(|&a, &b| order[b].cmp(&order[a]));

    if !try_swap(order, scored, &positions, &mut replacements, tolerance, limits) {
      tracing::debug!(current, desired, "calculator mix left unbalanced, no close substitute");
      break;
    }
    current = if surplus_kind { current - 1 } else { current + 1 };
  }
}

/// Unselected substitutes grouped by (topic, unit), best first within a group.
///
/// Candidates in one group are interchangeable for the interleaving check,
/// so only the head of each group ever needs trying.
struct Replacements<'a> {
  groups: HashMap<(&'a str, &'a str), VecDeque<usize>>,
}

impl<'a> Replacements<'a> {
  fn new(scored: &'a [PrioritizedReview], eligible: impl Fn(usize) -> bool) -> Self {
    let mut groups: HashMap<(&'a str, &'a str), VecDeque<usize>> = HashMap::new();
    // scored is priority-descending, so pushing in index order keeps groups sorted
    for i in (0..scored.len()).filter(|&i| eligible(i)) {
      let key = (scored[i].topic.as_str(), scored[i].unit.as_str());
      groups.entry(key).or_default().push_back(i);
    }
    Self { groups }
  }

  /// Group heads, highest priority first
  fn heads(&self) -> Vec<((&'a str, &'a str), usize)> {
    let mut heads: Vec<_> = self
      .groups
      .iter()
      .filter_map(|(key, queue)| queue.front().map(|&i| (*key, i)))
      .collect();
    heads.sort_by_key(|&(_, i)| i);
    heads
  }

  fn take(&mut self, key: (&'a str, &'a str)) {
    if let Some(queue) = self.groups.get_mut(&key) {
      queue.pop_front();
    }
  }
}

fn try_swap(
  order: &mut [usize],
  scored: &[PrioritizedReview],
  positions: &[usize],
  replacements: &mut Replacements<'_>,
  tolerance: f64,
  limits: RunLimits,
) -> bool {
  let heads = replacements.heads();
  for &pos in positions {
    let floor = scored[order[pos]].priority * (1.0 - tolerance);
    let before = violations_near(order, scored, pos, limits);

    for &(key, candidate) in &heads {
      if scored[candidate].priority < floor {
        break;
      }
      let previous = order[pos];
      order[pos] = candidate;
      if violations_near(order, scored, pos, limits) <= before {
        replacements.take(key);
        return true;
      }
      order[pos] = previous;
    }
  }
  false
}
