use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use practice_scheduler::domain::{AnswerOutcome, Problem, ReviewCard, UserProgress};
use practice_scheduler::{srs, ConfigError, SchedulerConfig};

#[derive(Parser)]
#[command(name = "practice-scheduler", version, about = "Plan spaced-repetition practice from a JSON snapshot")]
struct Cli {
  /// Scheduler config TOML (defaults to $SCHEDULER_CONFIG, then config.toml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print today's ordered practice queue
  Queue {
    snapshot: PathBuf,
    /// Requested queue size (defaults to the configured daily target)
    #[arg(long)]
    size: Option<usize>,
  },
  /// Project scheduled reviews over the coming days
  Plan {
    snapshot: PathBuf,
    #[arg(long, default_value_t = 7)]
    days: usize,
  },
  /// Summarize everything currently due
  Stats { snapshot: PathBuf },
  /// Apply one answer to a problem's card and print the updated card
  Review {
    snapshot: PathBuf,
    problem_id: String,
    #[arg(long)]
    correct: bool,
    /// Seconds spent answering
    #[arg(long)]
    time: f64,
    #[arg(long, default_value_t = 0)]
    hints: u32,
  },
}

/// Host-side data: the problem catalog and one learner's cards
#[derive(Debug, Deserialize)]
struct Snapshot {
  catalog: Vec<Problem>,
  #[serde(default)]
  cards: Vec<ReviewCard>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid snapshot: {0}")]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("problem {0} is not in the catalog")]
  UnknownProblem(String),
}

fn load_snapshot(path: &Path) -> Result<Snapshot, CliError> {
  let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(serde_json::from_str(&contents)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
  let config = match &cli.config {
    Some(path) => SchedulerConfig::load_from_path(path)?,
    None => SchedulerConfig::load()?,
  };
  let now = Utc::now();

  match cli.command {
    Command::Queue { snapshot, size } => {
      let snapshot = load_snapshot(&snapshot)?;
      let progress = UserProgress::new(snapshot.cards);
      let size = size.unwrap_or(config.target_daily_reviews);
      let queue = srs::build_daily_queue_at(&snapshot.catalog, &progress, size, now, &config);
      tracing::info!("Queued {} reviews", queue.len());
      print_json(&queue)
    }
    Command::Plan { snapshot, days } => {
      let snapshot = load_snapshot(&snapshot)?;
      let progress = UserProgress::new(snapshot.cards);
      let catalog = srs::attach_review_dates(&snapshot.catalog, &progress);
      print_json(&srs::distribute_reviews(&catalog, days, now.date_naive()))
    }
    Command::Stats { snapshot } => {
      let snapshot = load_snapshot(&snapshot)?;
      let due = srs::get_review_queue_at(&snapshot.cards, now);
      let reviews = srs::join_with_catalog(&due, &snapshot.catalog);
      let scored = srs::prioritize_reviews(reviews, now, &config.priority);
      print_json(&srs::get_review_stats(&scored))
    }
    Command::Review {
      snapshot,
      problem_id,
      correct,
      time,
      hints,
    } => {
      let snapshot = load_snapshot(&snapshot)?;
      let problem = snapshot
        .catalog
        .iter()
        .find(|p| p.id == problem_id)
        .ok_or_else(|| CliError::UnknownProblem(problem_id.clone()))?;
      let card = snapshot
        .cards
        .iter()
        .find(|c| c.problem_id == problem_id)
        .cloned()
        .unwrap_or_else(|| srs::initialize_card_at(problem_id.clone(), now));

      let outcome = AnswerOutcome::new(correct, time, hints);
      let updated = srs::record_review(&card, &outcome, problem.estimated_time_seconds as f64, now);
      tracing::info!(
        "Rated {} as {}; next review in {} days",
        problem_id,
        updated.quality.map_or(0, |q| q.value()),
        updated.interval_days
      );
      print_json(&updated)
    }
  }
}

fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "practice_scheduler=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  match run(Cli::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{}", e);
      ExitCode::FAILURE
    }
  }
}
