//! Scheduler configuration.
//!
//! All tunable numbers the engine reads live in [`SchedulerConfig`]. The
//! engine never reads files or the environment itself; [`SchedulerConfig::load`]
//! is a convenience for hosts that want the usual config.toml / .env lookup.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

// ==================== Defaults ====================

/// Nominal number of reviews per day
pub const DEFAULT_TARGET_DAILY_REVIEWS: usize = 20;

/// Never schedule fewer than this many reviews when enough are due
pub const DEFAULT_MIN_DAILY_REVIEWS: usize = 5;

/// Hard ceiling on reviews per day, regardless of backlog
pub const DEFAULT_MAX_DAILY_REVIEWS: usize = 50;

/// Longest allowed run of same-topic items in a daily queue
pub const DEFAULT_MAX_CONSECUTIVE_SAME_TOPIC: usize = 2;

/// Longest allowed run of same-unit items in a daily queue
pub const DEFAULT_MAX_CONSECUTIVE_SAME_UNIT: usize = 3;

/// Target share of calculator-required problems (40/60 split)
pub const DEFAULT_CALCULATOR_RATIO: f64 = 0.4;

/// A calculator-mix substitution may replace an item with one whose priority
/// is at most this fraction lower
pub const DEFAULT_CALCULATOR_SWAP_TOLERANCE: f64 = 0.5;

/// Environment variable naming a scheduler TOML file
pub const CONFIG_PATH_ENV: &str = "SCHEDULER_CONFIG";

/// Shared application config file, read for its `[scheduler]` table
pub const APP_CONFIG_FILE: &str = "config.toml";

// ==================== Priority Weights ====================

/// Weights of the priority score.
///
/// priority = base + days_overdue * per_overdue_day + weakness, where
/// weakness = misses * per_consecutive_miss
///          + unestablished (no correct streak) or shaky (1-2 correct)
///          + low_ease (ease factor under 2.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub base: f64,
    pub per_overdue_day: f64,
    pub per_consecutive_miss: f64,
    pub unestablished: f64,
    pub shaky: f64,
    pub low_ease: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            per_overdue_day: 10.0,
            per_consecutive_miss: 5.0,
            unestablished: 3.0,
            shaky: 1.0,
            low_ease: 2.0,
        }
    }
}

impl PriorityWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.base.is_finite() || self.base <= 0.0 {
            return Err(ConfigError::NonPositiveBase(self.base));
        }
        let weights = [
            ("per_overdue_day", self.per_overdue_day),
            ("per_consecutive_miss", self.per_consecutive_miss),
            ("unestablished", self.unestablished),
            ("shaky", self.shaky),
            ("low_ease", self.low_ease),
        ];
        for (field, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { field, value });
            }
        }
        Ok(())
    }
}

// ==================== Scheduler Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub target_daily_reviews: usize,
    pub min_daily_reviews: usize,
    pub max_daily_reviews: usize,
    pub max_consecutive_same_topic: usize,
    pub max_consecutive_same_unit: usize,
    /// Desired fraction of calculator-required problems, 0.0-1.0
    pub calculator_ratio: f64,
    pub calculator_swap_tolerance: f64,
    pub priority: PriorityWeights,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_daily_reviews: DEFAULT_TARGET_DAILY_REVIEWS,
            min_daily_reviews: DEFAULT_MIN_DAILY_REVIEWS,
            max_daily_reviews: DEFAULT_MAX_DAILY_REVIEWS,
            max_consecutive_same_topic: DEFAULT_MAX_CONSECUTIVE_SAME_TOPIC,
            max_consecutive_same_unit: DEFAULT_MAX_CONSECUTIVE_SAME_UNIT,
            calculator_ratio: DEFAULT_CALCULATOR_RATIO,
            calculator_swap_tolerance: DEFAULT_CALCULATOR_SWAP_TOLERANCE,
            priority: PriorityWeights::default(),
        }
    }
}

/// Shape of config.toml; only the scheduler table is of interest here
#[derive(Debug, Deserialize)]
struct AppConfig {
    scheduler: Option<SchedulerConfig>,
}

impl SchedulerConfig {
    /// Check every invariant the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_daily_reviews == 0 {
            return Err(ConfigError::ZeroMaxDaily);
        }
        if self.min_daily_reviews > self.max_daily_reviews {
            return Err(ConfigError::InvertedDailyBounds {
                min: self.min_daily_reviews,
                max: self.max_daily_reviews,
            });
        }
        if self.target_daily_reviews < self.min_daily_reviews
            || self.target_daily_reviews > self.max_daily_reviews
        {
            return Err(ConfigError::TargetOutOfBounds {
                target: self.target_daily_reviews,
                min: self.min_daily_reviews,
                max: self.max_daily_reviews,
            });
        }
        if self.max_consecutive_same_topic == 0 {
            return Err(ConfigError::ZeroRunLimit {
                field: "max_consecutive_same_topic",
            });
        }
        if self.max_consecutive_same_unit == 0 {
            return Err(ConfigError::ZeroRunLimit {
                field: "max_consecutive_same_unit",
            });
        }
        check_fraction("calculator_ratio", self.calculator_ratio)?;
        check_fraction("calculator_swap_tolerance", self.calculator_swap_tolerance)?;
        self.priority.validate()
    }

    /// Parse a standalone scheduler TOML document (no `[scheduler]` header)
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load config with priority: $SCHEDULER_CONFIG file > config.toml [scheduler] > defaults
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        // Priority 1: explicit file from the environment
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            tracing::info!("Using scheduler config from {} env: {}", CONFIG_PATH_ENV, path);
            return Self::load_from_path(Path::new(&path));
        }

        // Priority 2: config.toml
        if let Some(config) = Self::load_app_config(Path::new(APP_CONFIG_FILE))? {
            tracing::info!("Using scheduler config from {}", APP_CONFIG_FILE);
            return Ok(config);
        }

        // Default
        tracing::info!("Using default scheduler config");
        Ok(Self::default())
    }

    /// Read the `[scheduler]` table of an application config file, if both exist.
    /// A missing file is `Ok(None)`; any other read failure is an error.
    pub fn load_app_config(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let app: AppConfig = toml::from_str(&contents)?;
        match app.scheduler {
            Some(config) => {
                config.validate()?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { field, value })
    }
}
