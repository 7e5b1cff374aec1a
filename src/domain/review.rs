use serde::{Deserialize, Serialize};

use crate::error::QualityOutOfRange;

/// Lowest quality rating that counts as a successful recall
pub const PASS_THRESHOLD: u8 = 3;

/// Highest quality rating
pub const MAX_QUALITY: u8 = 5;

/// SM-2 recall quality on the 0-5 scale.
///
/// 0 = blackout, 1 = recalled only with heavy help, 2 = partial recall,
/// 3 = correct with serious difficulty, 4 = correct after hesitation,
/// 5 = fluent recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
  pub const BLACKOUT: Self = Self(0);
  pub const HEAVY_ASSISTANCE: Self = Self(1);
  pub const PARTIAL_RECALL: Self = Self(2);
  pub const SERIOUS_DIFFICULTY: Self = Self(3);
  pub const HESITATION: Self = Self(4);
  pub const FLUENT: Self = Self(5);

  pub fn from_u8(value: u8) -> Option<Self> {
    (value <= MAX_QUALITY).then_some(Self(value))
  }

  /// Clamp an arbitrary integer rating into 0-5
  pub fn clamped(value: i64) -> Self {
    Self(value.clamp(0, MAX_QUALITY as i64) as u8)
  }

  pub fn value(self) -> u8 {
    self.0
  }

  pub fn is_passing(self) -> bool {
    self.0 >= PASS_THRESHOLD
  }
}

impl TryFrom<u8> for Quality {
  type Error = QualityOutOfRange;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::from_u8(value).ok_or(QualityOutOfRange(value))
  }
}

impl From<Quality> for u8 {
  fn from(quality: Quality) -> Self {
    quality.0
  }
}

/// Raw outcome of the most recent answer to a problem, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub time_spent_seconds: f64,
  #[serde(default)]
  pub hints_used: u32,
}

impl AnswerOutcome {
  pub fn new(correct: bool, time_spent_seconds: f64, hints_used: u32) -> Self {
    Self {
      correct,
      time_spent_seconds,
      hints_used,
    }
  }
}
