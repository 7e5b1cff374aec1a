pub mod config;
pub mod domain;
pub mod error;
pub mod srs;

pub use config::{PriorityWeights, SchedulerConfig};
pub use error::{ConfigError, QualityOutOfRange};
