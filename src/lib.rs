// Library interface for stridestats
// Analysis of running activity records: time, distance, elevation, heart rate, power

pub mod activity;
pub mod config;
pub mod error;
pub mod fields;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod moving;
pub mod report;
pub mod running_power;
pub mod smoothing;

// Re-export commonly used types for convenience
pub use activity::Activity;
pub use config::{AnalysisConfig, AthleteThresholds, PowerConfig};
pub use error::{CalculationError, ErrorSeverity, OptionalField, Result, StrideError};
pub use fields::{ElevationConfig, FieldAccessor};
pub use logging::{init_logging, LogConfig, LogFile, LogFormat, LogLevel, LogRotation};
pub use metrics::NormalizedPower;
pub use models::*;
pub use moving::MovingConfig;
pub use report::{report_many, ActivityReport};
pub use smoothing::{ElevationSmoother, MovingAverageSmoother};
