//! Error types for tagsched-core.
//!
//! Configuration errors (raised at filter construction / `validate()`) are
//! the only ones that propagate as `Result::Err` across the public API.
//! Per-resource failures (bad tag value, unresolved zone, ...) never use
//! this type — they are folded into the filter's accumulators instead, per
//! the propagation rule in the evaluation core.

use thiserror::Error;

/// The main error type for tagsched configuration-time failures.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A timezone alias or IANA zone name did not resolve.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A schedule tag value failed to parse.
    #[error("schedule parse error: {0}")]
    ScheduleParseError(String),

    /// A business-hours short-form value failed to parse.
    #[error("business-hours parse error: {0}")]
    BusinessHoursParseError(String),

    /// A `FilterConfig` field was out of its allowed range or missing.
    #[error("invalid filter configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for tagsched configuration operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
