//! # tagsched-core
//!
//! A tag-driven resource scheduling window library for cloud-resource
//! policy engines, with DST-aware timezone handling.
//!
//! Given a resource's schedule tag (or a policy-wide default schedule),
//! answers "is this resource inside its on-window / off-window right now,
//! in its configured timezone" — the decision a fleet-management policy
//! uses to decide whether to stop, start, or otherwise touch a resource.
//!
//! ## Example
//!
//! ```
//! use tagsched_core::prelude::*;
//! use serde_json::json;
//!
//! let config = FilterConfig {
//!     time_type: TimeType::Off,
//!     tag_key: "maid_offhours".into(),
//!     default_tz: "et".into(),
//!     weekends: true,
//!     weekends_only: false,
//!     opt_out: false,
//!     default_hour: 19,
//!     default_minute: 0,
//!     businesshours: None,
//! };
//! let filter = TimeFilter::new(config, Box::new(SystemClock)).unwrap();
//!
//! let resource = json!({
//!     "InstanceId": "i-0123",
//!     "Tags": [{"Key": "maid_offhours", "Value": "off=(m-f,19);on=(m-f,7);tz=pt"}],
//! }).as_object().unwrap().clone();
//!
//! let _matched = filter.evaluate_one(&resource);
//! ```

pub mod businesshours;
pub mod clock;
pub mod error;
pub mod filter;
pub mod models;
pub mod parser;
pub mod range;
pub mod resource;
pub mod serialize;
pub mod tz;

pub use businesshours::BusinessHoursFilter;
pub use error::{Result, SchedulerError};
pub use filter::{PassSummary, TimeFilter};
pub use models::{FilterConfig, RangeView, Schedule, TimeOfDay, TimeType, Toggle};
pub use resource::Resource;

/// Prelude module for convenient imports.
///
/// ```
/// use tagsched_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::businesshours::BusinessHoursFilter;
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::error::{Result, SchedulerError};
    pub use crate::filter::{PassSummary, TimeFilter};
    pub use crate::models::*;
    pub use crate::resource::Resource;
    pub use crate::tz::resolve as resolve_tz;
}
