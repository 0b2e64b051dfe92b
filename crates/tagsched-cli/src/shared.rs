use chrono::{DateTime, Utc};
use tagsched_core::clock::{Clock, FixedClock, SystemClock};
use tagsched_core::{FilterConfig, TimeType};

use crate::error::{CliError, CliResult};

/// The four concrete filter variants §4.D/§4.E name. `BusinessHoursOn`/`Off`
/// are handled by the business-hours adapter; the other two go straight to
/// the core [`tagsched_core::TimeFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    OnHour,
    OffHour,
    BusinessHoursOn,
    BusinessHoursOff,
}

impl Variant {
    pub fn is_business_hours(self) -> bool {
        matches!(self, Variant::BusinessHoursOn | Variant::BusinessHoursOff)
    }

    pub fn time_type(self) -> TimeType {
        match self {
            Variant::OnHour | Variant::BusinessHoursOn => TimeType::On,
            Variant::OffHour | Variant::BusinessHoursOff => TimeType::Off,
        }
    }

    /// Per-variant defaults the source gives `OnHour`/`OffHour`
    /// (`maid_offhours`, `et`) and `BusinessHours` (`BusinessHours`, `pt`).
    pub fn default_tag(self) -> &'static str {
        if self.is_business_hours() {
            "BusinessHours"
        } else {
            "maid_offhours"
        }
    }

    pub fn default_tz(self) -> &'static str {
        if self.is_business_hours() { "pt" } else { "et" }
    }
}

pub fn parse_variant(s: &str) -> CliResult<Variant> {
    match s.to_lowercase().as_str() {
        "onhour" | "on" => Ok(Variant::OnHour),
        "offhour" | "off" => Ok(Variant::OffHour),
        "businesshours-on" | "businesshours_on" | "biz-on" => Ok(Variant::BusinessHoursOn),
        "businesshours-off" | "businesshours_off" | "biz-off" => Ok(Variant::BusinessHoursOff),
        _ => Err(CliError::input(format!(
            "Invalid variant '{}'. Expected: onhour, offhour, businesshours-on, businesshours-off",
            s
        ))),
    }
}

/// Build the typed [`FilterConfig`] a filter variant is constructed from,
/// filling per-variant tag/tz defaults when the CLI flags were left unset.
pub fn build_filter_config(
    variant: Variant,
    tag: Option<String>,
    default_tz: Option<String>,
    weekends: bool,
    weekends_only: bool,
    opt_out: bool,
    default_hour: u8,
    default_minute: u8,
    businesshours: Option<String>,
) -> FilterConfig {
    FilterConfig {
        time_type: variant.time_type(),
        tag_key: tag.unwrap_or_else(|| variant.default_tag().to_string()),
        default_tz: default_tz.unwrap_or_else(|| variant.default_tz().to_string()),
        weekends,
        weekends_only,
        opt_out,
        default_hour,
        default_minute,
        businesshours,
    }
}

/// `--now` parses as RFC3339 and becomes a [`FixedClock`]; absent, the
/// system clock is used. Deterministic time is what lets the CLI's golden
/// tests and the library's own tests avoid depending on wall-clock time.
pub fn build_clock(now: &Option<String>) -> CliResult<Box<dyn Clock>> {
    match now {
        Some(raw) => {
            let instant: DateTime<Utc> = DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| CliError::input(format!("Invalid --now '{}': {}", raw, e)))?;
            Ok(Box::new(FixedClock(instant)))
        }
        None => Ok(Box::new(SystemClock)),
    }
}
