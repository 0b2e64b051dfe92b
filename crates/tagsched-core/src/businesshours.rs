//! Business-hours adapter: rewrites the short `H:MM-H:MM TZ` tag grammar
//! into the canonical schedule grammar and delegates to the core on/off
//! evaluation path.
//!
//! Implemented as composition, not inheritance (the source's
//! `BusinessHoursOn`/`BusinessHoursOff` each inherit from both a
//! business-hours base and an on/off-hour base): this filter owns an
//! inner [`TimeFilter`] and forwards to its shared evaluation tail after
//! rewriting the tag value, rather than sharing behavior through a type
//! hierarchy.

use crate::clock::Clock;
use crate::error::{Result, SchedulerError};
use crate::filter::TimeFilter;
use crate::models::FilterConfig;
use crate::resource::{self, Resource};

/// A parsed short-form business-hours value: `"8:00-18:00 pt"` ->
/// `{ on_hour: 8, off_hour: 18, tz: "pt" }`. Minutes are intentionally
/// discarded — the source does the same, and whether that's a bug or
/// deliberate is left unresolved upstream; the limitation is preserved
/// rather than silently fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortForm {
    pub on_hour: u8,
    pub off_hour: u8,
    pub tz: String,
}

/// Parse `"H:MM-H:MM TZ"` into its components. Any split or integer-parse
/// failure is a configuration-surface validation error; at process time
/// this becomes a per-resource parse error (it can only be discovered
/// once a specific tag value is in hand, not at filter construction).
pub fn parse_short(s: &str) -> Result<ShortForm> {
    let (range, tz) = s
        .trim()
        .split_once(' ')
        .ok_or_else(|| SchedulerError::BusinessHoursParseError(s.to_string()))?;
    let (on_part, off_part) = range
        .split_once('-')
        .ok_or_else(|| SchedulerError::BusinessHoursParseError(s.to_string()))?;
    let on_hour = parse_hour(on_part)
        .ok_or_else(|| SchedulerError::BusinessHoursParseError(s.to_string()))?;
    let off_hour = parse_hour(off_part)
        .ok_or_else(|| SchedulerError::BusinessHoursParseError(s.to_string()))?;
    Ok(ShortForm {
        on_hour,
        off_hour,
        tz: tz.to_ascii_lowercase(),
    })
}

fn parse_hour(hhmm: &str) -> Option<u8> {
    let (hour, _minute) = hhmm.split_once(':').unwrap_or((hhmm, "0"));
    let hour: u8 = hour.parse().ok()?;
    if hour > 23 { None } else { Some(hour) }
}

/// True if the value signals 24-hour operation (`"24hours"`/`"24hour"`,
/// case-insensitive): such resources must never be stopped.
pub fn is_24hours(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "24hours" | "24hour")
}

/// Rewrite a parsed short form into the canonical grammar, e.g.
/// `off=(m-f,18);on=(m-f,8);tz=pt`.
fn to_canonical_short(short: &ShortForm, days_token: &str) -> String {
    format!(
        "off=({days},{off});on=({days},{on});tz={tz}",
        days = days_token,
        off = short.off_hour,
        on = short.on_hour,
        tz = short.tz,
    )
}

/// Mirrors the short form's weekday set onto the same day-token grammar
/// the canonical parser expects, using the filter's configured
/// weekends/weekends-only precedence.
fn days_token_for(config: &FilterConfig) -> &'static str {
    if config.weekends_only {
        "f"
    } else if config.weekends {
        "m-f"
    } else {
        "m-u"
    }
}

/// Business-hours filter variant. Wraps an inner on- or off-hour
/// [`TimeFilter`] (selected by `config.time_type`) and rewrites each
/// resource's tag value before delegating to it.
pub struct BusinessHoursFilter {
    inner: TimeFilter,
    tag_key: String,
    opt_out: bool,
    businesshours_default: String,
}

impl BusinessHoursFilter {
    pub fn new(config: FilterConfig, clock: Box<dyn Clock>) -> Result<Self> {
        let businesshours_default = config.businesshours.clone().ok_or_else(|| {
            SchedulerError::InvalidConfig("businesshours default is required".into())
        })?;
        if businesshours_default.is_empty() {
            return Err(SchedulerError::InvalidConfig(
                "businesshours default must be non-empty".into(),
            ));
        }
        let tag_key = config.tag_key.clone();
        let opt_out = config.opt_out;
        let inner = TimeFilter::new(config, clock)?;
        Ok(Self {
            inner,
            tag_key,
            opt_out,
            businesshours_default,
        })
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.inner = self.inner.with_id_field(id_field);
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<std::path::PathBuf>) -> Self {
        self.inner = self.inner.with_log_dir(log_dir);
        self
    }

    pub fn inner(&self) -> &TimeFilter {
        &self.inner
    }

    pub fn evaluate_one(&self, r: &Resource) -> bool {
        let rid = resource::resource_id(r, self.inner.id_field());

        let raw = match resource::tag_value(r, &self.tag_key) {
            Some(v) => v,
            None => {
                if !self.opt_out {
                    return false;
                }
                String::new()
            }
        };

        if raw == "off" {
            self.inner.record_opted_out(r.clone());
            return false;
        }

        if is_24hours(&raw) {
            return false;
        }

        let value = if raw.is_empty() {
            self.businesshours_default.clone()
        } else {
            raw.clone()
        };

        let short = match parse_short(&value) {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!(id = %rid, value = %value, "business-hours short form failed to parse");
                self.inner.record_parse_error(rid, value);
                return false;
            }
        };

        let days_token = days_token_for(self.inner.config());
        let canonical = to_canonical_short(&short, days_token);
        self.inner.evaluate_canonical_schedule(&rid, &canonical)
    }

    pub fn process(&self, resources: &[Resource]) -> (Vec<Resource>, crate::filter::PassSummary) {
        let matched: Vec<Resource> = resources
            .iter()
            .filter(|r| self.evaluate_one(r))
            .cloned()
            .collect();
        let summary = self.inner.flush();
        (matched, summary)
    }
}
