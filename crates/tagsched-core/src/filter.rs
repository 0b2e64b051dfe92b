//! The time filter core: per-resource on/off/business-hours evaluation.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Timelike;

use crate::clock::Clock;
use crate::error::{Result, SchedulerError};
use crate::models::{FilterConfig, Schedule, TimeType, Toggle};
use crate::parser::{self, ScheduleParser};
use crate::range;
use crate::resource::{self, Resource};
use crate::tz;

/// Hardcoded fallback used for the half of a default schedule the caller
/// didn't configure (mirrors the source's module-level on/off defaults:
/// 07:00 on, 19:00 off).
const DEFAULT_ON: (u8, u8) = (7, 0);
const DEFAULT_OFF: (u8, u8) = (19, 0);

/// A snapshot of one pass's accumulators, captured by [`TimeFilter::process`]
/// before they're reset for the next pass.
#[derive(Debug, Clone, Default)]
pub struct PassSummary {
    pub enabled_count: usize,
    pub opted_out: Vec<Resource>,
    pub parse_errors: Vec<(String, String)>,
}

/// Per-resource scheduling filter. Construct once per policy load; the
/// accumulators (`opted_out`, `parse_errors`, `enabled_count`) reset at the
/// start of each [`TimeFilter::process`] pass.
pub struct TimeFilter {
    config: FilterConfig,
    id_field: String,
    log_dir: Option<PathBuf>,
    parser: ScheduleParser,
    clock: Box<dyn Clock>,
    opted_out: RefCell<Vec<Resource>>,
    parse_errors: RefCell<Vec<(String, String)>>,
    enabled_count: Cell<usize>,
}

impl TimeFilter {
    /// Construct and validate a filter instance. Configuration errors
    /// (unresolvable timezone, out-of-range hour/minute, empty
    /// `businesshours` default) surface here and abort policy load.
    pub fn new(config: FilterConfig, clock: Box<dyn Clock>) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            id_field: resource::DEFAULT_ID_FIELD.to_string(),
            log_dir: None,
            parser: ScheduleParser::new(),
            clock,
            opted_out: RefCell::new(Vec::new()),
            parse_errors: RefCell::new(Vec::new()),
            enabled_count: Cell::new(0),
        })
    }

    /// Override the id field name, as discovered by the framework from
    /// `manager.get_model().id` for the resource type in question.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Provide the directory post-pass accumulator dumps are written to.
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled_count.get()
    }

    pub fn opted_out(&self) -> std::cell::Ref<'_, Vec<Resource>> {
        self.opted_out.borrow()
    }

    pub fn parse_errors(&self) -> std::cell::Ref<'_, Vec<(String, String)>> {
        self.parse_errors.borrow()
    }

    /// Build the schedule used when a resource has no resource-specific
    /// tag value: both halves (the configured `time_type` and its
    /// inverse) are always present so a range view can always be built.
    fn default_schedule(&self) -> Schedule {
        let days = self.config.default_days();
        let primary = Toggle {
            days: days.clone(),
            hour: self.config.default_hour,
            minute: self.config.default_minute,
        };
        let (inv_hour, inv_minute) = match self.config.time_type.inverse() {
            TimeType::On => DEFAULT_ON,
            TimeType::Off => DEFAULT_OFF,
        };
        let inverse = Toggle {
            days,
            hour: inv_hour,
            minute: inv_minute,
        };
        match self.config.time_type {
            TimeType::On => Schedule {
                on: vec![primary],
                off: vec![inverse],
                tz: self.config.default_tz.clone(),
            },
            TimeType::Off => Schedule {
                on: vec![inverse],
                off: vec![primary],
                tz: self.config.default_tz.clone(),
            },
        }
    }

    /// Build the schedule a resource's (already normalized) raw tag value
    /// implies, per §4.D step 5: a resource-specific schedule if the
    /// configured time_type's key is present, the default schedule
    /// (optionally tz-overridden) if the raw data is otherwise
    /// well-formed, or nothing.
    fn schedule_for(&self, raw: &str) -> Option<Schedule> {
        let collapsed = collapse_semicolons(raw);
        let time_type_key = match self.config.time_type {
            TimeType::On => "on",
            TimeType::Off => "off",
        };
        if parser::has_resource_schedule(&collapsed, time_type_key) {
            return self.parser.parse(&collapsed, &self.config.default_tz);
        }
        if parser::keys_are_valid(&collapsed) {
            let mut schedule = self.default_schedule();
            if let Some(tz_override) = parser::raw_data(&collapsed).get("tz") {
                if !tz_override.is_empty() {
                    schedule.tz = tz_override.clone();
                }
            }
            return Some(schedule);
        }
        None
    }

    /// Evaluate a single resource against the configured `time_type`.
    /// Never panics outward: any unexpected failure is folded into
    /// `parse_errors` and the resource is treated as no-match, per the
    /// error-propagation rule.
    pub fn evaluate_one(&self, r: &Resource) -> bool {
        let rid = resource::resource_id(r, &self.id_field);

        let raw = match resource::tag_value(r, &self.config.tag_key) {
            Some(v) => v,
            None => {
                if !self.config.opt_out {
                    return false;
                }
                String::new()
            }
        };

        if raw == "off" {
            self.opted_out.borrow_mut().push(r.clone());
            return false;
        }

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.schedule_for(&raw)
        }));

        match outcome {
            Ok(schedule) => self.finish(&rid, &raw, schedule),
            Err(_) => {
                tracing::error!(id = %rid, value = %raw, "unexpected failure evaluating schedule");
                self.parse_errors.borrow_mut().push((rid, raw));
                false
            }
        }
    }

    /// Shared tail of evaluation once a candidate schedule has been built
    /// (whether from the plain grammar or a business-hours rewrite):
    /// resolve the zone, compute now-in-zone, and test range membership.
    fn finish(&self, rid: &str, raw_for_errors: &str, schedule: Option<Schedule>) -> bool {
        let Some(schedule) = schedule else {
            tracing::warn!(id = %rid, value = %raw_for_errors, "schedule parse failed");
            self.parse_errors
                .borrow_mut()
                .push((rid.to_string(), raw_for_errors.to_string()));
            return false;
        };

        let Ok(resolved_tz) = tz::resolve(&schedule.tz) else {
            tracing::warn!(id = %rid, tz = %schedule.tz, "unresolvable timezone");
            self.parse_errors
                .borrow_mut()
                .push((rid.to_string(), raw_for_errors.to_string()));
            return false;
        };

        self.enabled_count.set(self.enabled_count.get() + 1);

        let now_local = self.clock.now_utc().with_timezone(&resolved_tz);
        let weekday = crate::models::weekday_index(now_local.weekday());
        let time = crate::models::TimeOfDay::new(now_local.hour() as u8, now_local.minute() as u8);
        let ranges = range::get_ranges(&schedule);
        let matched = range::match_range(weekday, time, &ranges);

        match self.config.time_type {
            TimeType::On => matched,
            TimeType::Off => !matched,
        }
    }

    /// Resolve the id-extraction field (as the business-hours adapter does
    /// its own tag reading and needs the same resource id).
    pub(crate) fn id_field(&self) -> &str {
        &self.id_field
    }

    pub(crate) fn record_parse_error(&self, rid: String, raw: String) {
        self.parse_errors.borrow_mut().push((rid, raw));
    }

    pub(crate) fn record_opted_out(&self, r: Resource) {
        self.opted_out.borrow_mut().push(r);
    }

    /// Evaluate an already-rewritten canonical schedule string (the
    /// business-hours adapter's output) through the same tz-resolution and
    /// range-matching tail used by the plain on/off path.
    pub(crate) fn evaluate_canonical_schedule(&self, rid: &str, canonical: &str) -> bool {
        let schedule = self.parser.parse(canonical, &self.config.default_tz);
        self.finish(rid, canonical, schedule)
    }

    /// Evaluate every resource, returning the subset that matched in
    /// input order together with a snapshot of the pass's accumulators,
    /// taken before `log_dir` is flushed and the accumulators reset for
    /// the next pass.
    pub fn process(&self, resources: &[Resource]) -> (Vec<Resource>, PassSummary) {
        let matched: Vec<Resource> = resources
            .iter()
            .filter(|r| self.evaluate_one(r))
            .cloned()
            .collect();

        let summary = self.flush();

        (matched, summary)
    }

    /// Snapshot the pass's accumulators, dump non-empty ones to `log_dir`
    /// (if configured), and reset them for the next pass. Called at the
    /// end of [`TimeFilter::process`] and by the business-hours adapter's
    /// own top-level pass.
    pub(crate) fn flush(&self) -> PassSummary {
        let summary = PassSummary {
            enabled_count: self.enabled_count.get(),
            opted_out: self.opted_out.borrow().clone(),
            parse_errors: self.parse_errors.borrow().clone(),
        };
        if let Some(dir) = &self.log_dir {
            if let Err(err) = self.dump_accumulators(dir) {
                tracing::warn!(error = %err, "failed to write accumulator dumps");
            }
        }
        self.reset_accumulators();
        summary
    }

    fn dump_accumulators(&self, dir: &Path) -> std::io::Result<()> {
        let parse_errors = self.parse_errors.borrow();
        if !parse_errors.is_empty() {
            let body = serde_json::to_vec_pretty(&*parse_errors)?;
            fs::write(dir.join("parse_errors.json"), body)?;
        }
        let opted_out = self.opted_out.borrow();
        if !opted_out.is_empty() {
            let body = serde_json::to_vec_pretty(&*opted_out)?;
            fs::write(dir.join("opted_out.json"), body)?;
        }
        Ok(())
    }

    fn reset_accumulators(&self) {
        self.opted_out.borrow_mut().clear();
        self.parse_errors.borrow_mut().clear();
        self.enabled_count.set(0);
    }
}

/// Collapse runs of empty `;`-separated segments (`"on=x;;off=y"` ->
/// `"on=x;off=y"`) before parsing.
fn collapse_semicolons(s: &str) -> String {
    s.split(';')
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(";")
}

fn validate_config(config: &FilterConfig) -> Result<()> {
    tz::resolve(&config.default_tz)?;
    if config.default_hour > 23 {
        return Err(SchedulerError::InvalidConfig(format!(
            "default_hour out of range: {}",
            config.default_hour
        )));
    }
    if config.default_minute > 59 {
        return Err(SchedulerError::InvalidConfig(format!(
            "default_minute out of range: {}",
            config.default_minute
        )));
    }
    if let Some(bh) = &config.businesshours {
        if bh.is_empty() {
            return Err(SchedulerError::InvalidConfig(
                "businesshours default must be non-empty".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn on_hour_config() -> FilterConfig {
        FilterConfig {
            time_type: TimeType::Off,
            tag_key: "maid_offhours".into(),
            default_tz: "et".into(),
            weekends: true,
            weekends_only: false,
            opt_out: false,
            default_hour: 19,
            default_minute: 0,
            businesshours: None,
        }
    }

    fn resource_with_tag(value: &str) -> Resource {
        json!({
            "InstanceId": "i-1",
            "Tags": [{"Key": "maid_offhours", "Value": value}],
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn clock_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Box<dyn Clock> {
        Box::new(FixedClock(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()))
    }

    #[test]
    fn e1_offhour_matches_inside_off_window() {
        let filter = TimeFilter::new(on_hour_config(), clock_at(2023, 3, 16, 2, 30)).unwrap();
        // 2023-03-16 02:30 UTC = 2023-03-15 19:30 America/Los_Angeles (PDT, UTC-7)
        let r = resource_with_tag("off=(m-f,19);on=(m-f,7);tz=pt");
        assert!(filter.evaluate_one(&r));
    }

    #[test]
    fn e2_offhour_no_match_midday() {
        let filter = TimeFilter::new(on_hour_config(), clock_at(2023, 3, 15, 19, 0)).unwrap();
        // 2023-03-15 19:00 UTC = 2023-03-15 12:00 America/Los_Angeles
        let r = resource_with_tag("off=(m-f,19);on=(m-f,7);tz=pt");
        assert!(!filter.evaluate_one(&r));
    }

    #[test]
    fn e3_onhour_no_match_after_sunday_off() {
        let mut config = on_hour_config();
        config.time_type = TimeType::On;
        // 2023-05-08 02:00 UTC = 2023-05-07 19:00 America/Los_Angeles (PDT)
        let filter = TimeFilter::new(config, clock_at(2023, 5, 8, 2, 0)).unwrap();
        let r = resource_with_tag("off=[(m-f,21),(u,18,30)];on=[(m-f,6,30),(u,10)];tz=pt");
        assert!(!filter.evaluate_one(&r));
    }

    #[test]
    fn e4_onhour_opt_out_default_schedule_matches() {
        let mut config = on_hour_config();
        config.time_type = TimeType::On;
        config.opt_out = true;
        config.default_hour = 7;
        config.default_tz = "et".into();
        // 2023-03-07 (Tue) 09:00 America/New_York = 14:00 UTC (before the March 12 DST switch, EST UTC-5)
        let filter = TimeFilter::new(config, clock_at(2023, 3, 7, 14, 0)).unwrap();
        let r: Resource = json!({"InstanceId": "i-1", "Tags": []}).as_object().unwrap().clone();
        assert!(filter.evaluate_one(&r));
    }

    #[test]
    fn off_sentinel_records_opted_out_and_no_match() {
        let filter = TimeFilter::new(on_hour_config(), clock_at(2023, 3, 15, 19, 0)).unwrap();
        let r = resource_with_tag("off");
        assert!(!filter.evaluate_one(&r));
        assert_eq!(filter.opted_out().len(), 1);
    }

    #[test]
    fn missing_tag_without_opt_out_is_no_match() {
        let filter = TimeFilter::new(on_hour_config(), clock_at(2023, 3, 15, 19, 0)).unwrap();
        let r: Resource = json!({"InstanceId": "i-1", "Tags": []}).as_object().unwrap().clone();
        assert!(!filter.evaluate_one(&r));
    }

    #[test]
    fn malformed_schedule_records_parse_error() {
        let filter = TimeFilter::new(on_hour_config(), clock_at(2023, 3, 15, 19, 0)).unwrap();
        let r = resource_with_tag("bogus=(m-f,7)");
        assert!(!filter.evaluate_one(&r));
        assert_eq!(filter.parse_errors().len(), 1);
    }

    #[test]
    fn tz_override_uses_default_schedule_with_new_zone() {
        let mut config = on_hour_config();
        config.time_type = TimeType::Off;
        config.default_tz = "et".into();
        // 2023-03-15 19:00 America/Los_Angeles = 2023-03-16 02:00 UTC
        let filter = TimeFilter::new(config, clock_at(2023, 3, 16, 2, 0)).unwrap();
        let r = resource_with_tag("tz=pt");
        assert!(filter.evaluate_one(&r));
    }

    #[test]
    fn on_off_are_complements_for_same_schedule_and_time() {
        let off_config = on_hour_config();
        let mut on_config = off_config.clone();
        on_config.time_type = TimeType::On;

        let off_filter = TimeFilter::new(off_config, clock_at(2023, 3, 16, 2, 30)).unwrap();
        let on_filter = TimeFilter::new(on_config, clock_at(2023, 3, 16, 2, 30)).unwrap();

        let r = resource_with_tag("off=(m-f,19);on=(m-f,7);tz=pt");
        assert_eq!(off_filter.evaluate_one(&r), !on_filter.evaluate_one(&r));
    }

    #[test]
    fn process_preserves_input_order_and_resets_accumulators() {
        let filter = TimeFilter::new(on_hour_config(), clock_at(2023, 3, 16, 2, 30)).unwrap();
        let matching = resource_with_tag("off=(m-f,19);on=(m-f,7);tz=pt");
        let other: Resource = json!({"InstanceId": "i-2", "Tags": []}).as_object().unwrap().clone();
        let bad = resource_with_tag("bogus=(m-f,7)");

        let (matched, summary) = filter.process(&[matching.clone(), other, bad]);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0], matching);
        assert_eq!(summary.parse_errors.len(), 1);
        assert_eq!(summary.enabled_count, 1);
        assert_eq!(filter.parse_errors().len(), 0);
    }

    #[test]
    fn construction_rejects_bad_timezone() {
        let mut config = on_hour_config();
        config.default_tz = "nope".into();
        assert!(TimeFilter::new(config, clock_at(2023, 1, 1, 0, 0)).is_err());
    }

    #[test]
    fn construction_rejects_out_of_range_hour() {
        let mut config = on_hour_config();
        config.default_hour = 24;
        assert!(TimeFilter::new(config, clock_at(2023, 1, 1, 0, 0)).is_err());
    }
}
