//! Canonical schedule data types and the range-based view derived from them.
//!
//! - [`Toggle`] — a (days, hour, minute) triple marking an on/off transition.
//! - [`Schedule`] — canonical in-memory schedule: ordered `on`/`off` toggles plus a zone key.
//! - [`RangeView`] — per-weekday list of time-of-day intervals, built from a [`Schedule`].
//! - [`TimeType`] — which window a filter instance is evaluating against.
//! - [`FilterConfig`] — typed, validated construction surface for a filter instance.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Monday=0 .. Sunday=6, matching the standard civil week and
/// `chrono::Weekday::num_days_from_monday()`.
pub type WeekdayIndex = u8;

pub fn weekday_index(day: chrono::Weekday) -> WeekdayIndex {
    day.num_days_from_monday() as u8
}

/// A time of day at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A (days, hour, minute) triple: "at this local time on each of these
/// days, switch".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub days: BTreeSet<WeekdayIndex>,
    pub hour: u8,
    pub minute: u8,
}

impl Toggle {
    pub fn time(&self) -> TimeOfDay {
        TimeOfDay::new(self.hour, self.minute)
    }
}

/// Which window a filter instance evaluates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeType {
    On,
    Off,
}

impl TimeType {
    /// The non-primary half of a default schedule: an `On` filter's default
    /// schedule still needs an `off` toggle (and vice versa) so a range
    /// view can always be built.
    pub fn inverse(self) -> TimeType {
        match self {
            TimeType::On => TimeType::Off,
            TimeType::Off => TimeType::On,
        }
    }
}

impl std::fmt::Display for TimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeType::On => write!(f, "on"),
            TimeType::Off => write!(f, "off"),
        }
    }
}

/// Canonical schedule: ordered `on`/`off` toggles plus a resolved zone key.
///
/// Invariant: at least one of `on`/`off` must be non-empty for a parsed
/// schedule to be considered resource-specified; a schedule whose only
/// meaningful entry is `tz` is a "use the default schedule with this tz
/// override" signal, handled one layer up in the filter core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub on: Vec<Toggle>,
    pub off: Vec<Toggle>,
    pub tz: String,
}

impl Schedule {
    pub fn is_resource_specified(&self) -> bool {
        !self.on.is_empty() || !self.off.is_empty()
    }
}

/// A single in-window interval for one weekday. Either bound may be absent
/// (see [`crate::range`] for how that arises); an incomplete range never
/// matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
}

/// Per-weekday list of in-window intervals, derived from a [`Schedule`].
pub type RangeView = std::collections::BTreeMap<WeekdayIndex, Vec<TimeRange>>;

/// Typed, validated construction surface for a filter instance (the
/// systems-language replacement for the framework's dynamic config map).
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub time_type: TimeType,
    pub tag_key: String,
    pub default_tz: String,
    pub weekends: bool,
    pub weekends_only: bool,
    pub opt_out: bool,
    pub default_hour: u8,
    pub default_minute: u8,
    /// Only populated for the business-hours filter variant.
    pub businesshours: Option<String>,
}

impl FilterConfig {
    /// Days selected for the default toggle, per §4.D's sub-variant rule:
    /// `weekends_only` wins over `weekends`; neither set means all seven
    /// days.
    pub fn default_days(&self) -> BTreeSet<WeekdayIndex> {
        if self.weekends_only {
            BTreeSet::from([4])
        } else if self.weekends {
            (0..5).collect()
        } else {
            (0..7).collect()
        }
    }
}
