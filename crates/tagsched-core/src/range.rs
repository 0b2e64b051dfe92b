//! Derives a [`RangeView`] from a [`Schedule`] and answers membership
//! queries against it.

use crate::models::{RangeView, Schedule, TimeOfDay, TimeRange};

/// Build the per-weekday interval list for a schedule.
///
/// For each `on` toggle, open a new interval (`start` set, `end` absent) on
/// every day it fires. For each `off` toggle, close the most recently
/// opened interval on that day if one is still open; otherwise append a
/// degenerate `end`-only entry (source-faithful: this entry can never
/// satisfy [`is_time_in_time_period`] since both bounds are required).
pub fn get_ranges(schedule: &Schedule) -> RangeView {
    let mut ranges: RangeView = RangeView::new();

    for toggle in &schedule.on {
        let time = toggle.time();
        for &day in &toggle.days {
            ranges
                .entry(day)
                .or_default()
                .push(TimeRange {
                    start: Some(time),
                    end: None,
                });
        }
    }

    for toggle in &schedule.off {
        let time = toggle.time();
        for &day in &toggle.days {
            let day_ranges = ranges.entry(day).or_default();
            match day_ranges.iter_mut().find(|r| r.start.is_some() && r.end.is_none()) {
                Some(open) => open.end = Some(time),
                None => day_ranges.push(TimeRange {
                    start: None,
                    end: Some(time),
                }),
            }
        }
    }

    ranges
}

/// `start`/`end` describe a time-of-day window; returns whether `q` falls
/// inside it. A window crossing midnight (`start >= end`) is the union of
/// `[start, 24:00)` and `[00:00, end)`.
pub fn is_time_in_time_period(start: TimeOfDay, end: TimeOfDay, q: TimeOfDay) -> bool {
    if start < end {
        start <= q && q < end
    } else {
        q >= start || q < end
    }
}

impl TimeRange {
    pub fn contains(&self, q: TimeOfDay) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => is_time_in_time_period(start, end, q),
            _ => false,
        }
    }
}

/// Whether `now`'s weekday is present in `ranges` and any of that day's
/// intervals contains `now`'s time of day.
pub fn match_range(weekday: u8, time: TimeOfDay, ranges: &RangeView) -> bool {
    ranges
        .get(&weekday)
        .is_some_and(|intervals| intervals.iter().any(|r| r.contains(time)))
}
