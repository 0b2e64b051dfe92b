//! The clock capability used to read "now" during evaluation, so tests can
//! inject a deterministic instant instead of depending on the system clock.

use chrono::{DateTime, Utc};

/// Supplies the current instant. The default is the real system clock;
/// tests construct a filter with a fixed-instant implementation instead.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Reads the OS clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Used by tests exercising specific
/// points in a schedule.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_returns_constant_instant() {
        let instant = Utc.with_ymd_and_hms(2023, 3, 15, 19, 30, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now_utc(), instant);
        assert_eq!(clock.now_utc(), instant);
    }
}
