//! Timezone alias resolution.
//!
//! Resolution goes through IANA zone names (via [`chrono_tz`]) rather than
//! fixed UTC offsets, so daylight-savings transitions are handled correctly
//! by the surrounding time arithmetic.

use chrono_tz::Tz;

use crate::error::{Result, SchedulerError};

/// Alias table, authoritative over the raw IANA key for the short forms
/// resources tend to carry in tags.
const ALIASES: &[(&str, &str)] = &[
    ("pdt", "America/Los_Angeles"),
    ("pt", "America/Los_Angeles"),
    ("pst", "America/Los_Angeles"),
    ("est", "America/New_York"),
    ("edt", "America/New_York"),
    ("et", "America/New_York"),
    ("cst", "America/Chicago"),
    ("cdt", "America/Chicago"),
    ("ct", "America/Chicago"),
    ("mt", "America/Denver"),
    ("gmt", "Etc/GMT"),
    ("gt", "Etc/GMT"),
    ("bst", "Europe/London"),
    ("ist", "Europe/Dublin"),
    ("cet", "Europe/Berlin"),
    ("it", "Asia/Kolkata"),
    ("jst", "Asia/Tokyo"),
    ("kst", "Asia/Seoul"),
    ("sgt", "Asia/Singapore"),
    ("aet", "Australia/Sydney"),
    ("brt", "America/Sao_Paulo"),
];

/// Resolve a timezone alias or IANA zone name into a concrete [`Tz`].
///
/// The alias table is consulted first (case-insensitively); anything not
/// found there is tried as a literal IANA zone name (`"Europe/Berlin"`,
/// `"UTC"`, ...).
pub fn resolve(key: &str) -> Result<Tz> {
    let lowered = key.to_ascii_lowercase();
    if let Some((_, zone)) = ALIASES.iter().find(|(alias, _)| *alias == lowered) {
        return zone
            .parse::<Tz>()
            .map_err(|_| SchedulerError::InvalidTimezone(key.to_string()));
    }
    key.parse::<Tz>()
        .map_err(|_| SchedulerError::InvalidTimezone(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_alias() {
        assert_eq!(resolve("pt").unwrap(), chrono_tz::America::Los_Angeles);
        assert_eq!(resolve("PT").unwrap(), chrono_tz::America::Los_Angeles);
        assert_eq!(resolve("et").unwrap(), chrono_tz::America::New_York);
        assert_eq!(resolve("gmt").unwrap(), chrono_tz::Etc::GMT);
    }

    #[test]
    fn resolves_iana_name_directly() {
        assert_eq!(resolve("Europe/Berlin").unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn rejects_unknown_zone() {
        let err = resolve("not_a_zone").unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidTimezone(_)));
    }

    #[test]
    fn all_documented_aliases_resolve() {
        for (alias, _) in ALIASES {
            assert!(resolve(alias).is_ok(), "alias {alias} failed to resolve");
        }
    }
}
