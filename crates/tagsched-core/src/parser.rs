//! Parses tag-value strings into canonical [`Schedule`]s.
//!
//! Grammar:
//!
//! ```text
//! schedule := part (';' part)*
//! part     := key '=' value
//! key      := 'on' | 'off' | 'tz'
//! value (on/off) := group | '[' group (',' group)* ']'
//! group    := '(' days (',' hour (',' minute)?)? ')'
//! days     := day | day '-' day
//! day      := one of {m,t,w,h,f,s,u}   // Monday..Sunday
//! value (tz) := zone-key-string
//! ```
//!
//! Trailing/interior empty `;` segments are stripped before parsing; the
//! whole input is expected already lowercased by the caller (per the
//! ASCII-folding policy — tag keys and grammar tokens are ASCII by
//! construction).

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::models::{Schedule, Toggle, WeekdayIndex};

/// Single-letter day tokens, Monday..Sunday, matching §4.A's weekday
/// numbering (Monday=0).
const DAY_LETTERS: [char; 7] = ['m', 't', 'w', 'h', 'f', 's', 'u'];

fn day_index(c: char) -> Option<WeekdayIndex> {
    DAY_LETTERS.iter().position(|&d| d == c).map(|i| i as u8)
}

/// Expand a day token (`"m"`) or day range (`"m-f"`, `"f-m"`) into the set
/// of weekday indices it denotes. Wraps around the week when the end comes
/// before the start.
pub fn expand_day_range(token: &str) -> Option<Vec<WeekdayIndex>> {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next(), chars.next()) {
        (Some(d), None, None, None) => day_index(d).map(|i| vec![i]),
        (Some(a), Some('-'), Some(b), None) => {
            let start = day_index(a)?;
            let end = day_index(b)?;
            let mut days = Vec::new();
            let mut cur = start;
            loop {
                days.push(cur);
                if cur == end {
                    break;
                }
                cur = (cur + 1) % 7;
            }
            Some(days)
        }
        _ => None,
    }
}

/// Split the raw tag value into a `key -> value` map, ignoring pieces that
/// are not `key=value`. Used to peek at keys without a full parse.
pub fn raw_data(s: &str) -> HashMap<String, String> {
    s.split_whitespace()
        .flat_map(|chunk| chunk.split(';'))
        .filter_map(|piece| {
            let (k, v) = piece.split_once('=')?;
            if k.is_empty() {
                None
            } else {
                Some((k.to_string(), v.to_string()))
            }
        })
        .collect()
}

/// Every key present must be `on`, `off`, or `tz`. Vacuously true for no
/// keys at all (an absent tag still needs to pass this check on its way
/// to the default schedule).
pub fn keys_are_valid(s: &str) -> bool {
    raw_data(s).keys().all(|k| matches!(k.as_str(), "on" | "off" | "tz"))
}

/// Whether `time_type`'s key (`"on"` or `"off"`) is present in the raw data.
pub fn has_resource_schedule(s: &str, time_type_key: &str) -> bool {
    raw_data(s).contains_key(time_type_key)
}

/// Strip `[`/`]` and split a value into its comma-separated parenthesized
/// groups, e.g. `"[(m-f,21),(u,18,30)]"` -> `["(m-f,21)", "(u,18,30)"]`.
fn split_groups(value: &str) -> Vec<String> {
    let stripped: String = value.chars().filter(|c| *c != '[' && *c != ']').collect();
    let mut groups = Vec::new();
    let mut depth = 0;
    let mut current = String::new();
    for c in stripped.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
                if depth == 0 {
                    groups.push(std::mem::take(&mut current));
                }
            }
            ',' if depth == 0 => {}
            _ => current.push(c),
        }
    }
    groups
}

fn parse_group(group: &str) -> Option<Toggle> {
    let inner = group.strip_prefix('(')?.strip_suffix(')')?;
    let fields: Vec<&str> = inner.split(',').collect();
    // A group must have 2 or 3 comma-separated fields (days,hour[,minute]);
    // fewer or more is rejected even though the grammar's own notation
    // marks hour as optional.
    if fields.len() < 2 || fields.len() > 3 {
        return None;
    }

    let days_field = fields[0];
    let mut days: BTreeSet<WeekdayIndex> = BTreeSet::new();
    if days_field.is_empty() {
        return None;
    }
    days.extend(expand_day_range(days_field)?);

    let hour: u8 = fields[1].parse().ok()?;
    let minute: u8 = match fields.get(2) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if hour > 23 || minute > 59 {
        return None;
    }

    Some(Toggle {
        days,
        hour,
        minute,
    })
}

fn parse_toggle_value(value: &str) -> Option<Vec<Toggle>> {
    let groups = split_groups(value);
    if groups.is_empty() {
        return None;
    }
    groups.iter().map(|g| parse_group(g)).collect()
}

/// Parses schedule tag values, caching results (including parse failures)
/// by input string. Entries never expire: tag values are short, repetitive
/// strings drawn from a resource's live tag set.
pub struct ScheduleParser {
    cache: RefCell<HashMap<String, Option<Schedule>>>,
}

impl Default for ScheduleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleParser {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Parse `s` into a canonical [`Schedule`], filling `tz` from
    /// `default_tz` when absent or empty. Returns `None` on any grammar
    /// violation. Results (including failures) are cached by `s`.
    pub fn parse(&self, s: &str, default_tz: &str) -> Option<Schedule> {
        if let Some(cached) = self.cache.borrow().get(s) {
            tracing::debug!(input = s, "schedule parser cache hit");
            return cached.clone();
        }

        let result = self.parse_uncached(s, default_tz);
        tracing::debug!(input = s, hit = false, "schedule parser cache miss");
        self.cache.borrow_mut().insert(s.to_string(), result.clone());
        result
    }

    fn parse_uncached(&self, s: &str, default_tz: &str) -> Option<Schedule> {
        if !keys_are_valid(s) {
            return None;
        }

        let mut on = Vec::new();
        let mut off = Vec::new();
        let mut tz = String::new();

        for (key, value) in raw_data(s) {
            match key.as_str() {
                "on" => on = parse_toggle_value(&value)?,
                "off" => off = parse_toggle_value(&value)?,
                "tz" => tz = value,
                _ => return None,
            }
        }

        if tz.is_empty() {
            tz = default_tz.to_string();
        }

        Some(Schedule { on, off, tz })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_simple_range() {
        assert_eq!(expand_day_range("m-f"), Some(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn expand_wraparound_range() {
        assert_eq!(expand_day_range("f-m"), Some(vec![4, 5, 6, 0]));
    }

    #[test]
    fn expand_single_day() {
        assert_eq!(expand_day_range("u"), Some(vec![6]));
    }

    #[test]
    fn expand_rejects_unknown_letter() {
        assert_eq!(expand_day_range("x"), None);
    }

    #[test]
    fn raw_data_drops_malformed_pieces() {
        let data = raw_data("on=(m-f,7);off=(m-f,19);tz=pt");
        assert_eq!(data.get("on").unwrap(), "(m-f,7)");
        assert_eq!(data.get("off").unwrap(), "(m-f,19)");
        assert_eq!(data.get("tz").unwrap(), "pt");
    }

    #[test]
    fn keys_are_valid_rejects_unknown_key() {
        assert!(!keys_are_valid("bogus=(m-f,7)"));
        assert!(keys_are_valid("on=(m-f,7);off=(m-f,19);tz=pt"));
    }

    #[test]
    fn has_resource_schedule_checks_presence() {
        assert!(has_resource_schedule("on=(m-f,7)", "on"));
        assert!(!has_resource_schedule("off=(m-f,19)", "on"));
    }

    #[test]
    fn parse_basic_schedule() {
        let parser = ScheduleParser::new();
        let schedule = parser
            .parse("on=(m-f,7);off=(m-f,19);tz=pt", "et")
            .unwrap();
        assert_eq!(schedule.on.len(), 1);
        assert_eq!(schedule.off.len(), 1);
        assert_eq!(schedule.tz, "pt");
        assert_eq!(schedule.on[0].days, BTreeSet::from([0, 1, 2, 3, 4]));
        assert_eq!(schedule.on[0].hour, 7);
    }

    #[test]
    fn parse_fills_default_tz_when_absent() {
        let parser = ScheduleParser::new();
        let schedule = parser.parse("on=(m-f,7);off=(m-f,19)", "et").unwrap();
        assert_eq!(schedule.tz, "et");
    }

    #[test]
    fn parse_bracketed_list_of_groups() {
        let parser = ScheduleParser::new();
        let schedule = parser
            .parse("off=[(m-f,21),(u,18,30)];on=[(m-f,6,30),(u,10)];tz=pt", "et")
            .unwrap();
        assert_eq!(schedule.off.len(), 2);
        assert_eq!(schedule.off[1].days, BTreeSet::from([6]));
        assert_eq!(schedule.off[1].hour, 18);
        assert_eq!(schedule.off[1].minute, 30);
    }

    #[test]
    fn parse_rejects_out_of_range_hour() {
        let parser = ScheduleParser::new();
        assert!(parser.parse("on=(m-f,24)", "et").is_none());
    }

    #[test]
    fn parse_rejects_group_with_too_many_fields() {
        let parser = ScheduleParser::new();
        assert!(parser.parse("on=(m-f,7,0,0)", "et").is_none());
    }

    #[test]
    fn parse_rejects_group_with_too_few_fields() {
        let parser = ScheduleParser::new();
        assert!(parser.parse("on=(m-f)", "et").is_none());
    }

    #[test]
    fn parse_rejects_empty_day_list() {
        let parser = ScheduleParser::new();
        assert!(parser.parse("on=(,7)", "et").is_none());
    }

    #[test]
    fn parse_caches_negative_results() {
        let parser = ScheduleParser::new();
        assert!(parser.parse("garbage", "et").is_none());
        assert!(parser.parse("garbage", "et").is_none());
        assert_eq!(parser.cache.borrow().len(), 1);
    }

    #[test]
    fn parse_idempotent_round_trip_via_equivalent_grammar() {
        let parser = ScheduleParser::new();
        let schedule = parser.parse("on=(m-f,7);off=(m-f,19);tz=pt", "et").unwrap();
        let rendered = crate::serialize::to_canonical(&schedule);
        let reparsed = parser.parse(&rendered, "et").unwrap();
        assert_eq!(schedule, reparsed);
    }
}
