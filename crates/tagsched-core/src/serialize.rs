//! Renders a canonical [`Schedule`] back into the tag-value grammar the
//! parser accepts, so that `parse(to_canonical(parse(s))) == parse(s)`.

use std::collections::BTreeSet;

use crate::models::{Schedule, Toggle};

const DAY_LETTERS: [char; 7] = ['m', 't', 'w', 'h', 'f', 's', 'u'];

fn letter(day: u8) -> char {
    DAY_LETTERS[day as usize]
}

/// Render a set of weekday indices as a single grammar day token. Days
/// produced by the parser always form a contiguous (possibly wraparound)
/// arc, so this always finds a `day` or `day-day` token that reparses to
/// the same set.
fn day_token(days: &BTreeSet<u8>) -> String {
    if days.is_empty() {
        return String::new();
    }
    let n = days.len();
    let start = *days
        .iter()
        .find(|&&d| !days.contains(&((d + 6) % 7)))
        .unwrap_or_else(|| days.iter().next().unwrap());

    let mut seq = Vec::with_capacity(n);
    let mut cur = start;
    for _ in 0..n {
        seq.push(cur);
        cur = (cur + 1) % 7;
    }

    if seq.iter().copied().collect::<BTreeSet<_>>() == *days {
        if n == 1 {
            letter(start).to_string()
        } else {
            format!("{}-{}", letter(start), letter(seq[n - 1]))
        }
    } else {
        // Not a contiguous arc (cannot arise from the parser); fall back to
        // a best-effort rendering rather than losing days silently.
        days.iter().map(|d| letter(*d)).collect()
    }
}

fn group_token(toggle: &Toggle) -> String {
    if toggle.minute == 0 {
        format!("({},{})", day_token(&toggle.days), toggle.hour)
    } else {
        format!(
            "({},{},{})",
            day_token(&toggle.days),
            toggle.hour,
            toggle.minute
        )
    }
}

fn toggles_token(toggles: &[Toggle]) -> String {
    match toggles {
        [] => String::new(),
        [single] => group_token(single),
        many => format!(
            "[{}]",
            many.iter().map(group_token).collect::<Vec<_>>().join(",")
        ),
    }
}

/// Render `schedule` as a canonical grammar string.
pub fn to_canonical(schedule: &Schedule) -> String {
    let mut parts = Vec::new();
    if !schedule.on.is_empty() {
        parts.push(format!("on={}", toggles_token(&schedule.on)));
    }
    if !schedule.off.is_empty() {
        parts.push(format!("off={}", toggles_token(&schedule.off)));
    }
    if !schedule.tz.is_empty() {
        parts.push(format!("tz={}", schedule.tz));
    }
    parts.join(";")
}
