//! The dynamic resource shape the surrounding framework hands the filter.
//!
//! A resource is modeled the same way the framework represents it: an
//! untyped JSON-like mapping with at least a `Tags` list and an id field
//! whose name is discovered per resource type (default `InstanceId`).

use serde_json::{Map, Value};

pub type Resource = Map<String, Value>;

pub const DEFAULT_ID_FIELD: &str = "InstanceId";

/// Read `tag_key` from `resource.Tags` (case-insensitive key match),
/// normalizing the found value: trim, strip one layer of surrounding
/// quotes, lowercase.
pub fn tag_value(resource: &Resource, tag_key: &str) -> Option<String> {
    let tags = resource.get("Tags")?.as_array()?;
    for tag in tags {
        let key = tag.get("Key").and_then(Value::as_str)?;
        if key.eq_ignore_ascii_case(tag_key) {
            let value = tag.get("Value").and_then(Value::as_str)?;
            return Some(normalize_tag_value(value));
        }
    }
    None
}

fn strip_quotes(s: &str) -> &str {
    for q in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Trim, strip one layer of quotes, lowercase: applied to every tag value
/// before it reaches the parser.
pub fn normalize_tag_value(value: &str) -> String {
    strip_quotes(value.trim()).to_ascii_lowercase()
}

/// Resolve the id field configured for this resource's type, falling back
/// to the empty string if it's absent or not a string (never panics: id
/// extraction must not crash the framework's traversal).
pub fn resource_id(resource: &Resource, id_field: &str) -> String {
    resource
        .get(id_field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
