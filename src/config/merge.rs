//! Tier merging for settings files.
//!
//! Each tier (defaults, project, user) is read as a JSON value and laid over
//! the one below it. Sections such as `engine` and `output` merge key by key;
//! lists and scalars from the higher tier replace the lower one. A key that is
//! `null` (an empty `engine:` section in YAML, say) leaves the lower tier alone.

use serde_json::Value;

/// Lay `overlay` over `base` and return the result.
///
/// # Example
/// ```
/// use serde_json::json;
/// use stream_config::config::deep_merge;
///
/// let base = json!({"engine": {"root": ".", "max_list_len": 10}});
/// let overlay = json!({"engine": {"max_list_len": 5}});
/// assert_eq!(
///     deep_merge(base, overlay),
///     json!({"engine": {"root": ".", "max_list_len": 5}})
/// );
/// ```
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    merge_into(&mut base, overlay);
    base
}

/// Merge tiers lowest first.
pub fn deep_merge_all(tiers: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Null;
    for tier in tiers {
        merge_into(&mut merged, tier);
    }
    merged
}

fn merge_into(target: &mut Value, overlay: Value) {
    match (target, overlay) {
        (_, Value::Null) => {}
        (Value::Object(section), Value::Object(entries)) => {
            for (key, value) in entries {
                match section.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None if value.is_null() => {}
                    None => {
                        section.insert(key, value);
                    }
                }
            }
        }
        (target, overlay) => *target = overlay,
    }
}
