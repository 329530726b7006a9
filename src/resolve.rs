//! Per-field conflict resolution.
//!
//! `resolve` combines one field's existing and incoming values according to
//! its declared policy. `fold_fields` applies it across a whole record. Both
//! are pure apart from mutating the accumulator; include references and
//! control fields are left for the pipeline.

use crate::record::{FieldValue, Record};
use crate::schema::FieldPolicy;
use std::sync::Arc;

/// Normalize a list entry for comparison and storage: all whitespace removed.
pub fn normalize_entry(entry: &str) -> String {
    entry.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Append `incoming` to `existing`, skipping entries whose normalized form is
/// already present. Entries are stored normalized; empty ones are dropped.
pub fn union_dedup(existing: &mut Vec<String>, incoming: &[String]) {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + incoming.len());
    for entry in existing.iter().chain(incoming.iter()) {
        let normalized = normalize_entry(entry);
        if !normalized.is_empty() && !merged.contains(&normalized) {
            merged.push(normalized);
        }
    }
    *existing = merged;
}

/// Combine `incoming` into `existing` for a field with `policy`.
///
/// Mismatched kinds leave `existing` untouched; records built from the same
/// schema never produce them.
pub fn resolve(policy: &FieldPolicy, existing: &mut FieldValue, incoming: &FieldValue) {
    match (policy, existing, incoming) {
        (FieldPolicy::Toggle { default }, FieldValue::Bool(e), FieldValue::Bool(i)) => {
            *e = if *default { *e && *i } else { *e || *i };
        }
        (FieldPolicy::MinWins { default }, FieldValue::Int(e), FieldValue::Int(i)) => {
            if i != default {
                *e = (*e).min(*i);
            }
        }
        (FieldPolicy::MaxWins { default }, FieldValue::Int(e), FieldValue::Int(i)) => {
            if i != default {
                *e = (*e).max(*i);
            }
        }
        (FieldPolicy::NonzeroOverrides, FieldValue::Int(e), FieldValue::Int(i)) => {
            if *i != 0 {
                *e = *i;
            }
        }
        (FieldPolicy::SentinelInt { sentinel }, FieldValue::Int(e), FieldValue::Int(i)) => {
            if i != sentinel {
                *e = *i;
            }
        }
        (FieldPolicy::LastNonEmpty, FieldValue::Str(e), FieldValue::Str(i)) => {
            if !i.is_empty() {
                e.clone_from(i);
            }
        }
        (FieldPolicy::Concatenate { separator }, FieldValue::Str(e), FieldValue::Str(i)) => {
            if i.is_empty() {
                return;
            }
            if e.is_empty() {
                e.clone_from(i);
            } else {
                e.push_str(separator);
                e.push_str(i);
            }
        }
        (FieldPolicy::SentinelStr { sentinel }, FieldValue::Str(e), FieldValue::Str(i)) => {
            if i.as_str() != *sentinel {
                e.clone_from(i);
            }
        }
        (FieldPolicy::Union, FieldValue::List(e), FieldValue::List(i)) => {
            union_dedup(e, i);
        }
        // Include and control fields are owned by the pipeline
        _ => {}
    }
}

/// Fold every ordinary field of `incoming` into `acc`.
pub fn fold_fields(acc: &mut Record, incoming: &Record) {
    let schema = Arc::clone(acc.schema());
    for (i, spec) in schema.fields().iter().enumerate() {
        if matches!(spec.policy, FieldPolicy::Include) || spec.policy.is_control() {
            continue;
        }
        resolve(&spec.policy, acc.value_mut(i), incoming.value(i));
    }
}
