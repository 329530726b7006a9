//! Override and derivation pass.
//!
//! Runs once after every layer has been folded. Each step is a total
//! function of the merged record, the profile, and the caller context:
//!
//! 1. Clear the include reference.
//! 2. Validate the mode field. Unset means the default mode; illegal values
//!    are reset to it.
//! 3. Apply the active mode's tags and forced-off toggles.
//! 4. Cap every list field at the maximum length.
//! 5. Apply caller overrides (on call) and the missing-topic rule.
//! 6. Set identity and found control fields from caller input.

use crate::error::Diagnostic;
use crate::pipeline::Settings;
use crate::record::{FieldValue, Record};
use crate::resolve::union_dedup;
use crate::schema::{FieldKind, Profile};
use std::sync::Arc;
use tracing::{debug, warn};

/// Inputs supplied by the host program, never read from layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeContext {
    /// Identity derived from the caller's topic argument.
    pub identity: String,
    /// Whether the topic layer was found.
    pub topic_found: bool,
    /// Forces the profile's on-call toggles off.
    pub on_call: bool,
    /// Mode selected by the caller, replacing whatever the layers chose.
    pub mode_override: Option<String>,
}

/// Record ready for output plus what the pass corrected.
#[derive(Debug, Clone)]
pub struct Finalized {
    pub record: Record,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn finalize(mut record: Record, profile: &Profile, settings: &Settings, ctx: &FinalizeContext) -> Finalized {
    let mut diagnostics = Vec::new();

    // 1. Internal only
    record.clear_include();

    // 2-3. Mode
    if let Some(ref rules) = profile.mode {
        if let Some(mode) = ctx.mode_override.as_deref().filter(|m| !m.trim().is_empty()) {
            record.set(rules.field, FieldValue::Str(mode.to_string()));
        }

        let current = record.get_str(rules.field).unwrap_or_default();
        let normalized = current.trim().to_lowercase();
        let lookup = if normalized.is_empty() {
            // No layer chose a mode
            rules.get(rules.default_mode)
        } else {
            rules.get(&normalized)
        };
        let active = match lookup {
            Some(spec) => spec,
            None => {
                let d = Diagnostic::invalid_enum(rules.field, current, rules.default_mode);
                warn!(field = rules.field, valid = ?rules.legal_names(), "{}", d);
                diagnostics.push(d);
                // Validated profiles always carry their default mode
                rules.get(rules.default_mode).unwrap_or(&rules.modes[0])
            }
        };
        record.set(rules.field, FieldValue::Str(active.name.to_string()));

        if let Some(tag_field) = profile.tag_field {
            add_tags(&mut record, tag_field, active.tags);
        }
        force_off(&mut record, active.disables.iter().copied());
        debug!(mode = active.name, "Applied mode");
    }

    // 4. Cap lists
    let schema = Arc::clone(record.schema());
    for (index, spec) in schema.fields().iter().enumerate() {
        if spec.kind() != FieldKind::List {
            continue;
        }
        if let FieldValue::List(items) = record.value_mut(index) {
            debug!(field = spec.name, count = items.len(), "Counted entries");
            if items.len() > settings.max_list_len {
                let d = Diagnostic::count_capped(spec.name, items.len(), settings.max_list_len);
                warn!("{}. Please clean some of them up!", d);
                diagnostics.push(d);
                items.truncate(settings.max_list_len);
            }
        }
    }

    // 5. Caller overrides
    if ctx.on_call {
        debug!("On call, disabling interruptions");
        force_off(&mut record, profile.on_call_disables.iter().copied());
    }
    if profile.disable_all_when_missing && !ctx.topic_found {
        debug!("No config found, disabling every toggle");
        force_off(&mut record, profile.toggles());
    }

    // 6. Read-only identity
    if let Some(field) = profile.identity_field {
        record.set(field, FieldValue::Str(ctx.identity.clone()));
    }
    if let Some(field) = profile.found_field {
        record.set(field, FieldValue::Bool(ctx.topic_found));
    }
    record.found = ctx.topic_found;

    Finalized {
        record,
        diagnostics,
    }
}

fn add_tags(record: &mut Record, field: &str, tags: &[&str]) {
    if tags.is_empty() {
        return;
    }
    let Some(index) = record.schema().index_of(field) else {
        return;
    };
    if let FieldValue::List(existing) = record.value_mut(index) {
        let incoming: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        union_dedup(existing, &incoming);
    }
}

fn force_off<'a>(record: &mut Record, fields: impl IntoIterator<Item = &'a str>) {
    for field in fields {
        record.set(field, FieldValue::Bool(false));
    }
}
