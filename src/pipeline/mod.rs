//! Ordered layer merging.
//!
//! The pipeline starts from the zero-value record and folds each layer that
//! its source reports as found, in the fixed priority order. A missing topic
//! layer unions the profile's fallback tags instead. Includes are expanded
//! recursively as each fragment is folded, and each include locator is
//! expanded at most once per run.

mod include;

pub use include::{IncludePrecedence, IncludeSet};

use crate::calendar::CalendarTokens;
use crate::decode::decode;
use crate::error::Diagnostic;
use crate::record::{FieldValue, Record};
use crate::resolve::{fold_fields, union_dedup};
use crate::schema::Profile;
use crate::source::{LayerKey, LayerKind, LayerSource};
use tracing::debug;

/// Maximum list length after the derivation pass.
pub const DEFAULT_MAX_LIST_LEN: usize = 10;

/// Tunables for one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub max_list_len: usize,
    pub include_precedence: IncludePrecedence,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_list_len: DEFAULT_MAX_LIST_LEN,
            include_precedence: IncludePrecedence::default(),
        }
    }
}

/// One layer to attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub key: LayerKey,
    /// The topic layer; its absence triggers the fallback tags.
    pub mandatory_topic: bool,
}

impl LayerSpec {
    pub fn new(key: LayerKey) -> Self {
        let mandatory_topic = matches!(key, LayerKey::Topic(_));
        Self {
            key,
            mandatory_topic,
        }
    }
}

/// Layers the profile reads for `topic_segment` on the day named by `tokens`,
/// in priority order.
pub fn plan_layers(profile: &Profile, topic_segment: &str, tokens: &CalendarTokens) -> Vec<LayerSpec> {
    let mut kinds = profile.layers.clone();
    kinds.sort();
    kinds.dedup();

    kinds
        .into_iter()
        .map(|kind| {
            let token: &str = match kind {
                LayerKind::Global => "",
                LayerKind::Topic => topic_segment,
                LayerKind::Weekday => &tokens.weekday,
                LayerKind::Date => &tokens.date,
                LayerKind::DateWithYear => &tokens.date_with_year,
                LayerKind::Month => &tokens.month,
                LayerKind::MonthWithYear => &tokens.month_with_year,
            };
            LayerSpec::new(LayerKey::for_kind(kind, token))
        })
        .collect()
}

/// Merged record before the derivation pass.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub record: Record,
    pub topic_found: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives the ordered merge for one profile and source.
pub struct LayerPipeline<'a> {
    profile: &'a Profile,
    source: &'a dyn LayerSource,
    settings: &'a Settings,
}

/// Mutable state scoped to a single `run`.
struct RunState {
    includes: IncludeSet,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> LayerPipeline<'a> {
    pub fn new(profile: &'a Profile, source: &'a dyn LayerSource, settings: &'a Settings) -> Self {
        Self {
            profile,
            source,
            settings,
        }
    }

    /// Fold `layers` in order into a fresh zero-value record.
    pub fn run(&self, layers: &[LayerSpec]) -> PipelineOutput {
        let mut state = RunState {
            includes: IncludeSet::new(),
            diagnostics: Vec::new(),
        };
        let mut acc = self.profile.schema.zero_record();
        let mut topic_found = false;

        debug!("Merging configs...");
        for layer in layers {
            let incoming = self.load(&layer.key, &mut state);

            if incoming.found {
                debug!(layer = %layer_label(&layer.key), "Merging layer");
                self.fold(&mut acc, &incoming, &mut state);
                if layer.mandatory_topic {
                    topic_found = true;
                }
            } else if layer.mandatory_topic {
                debug!("No topic config found, adding fallback tags");
                self.add_fallback_tags(&mut acc);
            }
        }

        acc.found = topic_found;
        PipelineOutput {
            record: acc,
            topic_found,
            diagnostics: state.diagnostics,
        }
    }

    /// Load and decode `key`, setting `found` from source presence.
    fn load(&self, key: &LayerKey, state: &mut RunState) -> Record {
        let locator = self.source.locate(key);
        match self.source.load(key) {
            Some(bytes) => {
                let decoded = decode(&self.profile.schema, &bytes, &locator);
                state.diagnostics.extend(decoded.diagnostics);
                let mut record = decoded.record;
                record.found = true;
                record
            }
            None => {
                debug!(layer = %locator, "No config found");
                state.diagnostics.push(Diagnostic::source_absent(&locator));
                self.profile.schema.zero_record()
            }
        }
    }

    /// Fold one found fragment, expanding its include on the configured side.
    fn fold(&self, acc: &mut Record, incoming: &Record, state: &mut RunState) {
        match self.settings.include_precedence {
            IncludePrecedence::Weakest => {
                self.expand_include(acc, incoming, state);
                fold_fields(acc, incoming);
            }
            IncludePrecedence::Strongest => {
                fold_fields(acc, incoming);
                self.expand_include(acc, incoming, state);
            }
        }
    }

    fn expand_include(&self, acc: &mut Record, incoming: &Record, state: &mut RunState) {
        let Some(name) = incoming.include() else {
            return;
        };
        let key = LayerKey::include(name);
        let locator = self.source.locate(&key);

        if !state.includes.claim(&locator) {
            debug!(include = %name, "Already seen include in another config");
            state.diagnostics.push(Diagnostic::include_seen(&locator));
            return;
        }

        let included = self.load(&key, state);
        if included.found {
            debug!(include = %name, "Included configs");
            self.fold(acc, &included, state);
        }
    }

    fn add_fallback_tags(&self, acc: &mut Record) {
        let Some(field) = self.profile.tag_field else {
            return;
        };
        let Some(i) = acc.schema().index_of(field) else {
            return;
        };
        if let FieldValue::List(tags) = acc.value_mut(i) {
            union_dedup(tags, &self.profile.fallback_tags);
        }
    }
}

fn layer_label(key: &LayerKey) -> String {
    match key {
        LayerKey::Global => "global".to_string(),
        LayerKey::Topic(t) => format!("topic {}", t),
        LayerKey::Weekday(t) => format!("day {}", t),
        LayerKey::Date(t) | LayerKey::DateWithYear(t) => format!("date {}", t),
        LayerKey::Month(t) | LayerKey::MonthWithYear(t) => format!("month {}", t),
        LayerKey::Include(t) => format!("include {}", t),
    }
}
