//! One full resolution: plan layers, merge them, run the derivation pass.

use crate::calendar::CalendarTokens;
use crate::error::{Diagnostic, EngineError};
use crate::finalize::{FinalizeContext, finalize};
use crate::pipeline::{LayerPipeline, Settings, plan_layers};
use crate::record::Record;
use crate::schema::Profile;
use crate::source::LayerSource;
use tracing::{debug, info};

/// Caller input for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Free-text topic (game name, model file name).
    pub topic: String,
    pub calendar: CalendarTokens,
    pub on_call: bool,
    pub mode: Option<String>,
}

impl ResolveRequest {
    pub fn new(topic: impl Into<String>, calendar: CalendarTokens) -> Self {
        Self {
            topic: topic.into(),
            calendar,
            on_call: false,
            mode: None,
        }
    }

    pub fn on_call(mut self, on_call: bool) -> Self {
        self.on_call = on_call;
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

/// Final record plus everything worked around along the way.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub record: Record,
    pub topic_found: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Profile and settings shared by any number of independent runs.
#[derive(Debug, Clone)]
pub struct Engine {
    profile: Profile,
    settings: Settings,
}

impl Engine {
    pub fn new(profile: Profile, settings: Settings) -> Self {
        Self { profile, settings }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve `request` against `source`. Each call starts with a fresh
    /// include set, so runs never share state.
    pub fn resolve(&self, source: &dyn LayerSource, request: &ResolveRequest) -> Result<Resolved, EngineError> {
        let topic = request.topic.trim();
        if topic.is_empty() {
            return Err(EngineError::MissingTopic);
        }

        let style = self.profile.identity_style;
        let segment = style.path_segment(topic);
        info!(profile = %self.profile.name, topic = %topic, "Processing topic");
        debug!(weekday = %request.calendar.weekday, date = %request.calendar.date, "Calendar");

        let layers = plan_layers(&self.profile, &segment, &request.calendar);
        let merged = LayerPipeline::new(&self.profile, source, &self.settings).run(&layers);

        let ctx = FinalizeContext {
            identity: style.identity(topic),
            topic_found: merged.topic_found,
            on_call: request.on_call,
            mode_override: request.mode.clone(),
        };
        let finalized = finalize(merged.record, &self.profile, &self.settings, &ctx);

        let mut diagnostics = merged.diagnostics;
        diagnostics.extend(finalized.diagnostics);

        Ok(Resolved {
            record: finalized.record,
            topic_found: merged.topic_found,
            diagnostics,
        })
    }
}
