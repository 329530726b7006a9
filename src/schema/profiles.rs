//! Built-in profiles.
//!
//! A profile bundles a field table with the rules the derivation pass needs
//! and the layers it reads. `stream` resolves chat-bot stream settings from
//! global, per-game, and calendar layers. `model` resolves per-model redeem
//! toggles from a single file.

use super::{FieldKind, FieldPolicy, FieldSpec, Schema};
use crate::error::EngineError;
use crate::paths::{sanitize_segment, strip_extension};
use crate::source::{LayerKind, Layout};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of a built-in profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    #[default]
    Stream,
    Model,
}

impl std::str::FromStr for ProfileName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stream" => Ok(ProfileName::Stream),
            "model" => Ok(ProfileName::Model),
            other => Err(EngineError::UnknownProfile(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileName::Stream => write!(f, "stream"),
            ProfileName::Model => write!(f, "model"),
        }
    }
}

/// How the caller-supplied topic becomes a path segment and an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStyle {
    /// Path segment has reserved characters replaced; identity is the
    /// trimmed topic as given.
    ReplaceReserved,
    /// Path segment and identity are the file name without extension.
    StripExtension,
}

impl IdentityStyle {
    pub fn path_segment(&self, topic: &str) -> String {
        match self {
            IdentityStyle::ReplaceReserved => sanitize_segment(topic.trim()),
            IdentityStyle::StripExtension => strip_extension(topic.trim()).to_string(),
        }
    }

    pub fn identity(&self, topic: &str) -> String {
        match self {
            IdentityStyle::ReplaceReserved => topic.trim().to_string(),
            IdentityStyle::StripExtension => strip_extension(topic.trim()).to_string(),
        }
    }
}

/// One legal value of the mode field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSpec {
    pub name: &'static str,
    /// Tags unioned into the tag field while this mode is active.
    pub tags: &'static [&'static str],
    /// Toggles forced off while this mode is active.
    pub disables: &'static [&'static str],
}

/// Validation and derived edits for an enum-valued mode field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRules {
    pub field: &'static str,
    pub default_mode: &'static str,
    pub modes: Vec<ModeSpec>,
}

impl ModeRules {
    pub fn get(&self, name: &str) -> Option<&ModeSpec> {
        self.modes.iter().find(|m| m.name == name)
    }

    pub fn legal_names(&self) -> Vec<&'static str> {
        self.modes.iter().map(|m| m.name).collect()
    }
}

/// Schema plus everything the pipeline and derivation pass need.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: ProfileName,
    pub schema: Arc<Schema>,
    /// Layer kinds attempted, in priority order.
    pub layers: Vec<LayerKind>,
    pub layout: Layout,
    pub identity_style: IdentityStyle,
    /// List field that receives fallback and mode tags.
    pub tag_field: Option<&'static str>,
    /// Control flag set to whether the topic layer was found.
    pub found_field: Option<&'static str>,
    /// Control text set to the caller-supplied identity.
    pub identity_field: Option<&'static str>,
    /// Tags unioned in when the topic layer is absent.
    pub fallback_tags: Vec<String>,
    pub mode: Option<ModeRules>,
    /// Toggles forced off when the caller reports being on call.
    pub on_call_disables: Vec<&'static str>,
    /// Force every toggle off when the topic layer is absent.
    pub disable_all_when_missing: bool,
}

impl Profile {
    pub fn builtin(name: ProfileName) -> Result<Self, EngineError> {
        match name {
            ProfileName::Stream => Self::stream(),
            ProfileName::Model => Self::model(),
        }
    }

    /// Stream settings: tags, title suffix, chat toggles, and a mode switch.
    pub fn stream() -> Result<Self, EngineError> {
        let schema = Schema::new(
            "stream",
            vec![
                FieldSpec::new("include", FieldPolicy::Include),
                FieldSpec::new("streamtags", FieldPolicy::Union),
                FieldSpec::new("titlesuffix", FieldPolicy::Concatenate { separator: " | " }),
                FieldSpec::new("sign", FieldPolicy::SentinelStr { sentinel: "default" }),
                FieldSpec::new("mode", FieldPolicy::LastNonEmpty),
                FieldSpec::new("cooldownseconds", FieldPolicy::MaxWins { default: 0 }),
                FieldSpec::new("maxqueue", FieldPolicy::MinWins { default: 25 }),
                FieldSpec::new("raidminimum", FieldPolicy::NonzeroOverrides),
                FieldSpec::new("redeemcost", FieldPolicy::SentinelInt { sentinel: -1 }),
                FieldSpec::new("mature", FieldPolicy::Toggle { default: false }),
                FieldSpec::new("subonly", FieldPolicy::Toggle { default: false }),
                FieldSpec::new("emoteonly", FieldPolicy::Toggle { default: false }),
                FieldSpec::new("chaos", FieldPolicy::Toggle { default: true }),
                FieldSpec::new("tts", FieldPolicy::Toggle { default: true }),
                FieldSpec::new("soundalerts", FieldPolicy::Toggle { default: true }),
                FieldSpec::new("clips", FieldPolicy::Toggle { default: true }),
                FieldSpec::new("gamefound", FieldPolicy::ControlFlag),
                FieldSpec::new("gamename", FieldPolicy::ControlText),
            ],
        )?;

        let mode = ModeRules {
            field: "mode",
            default_mode: "standard",
            modes: vec![
                ModeSpec {
                    name: "standard",
                    tags: &["English"],
                    disables: &[],
                },
                ModeSpec {
                    name: "chill",
                    tags: &["Chill", "Cozy"],
                    disables: &["chaos"],
                },
                ModeSpec {
                    name: "speedrun",
                    tags: &["Speedrun"],
                    disables: &["chaos", "tts", "soundalerts"],
                },
                ModeSpec {
                    name: "charity",
                    tags: &["Charity"],
                    disables: &[],
                },
            ],
        };

        Self {
            name: ProfileName::Stream,
            schema: Arc::new(schema),
            layers: LayerKind::ALL.to_vec(),
            layout: Layout::default(),
            identity_style: IdentityStyle::ReplaceReserved,
            tag_field: Some("streamtags"),
            found_field: Some("gamefound"),
            identity_field: Some("gamename"),
            fallback_tags: vec!["English".to_string(), "Variety".to_string()],
            mode: Some(mode),
            on_call_disables: vec!["chaos", "tts", "soundalerts"],
            disable_all_when_missing: false,
        }
        .validated()
    }

    /// Model redeems: every redeem is enabled unless some layer turns it off.
    pub fn model() -> Result<Self, EngineError> {
        const REDEEMS: [&str; 22] = [
            "anvildrop",
            "asciired",
            "bonk",
            "boop",
            "chaos",
            "feets",
            "fisheye",
            "headpats",
            "noglasses",
            "nuggiesforred",
            "peltthepanda",
            "piedrop",
            "postitred",
            "redinabox",
            "rentthishat",
            "spinthepanda",
            "spraybottle",
            "suspiciousred",
            "swolepanda",
            "tail",
            "timewarpscan",
            "toughlove",
        ];

        let mut fields = vec![
            FieldSpec::new("include", FieldPolicy::Include),
            FieldSpec::new("configfound", FieldPolicy::ControlFlag),
            FieldSpec::new("modelfilename", FieldPolicy::ControlText),
            FieldSpec::new("software", FieldPolicy::LastNonEmpty),
        ];
        fields.extend(
            REDEEMS
                .iter()
                .map(|&name| FieldSpec::new(name, FieldPolicy::Toggle { default: true })),
        );

        Self {
            name: ProfileName::Model,
            schema: Arc::new(Schema::new("model", fields)?),
            layers: vec![LayerKind::Topic],
            layout: Layout::flat_topics(),
            identity_style: IdentityStyle::StripExtension,
            tag_field: None,
            found_field: Some("configfound"),
            identity_field: Some("modelfilename"),
            fallback_tags: Vec::new(),
            mode: None,
            on_call_disables: Vec::new(),
            disable_all_when_missing: true,
        }
        .validated()
    }

    /// Check every field named by a rule exists with the right kind.
    pub fn validated(self) -> Result<Self, EngineError> {
        let schema = &self.schema;

        if let Some(field) = self.tag_field {
            schema.require(field, FieldKind::List)?;
        }
        if let Some(field) = self.found_field {
            schema.require(field, FieldKind::Bool)?;
        }
        if let Some(field) = self.identity_field {
            schema.require(field, FieldKind::Str)?;
        }
        for field in &self.on_call_disables {
            schema.require(field, FieldKind::Bool)?;
        }
        if let Some(ref mode) = self.mode {
            schema.require(mode.field, FieldKind::Str)?;
            if mode.get(mode.default_mode).is_none() {
                return Err(EngineError::UnknownDefaultMode(mode.default_mode.to_string()));
            }
            for spec in &mode.modes {
                for field in spec.disables {
                    schema.require(field, FieldKind::Bool)?;
                }
                if !spec.tags.is_empty() && self.tag_field.is_none() {
                    return Err(EngineError::MissingTagField(spec.name.to_string()));
                }
            }
        }

        Ok(self)
    }

    /// Names of every toggle field, in schema order.
    pub fn toggles(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schema
            .fields()
            .iter()
            .filter(|f| matches!(f.policy, FieldPolicy::Toggle { .. }))
            .map(|f| f.name)
    }
}
