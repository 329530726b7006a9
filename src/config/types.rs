//! Settings for the resolver itself (not the fragments it merges).

use crate::error::EngineError;
use crate::pipeline::{DEFAULT_MAX_LIST_LEN, IncludePrecedence, Settings};
use crate::schema::{Profile, ProfileName};
use crate::source::{LayerKind, Layout};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Where fragments live and how they merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Root folder where fragments are found.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Built-in profile to resolve.
    #[serde(default)]
    pub profile: ProfileName,

    /// Maximum entries kept in each list field.
    #[serde(default = "default_max_list_len")]
    pub max_list_len: usize,

    /// Whether includes lose or win against the including fragment.
    #[serde(default)]
    pub include_precedence: IncludePrecedence,

    /// Restrict the layers read (default: all the profile supports).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerKind>>,

    /// Replace the profile's fallback tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_tags: Option<Vec<String>>,

    /// Replace the profile's directory layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            profile: ProfileName::default(),
            max_list_len: default_max_list_len(),
            include_precedence: IncludePrecedence::default(),
            layers: None,
            fallback_tags: None,
            layout: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_list_len() -> usize {
    DEFAULT_MAX_LIST_LEN
}

impl EngineConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            max_list_len: self.max_list_len,
            include_precedence: self.include_precedence,
        }
    }

    /// The selected built-in profile with configured overrides applied.
    ///
    /// Layer restrictions only narrow what the profile supports.
    pub fn profile(&self) -> Result<Profile, EngineError> {
        let mut profile = Profile::builtin(self.profile)?;

        if let Some(ref layers) = self.layers {
            profile.layers.retain(|kind| layers.contains(kind));
        }
        if let Some(ref tags) = self.fallback_tags {
            profile.fallback_tags = tags.clone();
        }
        if let Some(ref layout) = self.layout {
            profile.layout = layout.clone();
        }

        profile.validated()
    }
}

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write the resolved record to `path` as well as stdout.
    #[serde(default = "default_write_file")]
    pub write_file: bool,

    /// Output file for the resolved record.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Output file for the generated schema.
    #[serde(default = "default_schema_path")]
    pub schema_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_file: default_write_file(),
            path: default_output_path(),
            schema_path: default_schema_path(),
        }
    }
}

fn default_write_file() -> bool {
    true
}

fn default_output_path() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("schema.json")
}

impl Config {
    /// Load settings from a single YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }
}
