//! Settings loader with tier-based merging.
//!
//! Loads settings from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the settings file in each tier directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Settings tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level settings ($CWD/stream-config/)
    Project = 1,
    /// User-level settings (~/.stream-config/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each settings tier.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit settings file; bypasses the tiers when set
    pub explicit: Option<PathBuf>,
    /// Project-level settings directory
    pub project_dir: Option<PathBuf>,
    /// User-level settings directory
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover settings paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: STREAM_CONFIG_USER_DIR or ~/.stream-config
        let user_dir = std::env::var("STREAM_CONFIG_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".stream-config")));

        // Project dir: STREAM_CONFIG_PROJECT_DIR or $CWD/stream-config
        let project_dir = std::env::var("STREAM_CONFIG_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("stream-config")));

        let explicit = std::env::var("STREAM_CONFIG_PATH").ok().map(PathBuf::from);

        Self {
            explicit,
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            project_dir,
            user_dir,
        }
    }

    /// Use a single settings file instead of the tiers.
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }
}

/// Settings loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded settings
    config: Config,
    /// Highest-priority settings file that was used (if any)
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load settings with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        // An explicit file overrides the tiers
        if let Some(ref explicit) = paths.explicit {
            let mut config = Config::load(explicit)?;
            Self::apply_env_overrides(&mut config);
            return Ok(Self {
                config_path: Some(explicit.clone()),
                paths,
                config,
            });
        }

        let mut configs: Vec<Value> = Vec::new();
        let mut config_path = None;

        // Tier 1: Defaults
        if let Ok(default_json) = serde_json::to_value(Config::default()) {
            configs.push(default_json);
        }

        // Tier 2: Project, Tier 3: User
        let tiers = [
            (ConfigTier::Project, paths.project_dir.as_deref()),
            (ConfigTier::User, paths.user_dir.as_deref()),
        ];
        for (tier, dir) in tiers {
            let Some(dir) = dir else {
                continue;
            };
            if let Some(value) = read_tier_file(&dir.join(CONFIG_FILE_NAME), tier) {
                configs.push(value);
                config_path = Some(dir.join(CONFIG_FILE_NAME));
            }
        }

        // Merge all tiers
        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Apply environment variable overrides to settings.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(root) = std::env::var("STREAM_CONFIG_ROOT") {
            config.engine.root = PathBuf::from(root);
        }

        if let Ok(out) = std::env::var("STREAM_CONFIG_OUT") {
            config.output.path = PathBuf::from(out);
        }

        if let Ok(profile) = std::env::var("STREAM_CONFIG_PROFILE") {
            match profile.parse() {
                Ok(name) => config.engine.profile = name,
                Err(err) => warn!(tier = %ConfigTier::Environment, "Ignoring STREAM_CONFIG_PROFILE: {}", err),
            }
        }
    }

    /// Get the loaded settings.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the settings.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Get the highest-priority settings file that was used.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Read one tier's YAML file. Missing files are skipped quietly; unreadable
/// or unparsable ones are skipped with a warning.
fn read_tier_file(path: &Path, tier: ConfigTier) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(tier = %tier, path = %path.display(), "Could not read settings: {}", err);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(tier = %tier, path = %path.display(), "Loaded settings");
            Some(value)
        }
        Err(err) => {
            warn!(tier = %tier, path = %path.display(), "Could not parse settings: {}", err);
            None
        }
    }
}
