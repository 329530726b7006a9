//! Layer keys and the sources that produce their bytes.

use crate::paths::{join_locator, sanitize_segment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Layer kinds in priority order (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Global = 0,
    Topic = 1,
    Weekday = 2,
    Date = 3,
    DateWithYear = 4,
    Month = 5,
    MonthWithYear = 6,
}

impl LayerKind {
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Global,
        LayerKind::Topic,
        LayerKind::Weekday,
        LayerKind::Date,
        LayerKind::DateWithYear,
        LayerKind::Month,
        LayerKind::MonthWithYear,
    ];
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Global => write!(f, "global"),
            LayerKind::Topic => write!(f, "topic"),
            LayerKind::Weekday => write!(f, "weekday"),
            LayerKind::Date => write!(f, "date"),
            LayerKind::DateWithYear => write!(f, "date with year"),
            LayerKind::Month => write!(f, "month"),
            LayerKind::MonthWithYear => write!(f, "month with year"),
        }
    }
}

/// Logical key for one fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerKey {
    Global,
    Topic(String),
    Weekday(String),
    Date(String),
    DateWithYear(String),
    Month(String),
    MonthWithYear(String),
    Include(String),
}

impl LayerKey {
    /// Key for a layer kind with its token (ignored for `Global`).
    pub fn for_kind(kind: LayerKind, token: impl Into<String>) -> Self {
        let token = token.into();
        match kind {
            LayerKind::Global => LayerKey::Global,
            LayerKind::Topic => LayerKey::Topic(token),
            LayerKind::Weekday => LayerKey::Weekday(token),
            LayerKind::Date => LayerKey::Date(token),
            LayerKind::DateWithYear => LayerKey::DateWithYear(token),
            LayerKind::Month => LayerKey::Month(token),
            LayerKind::MonthWithYear => LayerKey::MonthWithYear(token),
        }
    }

    /// Include key for a fragment's include reference. Reserved characters,
    /// path separators included, are replaced so the key stays inside the
    /// include directory.
    pub fn include(name: &str) -> Self {
        LayerKey::Include(sanitize_segment(name.trim()))
    }

    /// Relative `/`-separated locator under the config root.
    pub fn relative(&self, layout: &Layout) -> String {
        match self {
            LayerKey::Global => layout.global.clone(),
            LayerKey::Topic(t) => join_locator(&layout.topics, &format!("{}.json", t)),
            LayerKey::Weekday(t) => join_locator(&layout.weekday, &format!("{}.json", t)),
            LayerKey::Date(t) | LayerKey::DateWithYear(t) => {
                join_locator(&layout.date, &format!("{}.json", t))
            }
            LayerKey::Month(t) | LayerKey::MonthWithYear(t) => {
                join_locator(&layout.month, &format!("{}.json", t))
            }
            LayerKey::Include(t) => join_locator(&layout.includes, &format!("{}.json", t)),
        }
    }
}

/// Where each layer kind lives relative to the config root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default = "default_global")]
    pub global: String,
    #[serde(default = "default_topics")]
    pub topics: String,
    #[serde(default = "default_weekday")]
    pub weekday: String,
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default = "default_month")]
    pub month: String,
    #[serde(default = "default_includes")]
    pub includes: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            global: default_global(),
            topics: default_topics(),
            weekday: default_weekday(),
            date: default_date(),
            month: default_month(),
            includes: default_includes(),
        }
    }
}

impl Layout {
    /// Layout with topics stored directly under the root.
    pub fn flat_topics() -> Self {
        Self {
            topics: String::new(),
            ..Self::default()
        }
    }
}

fn default_global() -> String {
    "global.json".to_string()
}

fn default_topics() -> String {
    "games".to_string()
}

fn default_weekday() -> String {
    "day".to_string()
}

fn default_date() -> String {
    "date".to_string()
}

fn default_month() -> String {
    "month".to_string()
}

fn default_includes() -> String {
    "includes".to_string()
}

/// Produces raw bytes for a key, or `None` when the source is absent.
pub trait LayerSource {
    /// Fully-qualified locator for `key`. Used for diagnostics and as the
    /// identity of an include.
    fn locate(&self, key: &LayerKey) -> String;

    /// Raw bytes for `key`. Any read failure is absence.
    fn load(&self, key: &LayerKey) -> Option<Vec<u8>>;
}

/// Reads fragments from a directory tree.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    layout: Layout,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &LayerKey) -> PathBuf {
        self.root.join(key.relative(&self.layout))
    }
}

impl LayerSource for DirSource {
    fn locate(&self, key: &LayerKey) -> String {
        self.path_for(key).to_string_lossy().to_string()
    }

    fn load(&self, key: &LayerKey) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "Error loading config");
                None
            }
        }
    }
}

/// In-memory fragments keyed by relative locator.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    layout: Layout,
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            entries: HashMap::new(),
        }
    }

    /// Add a fragment at a relative locator such as `games/Hades.json`.
    pub fn insert(&mut self, relative: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(relative.into(), bytes.into());
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with(mut self, relative: impl Into<String>, json: &str) -> Self {
        self.insert(relative, json.as_bytes().to_vec());
        self
    }
}

impl LayerSource for MemorySource {
    fn locate(&self, key: &LayerKey) -> String {
        key.relative(&self.layout)
    }

    fn load(&self, key: &LayerKey) -> Option<Vec<u8>> {
        self.entries.get(&key.relative(&self.layout)).cloned()
    }
}
