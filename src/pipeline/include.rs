//! Include expansion state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a fragment's include sits relative to its own fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludePrecedence {
    /// Fold the include before the including fragment's fields, so the
    /// fragment's own values win.
    #[default]
    Weakest,
    /// Fold the include after the including fragment's fields, so the
    /// included values win.
    Strongest,
}

impl std::fmt::Display for IncludePrecedence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncludePrecedence::Weakest => write!(f, "weakest"),
            IncludePrecedence::Strongest => write!(f, "strongest"),
        }
    }
}

/// Locators already expanded during one resolution run.
///
/// Owned by a single run; a key is claimed once and every later reference,
/// from any layer, is skipped.
#[derive(Debug, Default)]
pub struct IncludeSet {
    seen: HashSet<String>,
}

impl IncludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `locator`. Returns `false` if it was already expanded.
    pub fn claim(&mut self, locator: &str) -> bool {
        self.seen.insert(locator.to_string())
    }
}
