//! Error and diagnostic types.
//!
//! `EngineError` is fatal and only arises from caller preconditions or a
//! malformed profile definition. Everything that can go wrong while reading
//! layers is a `Diagnostic`: recorded, logged, and never fatal.

use crate::schema::FieldKind;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Fatal engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a topic identifier is required")]
    MissingTopic,

    #[error("invalid field name '{0}': names must be non-empty and lowercase")]
    InvalidFieldName(String),

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("a schema may declare at most one include field")]
    MultipleIncludeFields,

    #[error("rule references unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' is {actual}, expected {expected}")]
    FieldType {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("mode rules declare default '{0}' which is not a legal mode")]
    UnknownDefaultMode(String),

    #[error("mode '{0}' injects tags but the profile has no tag field")]
    MissingTagField(String),

    #[error("unknown profile '{0}' (expected 'stream' or 'model')")]
    UnknownProfile(String),
}

/// Codes for non-fatal outcomes of a resolution run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// A layer or include source does not exist.
    SourceAbsent,
    /// Bytes were present but a field (or the whole fragment) did not decode.
    DecodeMalformed,
    /// An enum-valued field held an illegal value and was reset.
    InvalidEnum,
    /// An include was referenced again and skipped.
    IncludeCycleAvoided,
    /// A list exceeded its maximum length and was truncated.
    CountCapped,
}

/// Structured record of something the run worked around.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            layer: None,
            field: None,
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn source_absent(locator: &str) -> Self {
        Self::new(
            DiagnosticCode::SourceAbsent,
            format!("No config found at {}", locator),
        )
        .with_layer(locator)
    }

    pub fn malformed_field(locator: &str, field: &str, expected: FieldKind) -> Self {
        Self::new(
            DiagnosticCode::DecodeMalformed,
            format!("Expected {} for '{}', keeping default", expected, field),
        )
        .with_layer(locator)
        .with_field(field)
    }

    pub fn malformed_fragment(locator: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            DiagnosticCode::DecodeMalformed,
            format!("Fragment is not a JSON object ({}), using defaults", reason),
        )
        .with_layer(locator)
    }

    pub fn invalid_enum(field: &str, value: &str, fallback: &str) -> Self {
        Self::new(
            DiagnosticCode::InvalidEnum,
            format!("'{}' is not a valid {}, using '{}'", value, field, fallback),
        )
        .with_field(field)
    }

    pub fn include_seen(locator: &str) -> Self {
        Self::new(
            DiagnosticCode::IncludeCycleAvoided,
            format!("Already included {} in another config, skipping", locator),
        )
        .with_layer(locator)
    }

    pub fn count_capped(field: &str, found: usize, max: usize) -> Self {
        Self::new(
            DiagnosticCode::CountCapped,
            format!("Found {} entries in '{}', keeping the first {}", found, field, max),
        )
        .with_field(field)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_serializes_screaming_snake() {
        let d = Diagnostic::include_seen("includes/a.json");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["code"], "INCLUDE_CYCLE_AVOIDED");
        assert_eq!(json["layer"], "includes/a.json");
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_malformed_field_carries_field_and_layer() {
        let d = Diagnostic::malformed_field("global.json", "maxqueue", FieldKind::Int);
        assert_eq!(d.code, DiagnosticCode::DecodeMalformed);
        assert_eq!(d.field.as_deref(), Some("maxqueue"));
        assert_eq!(d.layer.as_deref(), Some("global.json"));
        assert!(d.to_string().contains("int"));
    }
}
