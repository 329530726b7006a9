//! Declared field table for configuration records.
//!
//! Every field carries an explicit merge policy and default. Records are
//! built from this table and resolution dispatches on it, so adding a field
//! means deciding its policy here rather than inheriting one from its type.

mod artifact;
mod profiles;

pub use artifact::json_schema;
pub use profiles::{IdentityStyle, ModeRules, ModeSpec, Profile, ProfileName};

use crate::error::EngineError;
use crate::record::{FieldValue, Record};
use std::collections::HashMap;
use std::sync::Arc;

/// JSON-level type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Str,
    List,
}

impl FieldKind {
    /// Name used in the generated JSON schema.
    pub fn json_type(&self) -> &'static str {
        match self {
            FieldKind::Bool => "boolean",
            FieldKind::Int => "integer",
            FieldKind::Str => "string",
            FieldKind::List => "array",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Int => write!(f, "int"),
            FieldKind::Str => write!(f, "string"),
            FieldKind::List => write!(f, "string-list"),
        }
    }
}

/// How two values of a field combine when a layer is folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Default `true` combines with AND, default `false` with OR.
    Toggle { default: bool },
    /// Keep the smaller value. Incoming equal to `default` counts as unset.
    MinWins { default: i64 },
    /// Keep the larger value. Incoming equal to `default` counts as unset.
    MaxWins { default: i64 },
    /// Incoming replaces existing when non-zero. Zero-valued by default.
    NonzeroOverrides,
    /// Incoming replaces existing unless it equals the sentinel.
    SentinelInt { sentinel: i64 },
    /// Incoming replaces existing when non-empty. Empty by default, so an
    /// unmentioned field never overrides an earlier layer.
    LastNonEmpty,
    /// Incoming is appended after `separator`.
    Concatenate { separator: &'static str },
    /// Incoming replaces existing unless it equals the sentinel.
    SentinelStr { sentinel: &'static str },
    /// First-seen-order union with whitespace-insensitive de-duplication.
    Union,
    /// Reference to another fragment. Consumed by include expansion and
    /// never part of the exposed output.
    Include,
    /// Owned by the pipeline: never decoded from fragments or folded.
    ControlFlag,
    /// Owned by the pipeline: never decoded from fragments or folded.
    ControlText,
}

impl FieldPolicy {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldPolicy::Toggle { .. } | FieldPolicy::ControlFlag => FieldKind::Bool,
            FieldPolicy::MinWins { .. }
            | FieldPolicy::MaxWins { .. }
            | FieldPolicy::NonzeroOverrides
            | FieldPolicy::SentinelInt { .. } => FieldKind::Int,
            FieldPolicy::LastNonEmpty
            | FieldPolicy::Concatenate { .. }
            | FieldPolicy::SentinelStr { .. }
            | FieldPolicy::Include
            | FieldPolicy::ControlText => FieldKind::Str,
            FieldPolicy::Union => FieldKind::List,
        }
    }

    /// Value this field holds in the zero-value record.
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldPolicy::Toggle { default } => FieldValue::Bool(*default),
            FieldPolicy::ControlFlag => FieldValue::Bool(false),
            FieldPolicy::MinWins { default } | FieldPolicy::MaxWins { default } => {
                FieldValue::Int(*default)
            }
            FieldPolicy::NonzeroOverrides => FieldValue::Int(0),
            FieldPolicy::SentinelInt { sentinel } => FieldValue::Int(*sentinel),
            FieldPolicy::SentinelStr { sentinel } => FieldValue::Str((*sentinel).to_string()),
            FieldPolicy::LastNonEmpty
            | FieldPolicy::Concatenate { .. }
            | FieldPolicy::Include
            | FieldPolicy::ControlText => {
                FieldValue::Str(String::new())
            }
            FieldPolicy::Union => FieldValue::List(Vec::new()),
        }
    }

    /// Whether fragments may set this field.
    pub fn is_decodable(&self) -> bool {
        !self.is_control()
    }

    pub fn is_control(&self) -> bool {
        matches!(self, FieldPolicy::ControlFlag | FieldPolicy::ControlText)
    }

    /// Whether the field shows up in resolved output.
    pub fn is_exposed(&self) -> bool {
        !matches!(self, FieldPolicy::Include)
    }
}

/// One row of the field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub policy: FieldPolicy,
}

impl FieldSpec {
    pub const fn new(name: &'static str, policy: FieldPolicy) -> Self {
        Self { name, policy }
    }

    pub fn kind(&self) -> FieldKind {
        self.policy.kind()
    }
}

/// Ordered, validated field table.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldSpec>,
    index: HashMap<&'static str, usize>,
    include: Option<usize>,
}

impl Schema {
    /// Build a schema, rejecting duplicate or non-lowercase names and more
    /// than one include field.
    pub fn new(name: &'static str, fields: Vec<FieldSpec>) -> Result<Self, EngineError> {
        let mut index = HashMap::with_capacity(fields.len());
        let mut include = None;

        for (i, field) in fields.iter().enumerate() {
            if field.name.is_empty() || field.name.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(EngineError::InvalidFieldName(field.name.to_string()));
            }
            if index.insert(field.name, i).is_some() {
                return Err(EngineError::DuplicateField(field.name.to_string()));
            }
            if field.policy == FieldPolicy::Include {
                if include.is_some() {
                    return Err(EngineError::MultipleIncludeFields);
                }
                include = Some(i);
            }
        }

        Ok(Self {
            name,
            fields,
            index,
            include,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    /// Position of the include field, if the schema declares one.
    pub fn include_index(&self) -> Option<usize> {
        self.include
    }

    /// Check that `name` exists and has the expected kind.
    pub fn require(&self, name: &str, kind: FieldKind) -> Result<usize, EngineError> {
        let i = self
            .index_of(name)
            .ok_or_else(|| EngineError::UnknownField(name.to_string()))?;
        let actual = self.fields[i].kind();
        if actual != kind {
            return Err(EngineError::FieldType {
                field: name.to_string(),
                expected: kind,
                actual,
            });
        }
        Ok(i)
    }

    /// Fresh record with every field at its declared default and
    /// `found = false`.
    pub fn zero_record(self: &Arc<Self>) -> Record {
        let values = self.fields.iter().map(|f| f.policy.default_value()).collect();
        Record::from_parts(Arc::clone(self), values, false)
    }
}
