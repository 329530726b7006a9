//! Layered JSON config resolver
//!
//! Merges partial JSON fragments (global, per-topic, calendar, includes)
//! into one typed record using per-field merge policies.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod finalize;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod schema;
pub mod source;

pub use engine::{Engine, ResolveRequest, Resolved};
pub use error::{Diagnostic, DiagnosticCode, EngineError};
pub use record::{FieldValue, Record};
