//! Settings for the resolver.
//!
//! Consolidates settings from tiers with field-by-field YAML merging:
//! 1. **Defaults** - Built in
//! 2. **Project** - `$CWD/stream-config/config.yaml`
//! 3. **User** - `~/.stream-config/config.yaml`
//! 4. **Environment** - variables below
//!
//! CLI flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `STREAM_CONFIG_PATH` - Explicit settings file (overrides all tiers)
//! - `STREAM_CONFIG_ROOT` - Root folder where fragments are found
//! - `STREAM_CONFIG_OUT` - Output file for the resolved record
//! - `STREAM_CONFIG_PROFILE` - Built-in profile (`stream` or `model`)
//! - `STREAM_CONFIG_USER_DIR` - User settings dir (default: `~/.stream-config`)
//! - `STREAM_CONFIG_PROJECT_DIR` - Project settings dir (default: `./stream-config`)

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
