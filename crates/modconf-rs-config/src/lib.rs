//! Schema-driven configuration for independently developed modules.
//!
//! Modules declare a schema, hosts provide config sources, and the engine
//! merges, validates and defaults each module's config on request.

mod engine;
mod error;
mod model;
pub mod validators;

/// Resolution engine, its options and the building blocks it runs.
pub use engine::{
    CONFIG_FILE_SOURCE, ConfigEngine, EngineOptions, ExternalSource, FileSource, Resolution,
    ValidationMode, apply_defaults, merge_for_module, process_config, read_json5, validate,
};
/// Fatal errors and logged diagnostics.
pub use error::{ConfigDiagnostic, ConfigError, ExternalLoadError};
/// Schema tree model.
pub use model::*;
/// Validator lookup for JSON-described schemas.
pub use validators::ValidatorRegistry;
