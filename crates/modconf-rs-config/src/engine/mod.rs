//! Module config resolution.
//!
//! A `ConfigEngine` owns the declared schemas, the provided config sources and
//! the one-shot external source load. Resolving a module merges every source's
//! subtree for it, validates the result against the module schema, then fills
//! in defaults.

mod defaults;
mod external;
mod merge;
mod schema;
mod store;
mod utils;
mod validate;


pub use defaults::apply_defaults;
pub use external::{CONFIG_FILE_SOURCE, ExternalSource, FileSource, read_json5};
pub use merge::merge_for_module;
pub use validate::validate;

use crate::model::{ConfigObject, ObjectSchema};
use crate::validators::ValidatorRegistry;
use crate::{ConfigDiagnostic, ConfigError};
use external::ExternalLoader;
use log::{debug, info};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use store::{SchemaRegistry, SourceStore};
use utils::join_path;

/// How unknown keys in provided config are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Log unknown keys and keep resolving.
    #[default]
    Lenient,
    /// Fail resolution on unknown keys at the module's top level.
    Strict,
}

/// Options controlling engine behaviour.
#[derive(Clone, Default)]
pub struct EngineOptions {
    /// Unknown key handling.
    pub validation: ValidationMode,
    /// Deployment-supplied source loaded on first resolution.
    pub external_source: Option<Arc<dyn ExternalSource>>,
}

impl EngineOptions {
    /// Lenient validation, no external source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unknown key handling.
    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    /// Load `source` lazily below every provided source.
    pub fn with_external_source(mut self, source: impl ExternalSource + 'static) -> Self {
        self.external_source = Some(Arc::new(source));
        self
    }

    /// Use the config file in the user's home directory, when there is one.
    pub fn with_default_file_source(mut self) -> Self {
        if let Some(source) = FileSource::default_location() {
            debug!(
                "using default external config file (path={})",
                source.path().display()
            );
            self.external_source = Some(Arc::new(source));
        }
        self
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("validation", &self.validation)
            .field(
                "external_source",
                &self.external_source.as_ref().map(|source| source.name()),
            )
            .finish()
    }
}

/// Resolved config for one module plus the diagnostics logged on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub config: ConfigObject,
    pub diagnostics: Vec<ConfigDiagnostic>,
}

/// Validate and default an already merged config tree.
///
/// `key_path` prefixes diagnostic paths, usually the module id.
pub fn process_config(
    schema: &ObjectSchema,
    mut provided: ConfigObject,
    key_path: &str,
) -> Resolution {
    let diagnostics = validate(schema, &provided, key_path);
    apply_defaults(schema, &mut provided);
    Resolution {
        config: provided,
        diagnostics,
    }
}

/// Schema registry, config sources and external loader for one application.
///
/// Clones share state. Build a fresh engine for an isolated session.
#[derive(Clone, Default)]
pub struct ConfigEngine {
    inner: Arc<EngineInner>,
}

#[derive(Default)]
struct EngineInner {
    options: EngineOptions,
    schemas: RwLock<SchemaRegistry>,
    sources: Arc<RwLock<SourceStore>>,
    loader: ExternalLoader,
}

impl ConfigEngine {
    /// Engine with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit options.
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                options,
                ..EngineInner::default()
            }),
        }
    }

    /// Options the engine was built with.
    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    /// Declare (or replace) the schema for `module`.
    ///
    /// Malformed nodes are logged and returned; the schema is stored anyway.
    pub fn define_schema(
        &self,
        module: impl Into<String>,
        schema: ObjectSchema,
    ) -> Vec<ConfigDiagnostic> {
        let module = module.into();
        let diagnostics = schema::check_schema(&module, &schema);
        info!(
            "defined config schema (module={module}, keys={})",
            schema.len()
        );
        self.inner.schemas.write().insert(module, schema);
        diagnostics
    }

    /// Declare a schema written as JSON, resolving validators by name.
    pub fn define_schema_value(
        &self,
        module: impl Into<String>,
        value: &Value,
        validators: &ValidatorRegistry,
    ) -> Vec<ConfigDiagnostic> {
        let module = module.into();
        let (schema, mut diagnostics) = schema::parse_schema(&module, value, validators);
        diagnostics.extend(self.define_schema(module, schema));
        diagnostics
    }

    /// Whether a schema is declared for `module`.
    pub fn has_schema(&self, module: &str) -> bool {
        self.inner.schemas.read().contains(module)
    }

    /// Append a config source. It outranks every source provided before it.
    pub fn provide(&self, source: Value) {
        self.inner.sources.write().push(source);
    }

    /// Read a JSON5 file and provide it as a source.
    pub fn provide_from_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let source = read_json5(path)?;
        self.provide(source);
        Ok(())
    }

    /// Resolved config for `module`.
    pub async fn get_config(&self, module: &str) -> Result<ConfigObject, ConfigError> {
        Ok(self.resolve(module).await?.config)
    }

    /// Resolved config for `module`, deserialized into `T`.
    pub async fn get_config_as<T: DeserializeOwned>(
        &self,
        module: &str,
    ) -> Result<T, ConfigError> {
        let config = self.get_config(module).await?;
        Ok(serde_json::from_value(Value::Object(config))?)
    }

    /// Resolve `module`, keeping the validation diagnostics.
    ///
    /// An undeclared module fails with `SchemaNotDefined` before the external
    /// source is touched.
    pub async fn resolve(&self, module: &str) -> Result<Resolution, ConfigError> {
        let schema = self
            .inner
            .schemas
            .read()
            .get(module)
            .ok_or_else(|| ConfigError::SchemaNotDefined(module.to_string()))?;
        self.load_external().await?;
        let provided = merge_for_module(module, &schema, self.inner.sources.read().ordered());

        if self.inner.options.validation == ValidationMode::Strict {
            if let Some(key) = provided.keys().find(|key| !schema.contains_key(*key)) {
                return Err(ConfigError::UnknownKey {
                    path: join_path(module, key),
                });
            }
        }

        let resolution = process_config(&schema, provided, module);
        debug!(
            "resolved module config (module={module}, diagnostics={})",
            resolution.diagnostics.len()
        );
        Ok(resolution)
    }

    /// Defaulted configs of every declared module, without validation.
    pub async fn get_devtools_config(&self) -> Result<ConfigObject, ConfigError> {
        self.load_external().await?;
        let sources = self.inner.sources.read();
        let schemas = self.inner.schemas.read();
        let mut result = ConfigObject::new();
        for (module, schema) in schemas.iter() {
            let mut provided = merge_for_module(module, schema, sources.ordered());
            apply_defaults(schema, &mut provided);
            result.insert(module.clone(), Value::Object(provided));
        }
        Ok(result)
    }

    /// Drop every schema and source and forget the external load.
    pub fn clear_all(&self) {
        self.inner.sources.write().clear();
        self.inner.loader.reset();
        self.inner.schemas.write().clear();
        info!("cleared config schemas and sources");
    }

    async fn load_external(&self) -> Result<(), ConfigError> {
        let load = self.inner.loader.ensure_started(
            self.inner.options.external_source.clone(),
            self.inner.sources.clone(),
        );
        load.await?;
        Ok(())
    }
}

impl fmt::Debug for ConfigEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigEngine")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
