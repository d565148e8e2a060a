//! Ordered config sources and declared schemas.

use crate::model::ObjectSchema;
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Provided sources in priority order plus the lazily loaded external one.
#[derive(Debug, Default)]
pub(crate) struct SourceStore {
    /// Explicitly provided sources, later entries win.
    provided: Vec<Value>,
    /// External source, always merged below every provided one.
    external: Option<Value>,
    /// Bumped on every reset so stale loads can be discarded.
    generation: u64,
}

impl SourceStore {
    pub(crate) fn push(&mut self, source: Value) {
        self.provided.push(source);
        debug!("provided config source (count={})", self.provided.len());
    }

    pub(crate) fn set_external(&mut self, source: Value) {
        self.external = Some(source);
    }

    #[cfg(test)]
    pub(crate) fn external(&self) -> Option<&Value> {
        self.external.as_ref()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Sources from lowest to highest priority.
    pub(crate) fn ordered(&self) -> impl Iterator<Item = &Value> {
        self.external.iter().chain(self.provided.iter())
    }

    pub(crate) fn clear(&mut self) {
        self.provided.clear();
        self.external = None;
        self.generation += 1;
    }
}

/// Declared schemas by module id.
#[derive(Debug, Default)]
pub(crate) struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<ObjectSchema>>,
}

impl SchemaRegistry {
    pub(crate) fn insert(&mut self, module: String, schema: ObjectSchema) {
        if self.schemas.insert(module.clone(), Arc::new(schema)).is_some() {
            debug!("replaced config schema (module={module})");
        }
    }

    pub(crate) fn get(&self, module: &str) -> Option<Arc<ObjectSchema>> {
        self.schemas.get(module).cloned()
    }

    pub(crate) fn contains(&self, module: &str) -> bool {
        self.schemas.contains_key(module)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &Arc<ObjectSchema>)> {
        self.schemas.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.schemas.clear();
    }
}
