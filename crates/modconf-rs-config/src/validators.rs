//! Built-in validators and the name registry used by file-based schemas.

use crate::model::Validator;
use serde_json::Value;
use std::collections::HashMap;

/// Reject anything that is not a JSON string.
pub fn is_string() -> Validator {
    Validator::named("isString", |value| {
        (!value.is_string()).then(|| "must be a string".to_string())
    })
}

/// Reject anything that is not a JSON number.
pub fn is_number() -> Validator {
    Validator::named("isNumber", |value| {
        (!value.is_number()).then(|| "must be a number".to_string())
    })
}

/// Reject anything that is not a JSON boolean.
pub fn is_boolean() -> Validator {
    Validator::named("isBoolean", |value| {
        (!value.is_boolean()).then(|| "must be a boolean".to_string())
    })
}

/// Reject anything that is not a JSON object (arrays included).
pub fn is_object() -> Validator {
    Validator::named("isObject", |value| {
        (!value.is_object()).then(|| "must be an object".to_string())
    })
}

/// Accept absolute http(s) URLs, root-relative paths and `${...}` templates.
pub fn is_url() -> Validator {
    Validator::named("isUrl", |value| {
        let Some(url) = value.as_str() else {
            return Some("must be a string".to_string());
        };
        let accepted = ["http://", "https://", "/", "${"]
            .iter()
            .any(|prefix| url.starts_with(prefix));
        (!accepted).then(|| "must be an absolute URL, a path, or a URL template".to_string())
    })
}

/// Accept only the listed values.
pub fn one_of(allowed: Vec<Value>) -> Validator {
    Validator::named("oneOf", move |value| {
        if allowed.contains(value) {
            return None;
        }
        let rendered = allowed
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("must be one of {rendered}"))
    })
}

/// Name to validator lookup for schemas parsed from JSON.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Validator>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in validators.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for validator in [is_string(), is_number(), is_boolean(), is_object(), is_url()] {
            if let Some(name) = validator.name().map(str::to_string) {
                registry.register(name, validator);
            }
        }
        registry
    }

    /// Register or replace a validator under `name`.
    pub fn register(&mut self, name: impl Into<String>, validator: Validator) {
        self.validators.insert(name.into(), validator);
    }

    /// Look up a validator by name.
    pub fn get(&self, name: &str) -> Option<Validator> {
        self.validators.get(name).cloned()
    }
}
