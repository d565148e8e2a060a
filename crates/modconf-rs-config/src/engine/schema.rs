//! Schema well-formedness checks and parsing of JSON-described schemas.
//!
//! Problems are reported as `MalformedSchema` diagnostics and the offending
//! node is skipped, so a module with a partly broken schema still resolves.

use super::utils::join_path;
use crate::ConfigDiagnostic;
use crate::model::{ObjectSchema, SchemaKind, SchemaNode, Validator};
use crate::validators::ValidatorRegistry;
use serde_json::{Map, Value};

const DEFAULT_KEY: &str = "default";
const VALIDATORS_KEY: &str = "validators";
const DESCRIPTION_KEY: &str = "description";
const ARRAY_ELEMENTS_KEY: &str = "arrayElements";
const DICTIONARY_ELEMENTS_KEY: &str = "dictionaryElements";

/// Keys that describe a node rather than name a nested config key.
const META_KEYS: &[&str] = &[
    DEFAULT_KEY,
    VALIDATORS_KEY,
    DESCRIPTION_KEY,
    ARRAY_ELEMENTS_KEY,
    DICTIONARY_ELEMENTS_KEY,
];

/// Check a typed schema for defaults that contradict their node kind.
pub(super) fn check_schema(module: &str, schema: &ObjectSchema) -> Vec<ConfigDiagnostic> {
    let mut out = Vec::new();
    for (key, node) in schema {
        check_node(module, node, key, &mut out);
    }
    out
}

fn check_node(module: &str, node: &SchemaNode, path: &str, out: &mut Vec<ConfigDiagnostic>) {
    match &node.kind {
        SchemaKind::Leaf { .. } => {}
        SchemaKind::Object(children) => {
            for (key, child) in children {
                check_node(module, child, &join_path(path, key), out);
            }
        }
        SchemaKind::Array { default, elements } => {
            if !default.is_array() {
                report(out, module, path, "array default must be an array");
            }
            check_node(module, elements, &format!("{path}[]"), out);
        }
        SchemaKind::Dictionary { default, elements } => {
            if !default.is_object() {
                report(out, module, path, "dictionary default must be an object");
            }
            check_node(module, elements, &join_path(path, "*"), out);
        }
    }
}

/// Parse a schema described as JSON.
///
/// A node is a JSON object. `default`, `validators`, `description`,
/// `arrayElements` and `dictionaryElements` describe the node itself, any
/// other key declares a nested config key. Validators are referenced by name.
pub(super) fn parse_schema(
    module: &str,
    value: &Value,
    validators: &ValidatorRegistry,
) -> (ObjectSchema, Vec<ConfigDiagnostic>) {
    let mut parser = SchemaParser {
        module,
        validators,
        diagnostics: Vec::new(),
    };
    let schema = match value {
        Value::Object(map) => parser.parse_children(map, ""),
        _ => {
            parser.report("root", "schema must be an object");
            ObjectSchema::new()
        }
    };
    (schema, parser.diagnostics)
}

struct SchemaParser<'a> {
    module: &'a str,
    validators: &'a ValidatorRegistry,
    diagnostics: Vec<ConfigDiagnostic>,
}

impl SchemaParser<'_> {
    fn parse_children(&mut self, map: &Map<String, Value>, path: &str) -> ObjectSchema {
        let mut children = ObjectSchema::new();
        for (key, value) in map {
            if META_KEYS.contains(&key.as_str()) {
                continue;
            }
            let child_path = join_path(path, key);
            let Value::Object(node) = value else {
                self.report(&child_path, "expected an object");
                continue;
            };
            let node = self.parse_node(node, &child_path, false);
            children.insert(key.clone(), node);
        }
        children
    }

    /// Parse one node. Element schemas without a default or nested keys are
    /// plain leaves rather than empty objects.
    fn parse_node(
        &mut self,
        map: &Map<String, Value>,
        path: &str,
        element: bool,
    ) -> SchemaNode {
        let array_elements = self.parse_elements(map, ARRAY_ELEMENTS_KEY, path, "[]");
        let dictionary_elements = self.parse_elements(map, DICTIONARY_ELEMENTS_KEY, path, ".*");
        let default = map.get(DEFAULT_KEY).cloned();

        let kind = match (array_elements, dictionary_elements) {
            (Some(elements), dictionary) => {
                if dictionary.is_some() {
                    self.report(path, "arrayElements and dictionaryElements are exclusive");
                }
                SchemaKind::Array {
                    default: self.default_or(default, path, Value::Array(Vec::new())),
                    elements: Box::new(elements),
                }
            }
            (None, Some(elements)) => SchemaKind::Dictionary {
                default: self.default_or(default, path, Value::Object(Map::new())),
                elements: Box::new(elements),
            },
            (None, None) => match default {
                Some(default) => SchemaKind::Leaf { default },
                None if element && !has_nested_keys(map) => SchemaKind::Leaf {
                    default: Value::Null,
                },
                None => SchemaKind::Object(self.parse_children(map, path)),
            },
        };

        SchemaNode {
            kind,
            validators: self.parse_validators(map, path),
            description: self.parse_description(map, path),
        }
    }

    fn parse_elements(
        &mut self,
        map: &Map<String, Value>,
        key: &str,
        path: &str,
        suffix: &str,
    ) -> Option<SchemaNode> {
        let value = map.get(key)?;
        let element_path = format!("{path}{suffix}");
        match value {
            Value::Object(node) => Some(self.parse_node(node, &element_path, true)),
            _ => {
                self.report(&element_path, &format!("{key} must be an object"));
                None
            }
        }
    }

    fn default_or(&mut self, default: Option<Value>, path: &str, fallback: Value) -> Value {
        default.unwrap_or_else(|| {
            self.report(path, &format!("missing default; assuming {fallback}"));
            fallback
        })
    }

    fn parse_validators(&mut self, map: &Map<String, Value>, path: &str) -> Vec<Validator> {
        let Some(value) = map.get(VALIDATORS_KEY) else {
            return Vec::new();
        };
        let Value::Array(entries) = value else {
            self.report(path, "validators must be an array");
            return Vec::new();
        };
        let mut validators = Vec::new();
        for entry in entries {
            let Some(name) = entry.as_str() else {
                self.report(path, &format!("invalid validator {entry}; expected a name"));
                continue;
            };
            match self.validators.get(name) {
                Some(validator) => validators.push(validator),
                None => self.report(path, &format!("unknown validator '{name}'")),
            }
        }
        validators
    }

    fn parse_description(&mut self, map: &Map<String, Value>, path: &str) -> Option<String> {
        match map.get(DESCRIPTION_KEY)? {
            Value::String(text) => Some(text.clone()),
            _ => {
                self.report(path, "description must be a string");
                None
            }
        }
    }

    fn report(&mut self, path: &str, reason: &str) {
        report(&mut self.diagnostics, self.module, path, reason);
    }
}

fn has_nested_keys(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| !META_KEYS.contains(&key.as_str()))
}

fn report(out: &mut Vec<ConfigDiagnostic>, module: &str, path: &str, reason: &str) {
    let path = if path.is_empty() { "root" } else { path };
    let diagnostic = ConfigDiagnostic::MalformedSchema {
        module: module.to_string(),
        path: path.to_string(),
        reason: reason.to_string(),
    };
    diagnostic.emit();
    out.push(diagnostic);
}
