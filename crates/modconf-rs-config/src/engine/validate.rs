//! Structural validation of merged config against a module schema.
//!
//! Validation is advisory: every finding is logged and collected, values are
//! never removed.

use super::utils::{index_path, join_path, render_value};
use crate::ConfigDiagnostic;
use crate::model::{ConfigObject, ObjectSchema, SchemaKind, SchemaNode, Validator};
use serde_json::Value;

/// Validate `config` against `schema`, prefixing diagnostic paths with `key_path`.
pub fn validate(
    schema: &ObjectSchema,
    config: &ConfigObject,
    key_path: &str,
) -> Vec<ConfigDiagnostic> {
    let mut diagnostics = Vec::new();
    validate_object(schema, config, key_path, &mut diagnostics);
    diagnostics
}

fn validate_object(
    schema: &ObjectSchema,
    config: &ConfigObject,
    key_path: &str,
    out: &mut Vec<ConfigDiagnostic>,
) {
    for (key, value) in config {
        let path = join_path(key_path, key);
        let Some(node) = schema.get(key) else {
            report(out, ConfigDiagnostic::UnknownKey { path });
            continue;
        };
        validate_node(node, value, &path, out);
    }
}

fn validate_node(node: &SchemaNode, value: &Value, path: &str, out: &mut Vec<ConfigDiagnostic>) {
    run_validators(&node.validators, value, path, out);
    match (&node.kind, value) {
        (SchemaKind::Dictionary { elements, .. }, Value::Object(entries)) => {
            for (key, entry) in entries {
                validate_node(elements, entry, &join_path(path, key), out);
            }
        }
        (SchemaKind::Object(children), Value::Object(map)) => {
            validate_object(children, map, path, out);
        }
        (SchemaKind::Array { elements, .. }, value) => validate_array(elements, value, path, out),
        // Leaves are freeform, even when the value is an object.
        _ => {}
    }
}

fn validate_array(
    elements: &SchemaNode,
    value: &Value,
    path: &str,
    out: &mut Vec<ConfigDiagnostic>,
) {
    let Value::Array(items) = value else {
        report(
            out,
            ConfigDiagnostic::NotAnArray {
                path: path.to_string(),
                value: render_value(value),
            },
        );
        return;
    };
    for (idx, item) in items.iter().enumerate() {
        validate_node(elements, item, &index_path(path, idx), out);
    }
}

fn run_validators(
    validators: &[Validator],
    value: &Value,
    path: &str,
    out: &mut Vec<ConfigDiagnostic>,
) {
    for validator in validators {
        if let Some(message) = validator.check(value) {
            report(
                out,
                ConfigDiagnostic::InvalidValue {
                    path: path.to_string(),
                    value: render_value(value),
                    message,
                },
            );
        }
    }
}

fn report(out: &mut Vec<ConfigDiagnostic>, diagnostic: ConfigDiagnostic) {
    diagnostic.emit();
    out.push(diagnostic);
}
