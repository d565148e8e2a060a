//! Fill schema defaults into a merged config tree.

use crate::model::{ConfigObject, ObjectSchema, SchemaKind};
use log::debug;
use serde_json::Value;

/// Insert schema defaults for every key missing from `config`.
///
/// Object nodes are created empty when absent and recursed into. Arrays with
/// an object element schema get defaults applied to each object element.
/// Dictionary entries are user-defined keys and are left untouched.
pub fn apply_defaults<'a>(
    schema: &ObjectSchema,
    config: &'a mut ConfigObject,
) -> &'a mut ConfigObject {
    for (key, node) in schema {
        match &node.kind {
            SchemaKind::Leaf { default } | SchemaKind::Dictionary { default, .. } => {
                config
                    .entry(key.clone())
                    .or_insert_with(|| default.clone());
            }
            SchemaKind::Array { default, elements } => {
                let value = config
                    .entry(key.clone())
                    .or_insert_with(|| default.clone());
                if let (SchemaKind::Object(element_schema), Value::Array(items)) =
                    (&elements.kind, value)
                {
                    for item in items.iter_mut() {
                        if let Value::Object(item) = item {
                            apply_defaults(element_schema, item);
                        }
                    }
                }
            }
            SchemaKind::Object(children) => {
                let value = config
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(ConfigObject::new()));
                match value {
                    Value::Object(map) => {
                        apply_defaults(children, map);
                    }
                    other => {
                        debug!("skipping defaults for non-object value (key={key}, value={other})")
                    }
                }
            }
        }
    }
    config
}
