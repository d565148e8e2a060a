//! Deep merge of config sources.
//!
//! Later sources win. Objects merge key by key. Nodes the schema declares as
//! arrays or dictionaries are replaced wholesale, as is every non-object value.

use crate::model::{ConfigObject, ObjectSchema, SchemaKind};
use log::warn;
use serde_json::Value;

/// Merge overlay values into the base, recursively overriding objects.
///
/// `schema` describes the keys at this level, when they are known.
fn merge_json_values(base: &mut Value, overlay: &Value, schema: Option<&ObjectSchema>) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let node = schema.and_then(|schema| schema.get(key));
                let children = match node.map(|node| &node.kind) {
                    Some(SchemaKind::Array { .. } | SchemaKind::Dictionary { .. }) => {
                        base_map.insert(key.clone(), value.clone());
                        continue;
                    }
                    Some(SchemaKind::Object(children)) => Some(children),
                    Some(SchemaKind::Leaf { .. }) | None => None,
                };
                match base_map.get_mut(key) {
                    Some(existing) => merge_json_values(existing, value, children),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// Merge the `module` subtree of every source, lowest priority first.
///
/// Sources without the module, or with a null entry, contribute nothing.
pub fn merge_for_module<'a>(
    module: &str,
    schema: &ObjectSchema,
    sources: impl IntoIterator<Item = &'a Value>,
) -> ConfigObject {
    let mut merged = Value::Object(ConfigObject::new());
    for subtree in sources.into_iter().filter_map(|source| source.get(module)) {
        match subtree {
            Value::Null => {}
            Value::Object(_) => merge_json_values(&mut merged, subtree, Some(schema)),
            other => warn!("ignoring non-object config (module={module}, value={other})"),
        }
    }
    into_object(merged)
}

fn into_object(value: Value) -> ConfigObject {
    match value {
        Value::Object(map) => map,
        _ => ConfigObject::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SchemaNode, schema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn routes_schema() -> ObjectSchema {
        schema([
            ("x", SchemaNode::leaf(0)),
            (
                "routes",
                SchemaNode::dictionary(
                    json!({}),
                    SchemaNode::object([("url", SchemaNode::leaf("/"))]),
                ),
            ),
            ("list", SchemaNode::array(json!([]), SchemaNode::leaf(0))),
            (
                "nested",
                SchemaNode::object([(
                    "tags",
                    SchemaNode::dictionary(json!({}), SchemaNode::leaf("")),
                )]),
            ),
        ])
    }

    #[test]
    fn later_sources_win_per_leaf() {
        let sources = [
            json!({ "mod": { "x": 1, "y": { "a": 1, "b": 1 } } }),
            json!({ "mod": { "x": 2, "y": { "b": 2 } } }),
        ];
        let merged = merge_for_module("mod", &routes_schema(), &sources);
        assert_eq!(
            Value::Object(merged),
            json!({ "x": 2, "y": { "a": 1, "b": 2 } })
        );
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let sources = [
            json!({ "mod": { "list": [1, 2, 3] } }),
            json!({ "mod": { "list": [4] } }),
        ];
        let merged = merge_for_module("mod", &routes_schema(), &sources);
        assert_eq!(merged["list"], json!([4]));
    }

    #[test]
    fn sources_without_module_contribute_nothing() {
        let sources = [
            json!({ "other": { "x": 1 } }),
            json!({ "mod": null }),
            json!({ "mod": { "x": 3 } }),
        ];
        let merged = merge_for_module("mod", &routes_schema(), &sources);
        assert_eq!(Value::Object(merged), json!({ "x": 3 }));
    }

    #[test]
    fn merge_does_not_mutate_inputs() {
        let first = json!({ "mod": { "nested": { "a": 1 } } });
        let second = json!({ "mod": { "nested": { "b": 2 } } });
        let before = first.clone();
        let _ = merge_for_module("mod", &routes_schema(), [&first, &second]);
        assert_eq!(first, before);
    }

    #[test]
    fn non_object_module_entries_are_skipped() {
        let sources = [json!({ "mod": { "x": 1 } }), json!({ "mod": "oops" })];
        let merged = merge_for_module("mod", &routes_schema(), &sources);
        assert_eq!(Value::Object(merged), json!({ "x": 1 }));
    }

    #[test]
    fn dictionaries_are_replaced_not_merged() {
        let sources = [
            json!({ "mod": { "routes": { "a": { "url": "/a" } } } }),
            json!({ "mod": { "routes": { "b": { "url": "/b" } } } }),
        ];
        let merged = merge_for_module("mod", &routes_schema(), &sources);
        assert_eq!(merged["routes"], json!({ "b": { "url": "/b" } }));
    }

    #[test]
    fn nested_dictionaries_are_replaced() {
        let sources = [
            json!({ "mod": { "nested": { "tags": { "a": "1" }, "free": { "k": 1 } } } }),
            json!({ "mod": { "nested": { "tags": { "b": "2" }, "free": { "j": 2 } } } }),
        ];
        let merged = merge_for_module("mod", &routes_schema(), &sources);
        assert_eq!(
            merged["nested"],
            json!({ "tags": { "b": "2" }, "free": { "k": 1, "j": 2 } })
        );
    }
}
