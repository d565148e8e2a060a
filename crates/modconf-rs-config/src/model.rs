//! Schema tree model for module configuration.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Child map of an object node; also the root of every module schema.
pub type ObjectSchema = BTreeMap<String, SchemaNode>;

/// A resolved or partially provided config object for one module.
pub type ConfigObject = Map<String, Value>;

/// Signature of a validator check: `Some(message)` rejects the value.
type CheckFn = dyn Fn(&Value) -> Option<String> + Send + Sync;

/// A named value check attached to a schema node.
#[derive(Clone)]
pub struct Validator {
    name: Option<String>,
    check: Arc<CheckFn>,
}

impl Validator {
    /// Wrap an anonymous check.
    pub fn new(check: impl Fn(&Value) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            name: None,
            check: Arc::new(check),
        }
    }

    /// Wrap a check under a name, used for registry lookups and debugging.
    pub fn named(
        name: impl Into<String>,
        check: impl Fn(&Value) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Some(name.into()),
            check: Arc::new(check),
        }
    }

    /// Name the validator was registered under, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Run the check, returning an error message on failure.
    pub fn check(&self, value: &Value) -> Option<String> {
        (self.check)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Validator({name})"),
            None => write!(f, "Validator(<anonymous>)"),
        }
    }
}

/// Shape of a schema node.
///
/// The variant is authoritative: only `Object` nodes are walked structurally,
/// a `Leaf` whose value happens to be an object is treated as freeform.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    /// A concrete value with a default.
    Leaf { default: Value },
    /// A nested group of keys, each with its own schema.
    Object(ObjectSchema),
    /// A sequence whose elements conform to `elements`.
    Array {
        default: Value,
        elements: Box<SchemaNode>,
    },
    /// An arbitrary-keyed map whose values conform to `elements`.
    Dictionary {
        default: Value,
        elements: Box<SchemaNode>,
    },
}

/// One node of a module schema tree.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub validators: Vec<Validator>,
    pub description: Option<String>,
}

impl SchemaNode {
    fn from_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            validators: Vec::new(),
            description: None,
        }
    }

    /// A leaf with the given default.
    pub fn leaf(default: impl Into<Value>) -> Self {
        Self::from_kind(SchemaKind::Leaf {
            default: default.into(),
        })
    }

    /// An object node from `(key, node)` pairs.
    pub fn object<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self::from_kind(SchemaKind::Object(schema(children)))
    }

    /// An array node with a default and an element schema.
    pub fn array(default: impl Into<Value>, elements: SchemaNode) -> Self {
        Self::from_kind(SchemaKind::Array {
            default: default.into(),
            elements: Box::new(elements),
        })
    }

    /// A dictionary node with a default and a schema for every entry value.
    pub fn dictionary(default: impl Into<Value>, elements: SchemaNode) -> Self {
        Self::from_kind(SchemaKind::Dictionary {
            default: default.into(),
            elements: Box::new(elements),
        })
    }

    /// Append a validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Attach a human readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declared default, absent for object nodes.
    pub fn default_value(&self) -> Option<&Value> {
        match &self.kind {
            SchemaKind::Leaf { default }
            | SchemaKind::Array { default, .. }
            | SchemaKind::Dictionary { default, .. } => Some(default),
            SchemaKind::Object(_) => None,
        }
    }

    /// Child schema when this is an object node.
    pub fn children(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(children) => Some(children),
            _ => None,
        }
    }
}

/// Build an object schema from `(key, node)` pairs.
pub fn schema<I, K>(entries: I) -> ObjectSchema
where
    I: IntoIterator<Item = (K, SchemaNode)>,
    K: Into<String>,
{
    entries
        .into_iter()
        .map(|(key, node)| (key.into(), node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn object_nodes_have_no_default() {
        let node = SchemaNode::object([("inner", SchemaNode::leaf(1))]);
        assert!(node.default_value().is_none());
        assert_eq!(node.children().map(|c| c.len()), Some(1));
    }

    #[test]
    fn array_nodes_expose_their_default() {
        let node = SchemaNode::array(json!([1, 2]), SchemaNode::leaf(json!(null)));
        assert_eq!(node.default_value(), Some(&json!([1, 2])));
        assert!(node.children().is_none());
    }

    #[test]
    fn validator_debug_uses_name() {
        let named = Validator::named("isString", |_| None);
        let anonymous = Validator::new(|_| None);
        assert_eq!(format!("{named:?}"), "Validator(isString)");
        assert_eq!(format!("{anonymous:?}"), "Validator(<anonymous>)");
    }
}
