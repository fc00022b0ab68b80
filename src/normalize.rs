//! Schema normalization of raw values.
//!
//! Normalization never fails. It materializes defaults, drops keys the schema
//! does not declare, keeps declared keys in declaration order and removes
//! optional fields whose value is empty. Whatever it cannot interpret (a
//! string where an object belongs, say) is passed through untouched for
//! validation to report.
//!
//! This is idempotent: `normalize_value(s, &normalize_value(s, v)) ==
//! normalize_value(s, v)`.

use serde_json::{Map, Value};

use crate::schema::{SchemaNode, Shape};

/// Normalizes a whole value against a schema. An absent result is rendered
/// as `null`.
pub fn normalize_value(schema: &SchemaNode, value: &Value) -> Value {
    normalize_node(schema, Some(value)).unwrap_or(Value::Null)
}

/// Normalizes one node. `None` means the value is absent and its key should be
/// omitted from the enclosing object.
pub fn normalize_node(schema: &SchemaNode, value: Option<&Value>) -> Option<Value> {
    let peeled = schema.peel();
    let core = peeled.core;

    let present = value.filter(|v| match v {
        Value::Null => peeled.nullable && !peeled.optional,
        Value::String(s) if peeled.optional => !s.is_empty(),
        _ => true,
    });

    let value = match present {
        Some(v) => v,
        None => {
            if let Some(default) = schema.effective_default() {
                if default.is_null() {
                    return Some(Value::Null);
                }
                return normalize_node(core, Some(default));
            }
            if peeled.optional {
                return None;
            }
            // Required but missing: keep whatever was there so validation can
            // report it.
            return value.cloned();
        }
    };

    match (&core.shape, value) {
        (_, Value::Null) => Some(Value::Null),
        (Shape::Object(object), Value::Object(map)) => {
            let mut out = Map::new();
            for (name, child) in &object.fields {
                if let Some(v) = normalize_node(child, map.get(name)) {
                    out.insert(name.clone(), v);
                }
            }
            Some(Value::Object(out))
        }
        (Shape::Array(array), Value::Array(items)) => Some(Value::Array(
            items
                .iter()
                .map(|item| normalize_node(&array.item, Some(item)).unwrap_or(Value::Null))
                .collect(),
        )),
        _ => Some(value.clone()),
    }
}
