//! Field-visibility conditions.
//!
//! A condition makes one field's visibility depend on another field's current
//! value. Evaluation is pure: the same condition over the same snapshot always
//! yields the same answer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::ConditionOperator;
use crate::primitives::{FieldPath, as_number, is_truthy, resolve_path, values_strict_equal};

/// `{field, operator, value?}`: compares the value at `field` against `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: Option<Value>) -> Self {
        Condition {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::new(field, ConditionOperator::Equals, Some(value.into()))
    }

    pub fn truthy(field: impl Into<String>) -> Self {
        Condition::new(field, ConditionOperator::Truthy, None)
    }
}

/// Resolves a condition's target field.
///
/// The target is looked up in `scope` first (the object enclosing the field
/// that carries the condition, so items of a repeating group can refer to
/// their siblings) and then from `root`. A target that is not a valid path, or
/// that resolves nowhere, yields `None`.
pub fn resolve_target<'a>(field: &str, scope: &'a Value, root: &'a Value) -> Option<&'a Value> {
    let path = FieldPath::parse(field)?;
    resolve_path(&path, scope).or_else(|| resolve_path(&path, root))
}

/// Evaluates a condition against a value snapshot.
///
/// `scope` is the enclosing object of the conditioned field; pass the root
/// twice for top-level fields.
pub fn evaluate_condition(condition: &Condition, scope: &Value, root: &Value) -> bool {
    let target = resolve_target(&condition.field, scope, root);
    apply_operator(condition.operator, target, condition.value.as_ref())
}

/// Applies an operator to a resolved target (`None` when the target is
/// missing) and an optional comparison value.
pub fn apply_operator(
    operator: ConditionOperator,
    target: Option<&Value>,
    expected: Option<&Value>,
) -> bool {
    match operator {
        ConditionOperator::Truthy => is_truthy(target),
        ConditionOperator::Falsy => !is_truthy(target),
        ConditionOperator::Equals => strict_eq(target, expected),
        ConditionOperator::NotEquals => !strict_eq(target, expected),
        ConditionOperator::Contains => contains(target, expected),
        ConditionOperator::GreaterThan => {
            compare(target, expected).is_some_and(|(a, b)| a > b)
        }
        ConditionOperator::LessThan => compare(target, expected).is_some_and(|(a, b)| a < b),
    }
}

fn strict_eq(target: Option<&Value>, expected: Option<&Value>) -> bool {
    let target = target.unwrap_or(&Value::Null);
    let expected = expected.unwrap_or(&Value::Null);
    values_strict_equal(target, expected)
}

fn contains(target: Option<&Value>, expected: Option<&Value>) -> bool {
    let (Some(target), Some(expected)) = (target, expected) else {
        return false;
    };
    match target {
        Value::Array(items) => items.iter().any(|item| values_strict_equal(item, expected)),
        Value::Null | Value::Object(_) => false,
        scalar => {
            let haystack = scalar_text(scalar).to_lowercase();
            let needle = scalar_text(expected).to_lowercase();
            haystack.contains(&needle)
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compare(target: Option<&Value>, expected: Option<&Value>) -> Option<(f64, f64)> {
    let a = as_number(target?)?;
    let b = as_number(expected?)?;
    Some((a, b))
}
