//! Cross-field refinement evaluation and the CEL extension point.
//!
//! Refinements are the only rules that see more than one field at a time, so
//! they are the source of submit-time rejections that per-field validation
//! cannot anticipate.

use serde_json::Value;

use crate::condition::evaluate_condition;
use crate::error::{EvaluationError, FieldIssue, IssueCode};
use crate::primitives::{FieldPath, is_empty_value, resolve_path, values_strict_equal};
use crate::schema::Refinement;

// ─── CelEvaluator ───────────────────────────────────────────────────────────

/// Extension point for CEL expression evaluation.
///
/// See [`DefaultCelEvaluator`] (requires the `cel-eval` feature) for the
/// bundled implementation.
pub trait CelEvaluator {
    /// Evaluates a CEL expression against a context of named variables.
    ///
    /// `context` is a JSON object where each key is a variable name available
    /// in the expression.
    fn evaluate(&self, expression: &str, context: &Value) -> Result<Value, EvaluationError>;
}

/// Default CEL evaluator backed by the `cel` crate.
#[cfg(feature = "cel-eval")]
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCelEvaluator;

/// Convenience constructor for [`DefaultCelEvaluator`].
#[cfg(feature = "cel-eval")]
pub fn default_cel_evaluator() -> DefaultCelEvaluator {
    DefaultCelEvaluator
}

#[cfg(feature = "cel-eval")]
impl CelEvaluator for DefaultCelEvaluator {
    fn evaluate(&self, expression: &str, context: &Value) -> Result<Value, EvaluationError> {
        let program = cel::Program::compile(expression).map_err(|e| EvaluationError {
            message: format!("CEL compile error: {}", e),
        })?;

        let mut cel_ctx = cel::Context::default();
        if let Value::Object(map) = context {
            for (key, value) in map {
                cel_ctx.add_variable_from_value(key.as_str(), json_to_cel(value));
            }
        }

        match program.execute(&cel_ctx) {
            Ok(result) => Ok(cel_to_json(&result)),
            // A missing field fails the rule rather than erroring out.
            Err(cel::ExecutionError::NoSuchKey(_)) => Ok(Value::Bool(false)),
            Err(cel::ExecutionError::UndeclaredReference(_)) => Ok(Value::Bool(false)),
            Err(e) => Err(EvaluationError {
                message: format!("CEL execution error: {}", e),
            }),
        }
    }
}

#[cfg(feature = "cel-eval")]
fn json_to_cel(value: &Value) -> cel::Value {
    use std::collections::HashMap;
    use std::sync::Arc;

    match value {
        Value::Null => cel::Value::Null,
        Value::Bool(b) => cel::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                cel::Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                cel::Value::UInt(u)
            } else if let Some(f) = n.as_f64() {
                cel::Value::Float(f)
            } else {
                cel::Value::Null
            }
        }
        Value::String(s) => cel::Value::String(Arc::new(s.clone())),
        Value::Array(arr) => cel::Value::List(Arc::new(arr.iter().map(json_to_cel).collect())),
        Value::Object(map) => {
            let entries: HashMap<String, cel::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_cel(v)))
                .collect();
            entries.into()
        }
    }
}

#[cfg(feature = "cel-eval")]
fn cel_to_json(value: &cel::Value) -> Value {
    match value {
        cel::Value::Null => Value::Null,
        cel::Value::Bool(b) => Value::Bool(*b),
        cel::Value::Int(i) => Value::Number((*i).into()),
        cel::Value::UInt(u) => Value::Number((*u).into()),
        cel::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        cel::Value::String(s) => Value::String(s.to_string()),
        cel::Value::List(l) => Value::Array(l.iter().map(cel_to_json).collect()),
        cel::Value::Map(m) => {
            let mut obj = serde_json::Map::new();
            for (key, val) in m.map.iter() {
                let k = match key {
                    cel::objects::Key::String(s) => s.to_string(),
                    cel::objects::Key::Int(i) => i.to_string(),
                    cel::objects::Key::Uint(u) => u.to_string(),
                    cel::objects::Key::Bool(b) => b.to_string(),
                };
                obj.insert(k, cel_to_json(val));
            }
            Value::Object(obj)
        }
        _ => Value::Null,
    }
}

// ─── Refinements ────────────────────────────────────────────────────────────

/// Outcome of one refinement.
#[derive(Clone, Debug, PartialEq)]
pub enum RefinementOutcome {
    Passed,
    Failed(FieldIssue),
    /// The refinement could not run (an expression without an evaluator).
    Skipped(String),
}

/// Evaluates a refinement against the normalized value of the object that
/// declares it. `at` is that object's path; issue paths are built beneath it.
pub fn evaluate_refinement(
    refinement: &Refinement,
    object: &Value,
    at: &FieldPath,
    evaluator: Option<&dyn CelEvaluator>,
) -> RefinementOutcome {
    match refinement {
        Refinement::Matches {
            field,
            other,
            message,
        } => {
            let a = lookup(field, object);
            let b = lookup(other, object);
            if values_strict_equal(a.unwrap_or(&Value::Null), b.unwrap_or(&Value::Null)) {
                RefinementOutcome::Passed
            } else {
                RefinementOutcome::Failed(FieldIssue {
                    code: IssueCode::Refinement,
                    path: child_path(at, other),
                    message: message
                        .clone()
                        .unwrap_or_else(|| format!("Must match {}", field)),
                })
            }
        }
        Refinement::RequiredIf {
            field,
            when,
            message,
        } => {
            if !evaluate_condition(when, object, object) {
                return RefinementOutcome::Passed;
            }
            if lookup(field, object).is_some_and(|v| !is_empty_value(v)) {
                RefinementOutcome::Passed
            } else {
                RefinementOutcome::Failed(FieldIssue {
                    code: IssueCode::Required,
                    path: child_path(at, field),
                    message: message.clone().unwrap_or_else(|| "Required".to_string()),
                })
            }
        }
        Refinement::Expression { cel, path, message } => {
            let Some(evaluator) = evaluator else {
                return RefinementOutcome::Skipped(format!(
                    "no CEL evaluator available for '{}'",
                    cel
                ));
            };
            let issue_path = match path {
                Some(p) => child_path(at, p),
                None => at.to_string(),
            };
            let failed = |reason: String| {
                RefinementOutcome::Failed(FieldIssue {
                    code: IssueCode::Refinement,
                    path: issue_path.clone(),
                    message: message.clone().unwrap_or(reason),
                })
            };

            let mut context = match object {
                Value::Object(map) => map.clone(),
                _ => serde_json::Map::new(),
            };
            context.insert("value".to_string(), object.clone());

            match evaluator.evaluate(cel, &Value::Object(context)) {
                Ok(Value::Bool(true)) => RefinementOutcome::Passed,
                Ok(Value::Bool(false)) => failed("Invalid value".to_string()),
                Ok(other) => failed(format!(
                    "Refinement returned a non-boolean result: {}",
                    other
                )),
                Err(e) => failed(e.message),
            }
        }
    }
}

fn lookup<'a>(field: &str, object: &'a Value) -> Option<&'a Value> {
    resolve_path(&FieldPath::parse(field)?, object)
}

fn child_path(at: &FieldPath, relative: &str) -> String {
    if at.is_root() {
        relative.to_string()
    } else {
        format!("{}.{}", at, relative)
    }
}
