//! Validation: the per-leaf bridge and full-schema validation.
//!
//! Both run the same generic interpreter over the schema's constraint
//! descriptors. The bridge ([`validate_leaf`]) runs on every write to a leaf
//! and reports only the first failure. [`validate_value`] runs at submit over
//! the whole value and reports **all** failures.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use crate::error::{FieldIssue, IssueCode};
use crate::evaluate::{CelEvaluator, RefinementOutcome, evaluate_refinement};
use crate::introspect::FieldDescriptor;
use crate::normalize::{normalize_node, normalize_value};
use crate::primitives::{FieldPath, is_empty_value, number_value};
use crate::schema::{CheckRule, LeafShape, Scalar, SchemaNode, Shape};

// ─── Cached regexes ─────────────────────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+\S*$").unwrap());

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

/// Compiled `pattern` checks keyed by source; `None` marks an invalid pattern.
static PATTERNS: LazyLock<Mutex<HashMap<String, Option<Regex>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn compiled_pattern(pattern: &str) -> Option<Regex> {
    let mut patterns = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(compiled) = patterns.get(pattern) {
        return compiled.clone();
    }
    let compiled = Regex::new(pattern).ok();
    patterns.insert(pattern.to_string(), compiled.clone());
    compiled
}

// ─── Bridge ─────────────────────────────────────────────────────────────────

/// Validates one leaf value against its descriptor.
///
/// A required descriptor first gets a synthetic non-empty check, so an empty
/// required field fails on first interaction even when the schema rule alone
/// would accept it. `null` on a nullable descriptor is not empty. The schema
/// rule runs next. Returns the first failure message.
pub fn validate_leaf(descriptor: &FieldDescriptor, value: &Value) -> Result<(), String> {
    let accepted_null = descriptor.nullable && value.is_null();
    if descriptor.required && !accepted_null && is_empty_value(value) {
        return Err(format!("{} is required", descriptor.label));
    }
    validate_rule(&descriptor.schema, value)
}

/// Runs a field's own schema rule on a single value and returns the first
/// failure message.
pub fn validate_rule(schema: &SchemaNode, value: &Value) -> Result<(), String> {
    let normalized = normalize_node(schema, Some(value));
    let mut issues = Vec::new();
    check_node(
        schema,
        normalized.as_ref(),
        &FieldPath::root(),
        &mut Checker::new(None, &[]),
        &mut issues,
    );
    match issues.into_iter().next() {
        Some(issue) => Err(issue.message),
        None => Ok(()),
    }
}

// ─── Full-schema validation ─────────────────────────────────────────────────

/// Validates a whole value against a schema.
///
/// The value is normalized first (defaults applied, unknown keys dropped,
/// empty optionals removed). On success the normalized value is returned; on
/// failure every issue found, in traversal order.
pub fn validate_value(
    schema: &SchemaNode,
    value: &Value,
    evaluator: Option<&dyn CelEvaluator>,
) -> Result<Value, Vec<FieldIssue>> {
    validate_value_except(schema, value, evaluator, &[])
}

/// Like [`validate_value`], but every node at one of the concrete `exempt`
/// paths passes unchecked. Refinements of the enclosing objects still run.
pub fn validate_value_except(
    schema: &SchemaNode,
    value: &Value,
    evaluator: Option<&dyn CelEvaluator>,
    exempt: &[FieldPath],
) -> Result<Value, Vec<FieldIssue>> {
    let normalized = normalize_node(schema, Some(value));
    let mut issues = Vec::new();
    let mut checker = Checker::new(evaluator, exempt);
    check_node(
        schema,
        normalized.as_ref(),
        &FieldPath::root(),
        &mut checker,
        &mut issues,
    );
    for skipped in checker.skipped {
        tracing::warn!(reason = %skipped, "refinement skipped");
    }
    if issues.is_empty() {
        Ok(normalized.unwrap_or_else(|| normalize_value(schema, value)))
    } else {
        Err(issues)
    }
}

struct Checker<'a> {
    evaluator: Option<&'a dyn CelEvaluator>,
    exempt: &'a [FieldPath],
    skipped: Vec<String>,
}

impl<'a> Checker<'a> {
    fn new(evaluator: Option<&'a dyn CelEvaluator>, exempt: &'a [FieldPath]) -> Self {
        Checker {
            evaluator,
            exempt,
            skipped: Vec::new(),
        }
    }
}

fn issue(code: IssueCode, path: &FieldPath, message: impl Into<String>) -> FieldIssue {
    FieldIssue {
        code,
        path: path.to_string(),
        message: message.into(),
    }
}

/// Checks an already-normalized node. `None` means the key is absent.
fn check_node(
    schema: &SchemaNode,
    value: Option<&Value>,
    path: &FieldPath,
    checker: &mut Checker<'_>,
    issues: &mut Vec<FieldIssue>,
) {
    if checker.exempt.contains(path) {
        return;
    }
    let peeled = schema.peel();
    let value = match value {
        None => {
            if !peeled.optional {
                issues.push(issue(IssueCode::Required, path, "Required"));
            }
            return;
        }
        Some(Value::Null) => {
            if !peeled.optional && !peeled.nullable {
                issues.push(issue(IssueCode::Required, path, "Required"));
            }
            return;
        }
        Some(v) => v,
    };

    match &peeled.core.shape {
        Shape::Leaf(leaf) => {
            if let Err((code, message)) = check_leaf(leaf, value) {
                issues.push(issue(code, path, message));
            }
        }
        Shape::Object(object) => {
            let Some(map) = value.as_object() else {
                issues.push(issue(IssueCode::InvalidType, path, "Expected object"));
                return;
            };
            let before = issues.len();
            for (name, child) in &object.fields {
                check_node(child, map.get(name), &path.field(name), checker, issues);
            }
            // Refinements only see objects whose fields all passed.
            if issues.len() > before {
                return;
            }
            for refinement in &object.refinements {
                match evaluate_refinement(refinement, value, path, checker.evaluator) {
                    RefinementOutcome::Passed => {}
                    RefinementOutcome::Failed(failure) => issues.push(failure),
                    RefinementOutcome::Skipped(reason) => checker.skipped.push(reason),
                }
            }
        }
        Shape::Array(array) => {
            let Some(items) = value.as_array() else {
                issues.push(issue(IssueCode::InvalidType, path, "Expected list"));
                return;
            };
            if let Some(min) = array.min_items
                && items.len() < min
            {
                issues.push(issue(
                    IssueCode::TooFewItems,
                    path,
                    format!("Must contain at least {} item(s)", min),
                ));
            }
            if let Some(max) = array.max_items
                && items.len() > max
            {
                issues.push(issue(
                    IssueCode::TooManyItems,
                    path,
                    format!("Must contain at most {} item(s)", max),
                ));
            }
            for (i, item) in items.iter().enumerate() {
                check_node(&array.item, Some(item), &path.index(i), checker, issues);
            }
        }
        Shape::Optional(_) | Shape::Nullable(_) => {}
    }
}

/// Interprets a leaf's scalar type and checks. Returns the first failure.
pub fn check_leaf(leaf: &LeafShape, value: &Value) -> Result<(), (IssueCode, String)> {
    match &leaf.scalar {
        Scalar::String => {
            let s = expect_str(value, "Expected text")?;
            check_string_rules(leaf, s)
        }
        Scalar::Date => {
            let s = expect_str(value, "Expected a date")?;
            if !is_valid_date(s) {
                return Err((IssueCode::InvalidFormat, "Invalid date".to_string()));
            }
            Ok(())
        }
        Scalar::Enum(options) => {
            let s = expect_str(value, "Expected one of the listed options")?;
            if !options.iter().any(|o| o == s) {
                return Err((
                    IssueCode::InvalidOption,
                    format!("Must be one of: {}", options.join(", ")),
                ));
            }
            Ok(())
        }
        Scalar::Number | Scalar::Integer => {
            let n = value
                .as_f64()
                .filter(|f| f.is_finite())
                .ok_or_else(|| (IssueCode::InvalidType, "Expected number".to_string()))?;
            if leaf.scalar == Scalar::Integer && n.fract() != 0.0 {
                return Err((IssueCode::InvalidType, "Must be an integer".to_string()));
            }
            check_number_rules(leaf, n)
        }
        Scalar::Boolean => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err((IssueCode::InvalidType, "Expected true or false".to_string()))
            }
        }
        Scalar::Unknown => Ok(()),
    }
}

fn expect_str<'v>(value: &'v Value, message: &str) -> Result<&'v str, (IssueCode, String)> {
    value
        .as_str()
        .ok_or_else(|| (IssueCode::InvalidType, message.to_string()))
}

fn check_string_rules(leaf: &LeafShape, s: &str) -> Result<(), (IssueCode, String)> {
    let len = s.chars().count();
    for check in &leaf.checks {
        let failure = match &check.rule {
            CheckRule::MinLength(n) if len < *n => Some((
                IssueCode::TooSmall,
                format!("Must be at least {} character(s)", n),
            )),
            CheckRule::MaxLength(n) if len > *n => Some((
                IssueCode::TooBig,
                format!("Must be at most {} character(s)", n),
            )),
            CheckRule::Email if !EMAIL_RE.is_match(s) => {
                Some((IssueCode::InvalidFormat, "Invalid email address".to_string()))
            }
            CheckRule::Url if !URL_RE.is_match(s) => {
                Some((IssueCode::InvalidFormat, "Invalid URL".to_string()))
            }
            CheckRule::Pattern(p) => match compiled_pattern(p) {
                Some(re) if re.is_match(s) => None,
                Some(_) => Some((IssueCode::InvalidFormat, "Invalid format".to_string())),
                None => Some((
                    IssueCode::InvalidFormat,
                    format!("Invalid pattern: {}", p),
                )),
            },
            _ => None,
        };
        if let Some((code, default_message)) = failure {
            return Err((code, check.message.clone().unwrap_or(default_message)));
        }
    }
    Ok(())
}

fn check_number_rules(leaf: &LeafShape, n: f64) -> Result<(), (IssueCode, String)> {
    for check in &leaf.checks {
        let failure = match &check.rule {
            CheckRule::Min(min) if n < *min => Some((
                IssueCode::TooSmall,
                format!("Must be at least {}", number_value(*min)),
            )),
            CheckRule::Max(max) if n > *max => Some((
                IssueCode::TooBig,
                format!("Must be at most {}", number_value(*max)),
            )),
            CheckRule::Integer if n.fract() != 0.0 => {
                Some((IssueCode::InvalidType, "Must be an integer".to_string()))
            }
            _ => None,
        };
        if let Some((code, default_message)) = failure {
            return Err((code, check.message.clone().unwrap_or(default_message)));
        }
    }
    Ok(())
}

fn is_valid_date(s: &str) -> bool {
    let Some(caps) = DATE_RE.captures(s) else {
        return false;
    };
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (Some(year), Some(month), Some(day)) = (field(1), field(2), field(3)) else {
        return false;
    };
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days).contains(&day)
}
