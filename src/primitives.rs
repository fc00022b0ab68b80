//! Shared primitives: field paths, label derivation and the loose value
//! semantics used by conditions and the required check.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

// ─── Field paths ────────────────────────────────────────────────────────────

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location of a node in the state tree: `name`, `address.city`,
/// `contacts[2].email`.
///
/// The empty path addresses the root object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    /// Parses the textual path syntax.
    ///
    /// Returns `None` for malformed input: leading or doubled dots, unclosed
    /// or non-numeric brackets, or an index that does not follow a field name.
    pub fn parse(input: &str) -> Option<FieldPath> {
        if input.is_empty() {
            return Some(FieldPath::root());
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let chars: Vec<char> = input.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    if current.is_empty() {
                        // `a..b`, `.a` and `a.` are all rejected; `a[0].b` is fine
                        if !matches!(segments.last(), Some(PathSegment::Index(_)))
                            || i + 1 == chars.len()
                        {
                            return None;
                        }
                    } else {
                        segments.push(PathSegment::Field(std::mem::take(&mut current)));
                        if i + 1 == chars.len() {
                            return None;
                        }
                    }
                    i += 1;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::Field(std::mem::take(&mut current)));
                    }
                    if segments.is_empty() {
                        return None;
                    }
                    let close = chars[i + 1..].iter().position(|c| *c == ']')? + i + 1;
                    let digits: String = chars[i + 1..close].iter().collect();
                    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                        return None;
                    }
                    segments.push(PathSegment::Index(digits.parse().ok()?));
                    i = close + 1;
                    if i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                        return None;
                    }
                }
                ']' => return None,
                c => {
                    current.push(c);
                    i += 1;
                }
            }
        }

        if !current.is_empty() {
            segments.push(PathSegment::Field(current));
        }

        Some(FieldPath(segments))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path extended by a field name.
    pub fn field(&self, name: &str) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.to_string()));
        FieldPath(segments)
    }

    /// Returns a new path extended by an array index.
    pub fn index(&self, index: usize) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        FieldPath(segments)
    }

    pub fn parent(&self) -> Option<FieldPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(FieldPath(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// The innermost field name, ignoring trailing indices.
    pub fn leaf_name(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|s| match s {
            PathSegment::Field(name) => Some(name.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    /// The first field name of the path (the top-level field it belongs to).
    pub fn top_level(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Field(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// True if `self` equals `prefix` or lies beneath it.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// The path with every index replaced by `[]`, e.g. `contacts[].email`.
    ///
    /// Used to address all items of a repeating field at once.
    pub fn template(&self) -> String {
        let mut out = String::new();
        for seg in &self.0 {
            match seg {
                PathSegment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSegment::Index(_) => out.push_str("[]"),
            }
        }
        out
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            match seg {
                PathSegment::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
            }
            first = false;
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FieldPath::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid field path: '{}'", raw)))
    }
}

impl std::str::FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s).ok_or_else(|| format!("invalid field path: '{}'", s))
    }
}

/// Resolves a field path against a JSON value tree.
///
/// Returns `None` when any segment fails to resolve. The root path returns the
/// value itself.
pub fn resolve_path<'a>(path: &FieldPath, value: &'a Value) -> Option<&'a Value> {
    let mut current = value;
    for seg in path.segments() {
        current = match seg {
            PathSegment::Field(name) => current.as_object()?.get(name)?,
            PathSegment::Index(i) => current.as_array()?.get(*i)?,
        };
    }
    Some(current)
}

// ─── Labels ─────────────────────────────────────────────────────────────────

/// Splits a `"Label|Hint"` description on the first `|`.
///
/// Both halves are trimmed; an empty half becomes `None`.
pub fn split_description(description: &str) -> (Option<String>, Option<String>) {
    let (label, hint) = match description.find('|') {
        Some(pos) => (&description[..pos], Some(&description[pos + 1..])),
        None => (description, None),
    };
    let label = Some(label.trim()).filter(|s| !s.is_empty()).map(str::to_string);
    let hint = hint
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    (label, hint)
}

/// Derives a display label from a field identifier: a space is inserted before
/// every internal capital and the first letter is upper-cased.
///
/// `hourlyRate` → `Hourly Rate`, `email` → `Email`.
pub fn title_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for (i, c) in identifier.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                out.push(' ');
            }
            out.push(c);
        }
    }
    out
}

// ─── Value semantics ────────────────────────────────────────────────────────

/// Emptiness as seen by the required check: `null`, a blank string, or an
/// empty list.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Loose truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy; every
/// other value (including empty lists and objects) is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Reads a value as a finite number. Numeric strings are accepted since text
/// inputs commonly hold digits; anything else yields `None`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Strict equality: same JSON type and same value. Numbers compare
/// numerically, so `1` and `1.0` are equal.
pub fn values_strict_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_strict_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| {
                    y.get(k).is_some_and(|other| values_strict_equal(v, other))
                })
        }
        _ => a == b,
    }
}

/// Converts an `f64` into a JSON number, preferring the integer form when
/// the value is integral.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::Number((n as i64).into())
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
