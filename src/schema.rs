//! The schema model consumed by the engine.
//!
//! A schema is a closed, explicitly tagged union of node shapes. Validation
//! rules are serializable constraint descriptors ([`Check`]) rather than
//! closures, so they can be inspected, linted and tested without building a
//! form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::condition::Condition;
use crate::primitives::{FieldPath, PathSegment, number_value};

// ─── Nodes ──────────────────────────────────────────────────────────────────

/// A schema node: a shape plus an optional `"Label|Hint"` description and an
/// optional default value.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaNode {
    pub shape: Shape,
    pub description: Option<String>,
    pub default: Option<Value>,
}

/// The closed set of node shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Leaf(LeafShape),
    Object(ObjectShape),
    Array(ArrayShape),
    Optional(Box<SchemaNode>),
    Nullable(Box<SchemaNode>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeafShape {
    pub scalar: Scalar,
    pub checks: Vec<Check>,
}

/// Scalar type of a leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    String,
    Number,
    Integer,
    Boolean,
    Enum(Vec<String>),
    /// ISO-8601 calendar date held as a string.
    Date,
    /// Any shape the engine has no dedicated handling for. Presented as text
    /// and accepted as-is by validation.
    Unknown,
}

impl Scalar {
    pub fn name(&self) -> &'static str {
        match self {
            Scalar::String => "string",
            Scalar::Number => "number",
            Scalar::Integer => "integer",
            Scalar::Boolean => "boolean",
            Scalar::Enum(_) => "enum",
            Scalar::Date => "date",
            Scalar::Unknown => "unknown",
        }
    }
}

/// Named child nodes in declaration order, plus cross-field refinements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectShape {
    pub fields: Vec<(String, SchemaNode)>,
    pub refinements: Vec<Refinement>,
}

impl ObjectShape {
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayShape {
    pub item: Box<SchemaNode>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

// ─── Checks ─────────────────────────────────────────────────────────────────

/// A serializable constraint descriptor with an optional custom message.
#[derive(Clone, Debug, PartialEq)]
pub struct Check {
    pub rule: CheckRule,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CheckRule {
    /// Inclusive numeric lower bound.
    Min(f64),
    /// Inclusive numeric upper bound.
    Max(f64),
    /// Minimum string length in characters.
    MinLength(usize),
    /// Maximum string length in characters.
    MaxLength(usize),
    Email,
    Url,
    /// Regular expression the whole string must match somewhere.
    Pattern(String),
    /// Number must be integral.
    Integer,
}

impl CheckRule {
    fn key(&self) -> &'static str {
        match self {
            CheckRule::Min(_) => "min",
            CheckRule::Max(_) => "max",
            CheckRule::MinLength(_) => "min_length",
            CheckRule::MaxLength(_) => "max_length",
            CheckRule::Email => "email",
            CheckRule::Url => "url",
            CheckRule::Pattern(_) => "pattern",
            CheckRule::Integer => "integer",
        }
    }

    fn argument(&self) -> Option<Value> {
        match self {
            CheckRule::Min(n) | CheckRule::Max(n) => Some(number_value(*n)),
            CheckRule::MinLength(n) | CheckRule::MaxLength(n) => Some(Value::from(*n)),
            CheckRule::Pattern(p) => Some(Value::String(p.clone())),
            CheckRule::Email | CheckRule::Url | CheckRule::Integer => None,
        }
    }
}

impl From<CheckRule> for Check {
    fn from(rule: CheckRule) -> Self {
        Check {
            rule,
            message: None,
        }
    }
}

impl Serialize for Check {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        match (self.rule.argument(), &self.message) {
            (None, None) => serializer.serialize_str(self.rule.key()),
            (arg, message) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry(self.rule.key(), &arg.unwrap_or(Value::Bool(true)))?;
                if let Some(m) = message {
                    map.serialize_entry("message", m)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Check {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        check_from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn check_from_value(value: &Value) -> Result<Check, String> {
    match value {
        Value::String(s) => Ok(Check::from(flag_rule(s)?)),
        Value::Object(map) => {
            let message = match map.get("message") {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => return Err(format!("check message must be a string, got {}", other)),
            };
            let mut rule = None;
            for (key, arg) in map {
                if key == "message" {
                    continue;
                }
                if rule.is_some() {
                    return Err(format!("check has more than one rule key: '{}'", key));
                }
                rule = Some(rule_from_entry(key, arg)?);
            }
            let rule = rule.ok_or_else(|| "check object has no rule key".to_string())?;
            Ok(Check { rule, message })
        }
        other => Err(format!("check must be a string or object, got {}", other)),
    }
}

fn flag_rule(key: &str) -> Result<CheckRule, String> {
    match key {
        "email" => Ok(CheckRule::Email),
        "url" => Ok(CheckRule::Url),
        "integer" | "int" => Ok(CheckRule::Integer),
        other => Err(format!("unknown check: '{}'", other)),
    }
}

fn rule_from_entry(key: &str, arg: &Value) -> Result<CheckRule, String> {
    let number = || {
        arg.as_f64()
            .ok_or_else(|| format!("check '{}' expects a number, got {}", key, arg))
    };
    let length = || {
        arg.as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| format!("check '{}' expects a non-negative integer, got {}", key, arg))
    };
    match key {
        "min" | "gte" => Ok(CheckRule::Min(number()?)),
        "max" | "lte" => Ok(CheckRule::Max(number()?)),
        "min_length" | "minLength" => Ok(CheckRule::MinLength(length()?)),
        "max_length" | "maxLength" => Ok(CheckRule::MaxLength(length()?)),
        "pattern" | "regex" => arg
            .as_str()
            .map(|s| CheckRule::Pattern(s.to_string()))
            .ok_or_else(|| format!("check '{}' expects a string, got {}", key, arg)),
        flag => match arg {
            Value::Bool(true) | Value::Null => flag_rule(flag),
            _ => Err(format!("check '{}' takes no argument", flag)),
        },
    }
}

// ─── Refinements ────────────────────────────────────────────────────────────

/// A cross-field rule attached to an object node. Refinements run only during
/// full-schema validation, after every field of the object passed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refinement {
    /// `field` must equal `other` (e.g. a password confirmation).
    Matches {
        field: String,
        other: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// `field` must be non-empty whenever `when` holds.
    RequiredIf {
        field: String,
        when: Condition,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// A CEL expression over the object's fields that must evaluate to `true`.
    Expression {
        cel: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

// ─── Builders ───────────────────────────────────────────────────────────────

impl SchemaNode {
    pub fn new(shape: Shape) -> Self {
        SchemaNode {
            shape,
            description: None,
            default: None,
        }
    }

    fn leaf(scalar: Scalar) -> Self {
        SchemaNode::new(Shape::Leaf(LeafShape {
            scalar,
            checks: Vec::new(),
        }))
    }

    pub fn string() -> Self {
        SchemaNode::leaf(Scalar::String)
    }

    pub fn number() -> Self {
        SchemaNode::leaf(Scalar::Number)
    }

    pub fn integer() -> Self {
        SchemaNode::leaf(Scalar::Integer)
    }

    pub fn boolean() -> Self {
        SchemaNode::leaf(Scalar::Boolean)
    }

    pub fn date() -> Self {
        SchemaNode::leaf(Scalar::Date)
    }

    pub fn unknown() -> Self {
        SchemaNode::leaf(Scalar::Unknown)
    }

    pub fn enumeration<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaNode::leaf(Scalar::Enum(options.into_iter().map(Into::into).collect()))
    }

    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, SchemaNode)>,
        S: Into<String>,
    {
        SchemaNode::new(Shape::Object(ObjectShape {
            fields: fields.into_iter().map(|(n, s)| (n.into(), s)).collect(),
            refinements: Vec::new(),
        }))
    }

    pub fn array(item: SchemaNode) -> Self {
        SchemaNode::new(Shape::Array(ArrayShape {
            item: Box::new(item),
            min_items: None,
            max_items: None,
        }))
    }

    pub fn optional(self) -> Self {
        SchemaNode::new(Shape::Optional(Box::new(self)))
    }

    pub fn nullable(self) -> Self {
        SchemaNode::new(Shape::Nullable(Box::new(self)))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Adds a check to the innermost leaf. Ignored on non-leaf shapes.
    pub fn check(self, rule: CheckRule) -> Self {
        self.check_with_message(rule, None::<String>)
    }

    pub fn check_with_message(
        mut self,
        rule: CheckRule,
        message: Option<impl Into<String>>,
    ) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.checks.push(Check {
                rule,
                message: message.map(Into::into),
            });
        }
        self
    }

    pub fn min(self, n: f64) -> Self {
        self.check(CheckRule::Min(n))
    }

    pub fn max(self, n: f64) -> Self {
        self.check(CheckRule::Max(n))
    }

    pub fn min_length(self, n: usize) -> Self {
        self.check(CheckRule::MinLength(n))
    }

    pub fn max_length(self, n: usize) -> Self {
        self.check(CheckRule::MaxLength(n))
    }

    pub fn email(self) -> Self {
        self.check(CheckRule::Email)
    }

    pub fn url(self) -> Self {
        self.check(CheckRule::Url)
    }

    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.check(CheckRule::Pattern(pattern.into()))
    }

    /// Sets the minimum item count of the innermost array.
    pub fn min_items(mut self, n: usize) -> Self {
        if let Some(array) = self.array_mut() {
            array.min_items = Some(n);
        }
        self
    }

    /// Sets the maximum item count of the innermost array.
    pub fn max_items(mut self, n: usize) -> Self {
        if let Some(array) = self.array_mut() {
            array.max_items = Some(n);
        }
        self
    }

    /// Attaches a refinement to the innermost object.
    pub fn refine(mut self, refinement: Refinement) -> Self {
        if let Some(object) = self.object_mut() {
            object.refinements.push(refinement);
        }
        self
    }

    // ─── Inspection ─────────────────────────────────────────────────────────

    /// Strips Optional/Nullable wrappers and reports which were present.
    pub fn peel(&self) -> Peeled<'_> {
        let mut node = self;
        let mut optional = false;
        let mut nullable = false;
        loop {
            match &node.shape {
                Shape::Optional(inner) => {
                    optional = true;
                    node = inner;
                }
                Shape::Nullable(inner) => {
                    nullable = true;
                    node = inner;
                }
                _ => {
                    return Peeled {
                        core: node,
                        optional,
                        nullable,
                    };
                }
            }
        }
    }

    pub fn is_optional(&self) -> bool {
        self.peel().optional
    }

    /// The outermost description along the wrapper chain.
    pub fn effective_description(&self) -> Option<&str> {
        let mut node = self;
        loop {
            if let Some(d) = &node.description {
                return Some(d);
            }
            match &node.shape {
                Shape::Optional(inner) | Shape::Nullable(inner) => node = inner,
                _ => return None,
            }
        }
    }

    /// The outermost default along the wrapper chain.
    pub fn effective_default(&self) -> Option<&Value> {
        let mut node = self;
        loop {
            if let Some(d) = &node.default {
                return Some(d);
            }
            match &node.shape {
                Shape::Optional(inner) | Shape::Nullable(inner) => node = inner,
                _ => return None,
            }
        }
    }

    pub fn as_object(&self) -> Option<&ObjectShape> {
        match &self.peel().core.shape {
            Shape::Object(o) => Some(o),
            _ => None,
        }
    }

    fn core_mut(&mut self) -> &mut SchemaNode {
        match self.shape {
            Shape::Optional(ref mut inner) | Shape::Nullable(ref mut inner) => inner.core_mut(),
            _ => self,
        }
    }

    fn leaf_mut(&mut self) -> Option<&mut LeafShape> {
        match &mut self.core_mut().shape {
            Shape::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    fn array_mut(&mut self) -> Option<&mut ArrayShape> {
        match &mut self.core_mut().shape {
            Shape::Array(array) => Some(array),
            _ => None,
        }
    }

    fn object_mut(&mut self) -> Option<&mut ObjectShape> {
        match &mut self.core_mut().shape {
            Shape::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The declared field-path set: every path reachable through named object
    /// fields. Array items are not descended into, since their paths depend on
    /// the runtime item count.
    pub fn field_paths(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if let Some(object) = self.as_object() {
            collect_field_paths(object, "", &mut out);
        }
        out
    }

    /// The schema with the given top-level or nested field paths removed.
    ///
    /// Paths address named fields only (`address.city`); a path that does not
    /// exist is ignored.
    pub fn without_fields(&self, paths: &[FieldPath]) -> SchemaNode {
        let mut pruned = self.clone();
        for path in paths {
            let names: Vec<&str> = path
                .segments()
                .iter()
                .filter_map(|s| match s {
                    PathSegment::Field(n) => Some(n.as_str()),
                    PathSegment::Index(_) => None,
                })
                .collect();
            if names.len() == path.segments().len() {
                remove_field(&mut pruned, &names);
            }
        }
        pruned
    }
}

fn remove_field(node: &mut SchemaNode, names: &[&str]) {
    let Some((first, rest)) = names.split_first() else {
        return;
    };
    if let Some(object) = node.object_mut() {
        if rest.is_empty() {
            object.fields.retain(|(n, _)| n != first);
        } else if let Some((_, child)) = object.fields.iter_mut().find(|(n, _)| n == first) {
            remove_field(child, rest);
        }
    }
}

fn collect_field_paths(object: &ObjectShape, prefix: &str, out: &mut BTreeSet<String>) {
    for (name, node) in &object.fields {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        if let Some(child) = node.as_object() {
            collect_field_paths(child, &path, out);
        }
        out.insert(path);
    }
}

/// Result of [`SchemaNode::peel`].
#[derive(Clone, Copy, Debug)]
pub struct Peeled<'a> {
    pub core: &'a SchemaNode,
    pub optional: bool,
    pub nullable: bool,
}

// ─── Serde ──────────────────────────────────────────────────────────────────

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        schema_to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        schema_from_value(&value, "").map_err(serde::de::Error::custom)
    }
}

fn schema_to_value(node: &SchemaNode) -> Value {
    let mut map = Map::new();
    match &node.shape {
        Shape::Leaf(leaf) => {
            map.insert("type".into(), Value::String(leaf.scalar.name().into()));
            if let Scalar::Enum(options) = &leaf.scalar {
                map.insert("options".into(), Value::from(options.clone()));
            }
            if !leaf.checks.is_empty() {
                map.insert(
                    "checks".into(),
                    serde_json::to_value(&leaf.checks).unwrap_or(Value::Null),
                );
            }
        }
        Shape::Object(object) => {
            map.insert("type".into(), Value::String("object".into()));
            let fields: Map<String, Value> = object
                .fields
                .iter()
                .map(|(n, s)| (n.clone(), schema_to_value(s)))
                .collect();
            map.insert("fields".into(), Value::Object(fields));
            if !object.refinements.is_empty() {
                map.insert(
                    "refinements".into(),
                    serde_json::to_value(&object.refinements).unwrap_or(Value::Null),
                );
            }
        }
        Shape::Array(array) => {
            map.insert("type".into(), Value::String("array".into()));
            map.insert("item".into(), schema_to_value(&array.item));
            if let Some(n) = array.min_items {
                map.insert("min_items".into(), Value::from(n));
            }
            if let Some(n) = array.max_items {
                map.insert("max_items".into(), Value::from(n));
            }
        }
        Shape::Optional(inner) => {
            map.insert("type".into(), Value::String("optional".into()));
            map.insert("inner".into(), schema_to_value(inner));
        }
        Shape::Nullable(inner) => {
            map.insert("type".into(), Value::String("nullable".into()));
            map.insert("inner".into(), schema_to_value(inner));
        }
    }
    if let Some(d) = &node.description {
        map.insert("description".into(), Value::String(d.clone()));
    }
    if let Some(d) = &node.default {
        map.insert("default".into(), d.clone());
    }
    Value::Object(map)
}

const NODE_KEYS: &[&str] = &[
    "type",
    "description",
    "default",
    "optional",
    "nullable",
    "checks",
    "options",
    "fields",
    "refinements",
    "item",
    "min_items",
    "max_items",
    "inner",
];

/// Builds a schema node from its JSON form. `path` prefixes error messages.
pub(crate) fn schema_from_value(value: &Value, path: &str) -> Result<SchemaNode, String> {
    let at = |msg: String| {
        if path.is_empty() {
            msg
        } else {
            format!("{}: {}", path, msg)
        }
    };
    let map = value
        .as_object()
        .ok_or_else(|| at(format!("schema node must be a mapping, got {}", value)))?;

    for key in map.keys() {
        if !NODE_KEYS.contains(&key.as_str()) {
            return Err(at(format!("unknown schema key: '{}'", key)));
        }
    }

    let type_name = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| at("schema node requires a string 'type'".to_string()))?;

    let child = |suffix: &str| {
        if path.is_empty() {
            suffix.to_string()
        } else {
            format!("{}.{}", path, suffix)
        }
    };

    let shape = match type_name {
        "string" | "number" | "integer" | "boolean" | "date" | "unknown" | "enum" => {
            let scalar = match type_name {
                "string" => Scalar::String,
                "number" => Scalar::Number,
                "integer" => Scalar::Integer,
                "boolean" => Scalar::Boolean,
                "date" => Scalar::Date,
                "unknown" => Scalar::Unknown,
                _ => {
                    let options = map
                        .get("options")
                        .and_then(Value::as_array)
                        .ok_or_else(|| at("enum requires an 'options' list".to_string()))?;
                    let options = options
                        .iter()
                        .map(|o| match o {
                            Value::String(s) => Ok(s.clone()),
                            Value::Number(n) => Ok(n.to_string()),
                            Value::Bool(b) => Ok(b.to_string()),
                            other => Err(at(format!("enum option must be a scalar, got {}", other))),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Scalar::Enum(options)
                }
            };
            let checks = match map.get("checks") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|c| check_from_value(c).map_err(|e| at(e)))
                    .collect::<Result<Vec<_>, _>>()?,
                Some(other) => return Err(at(format!("'checks' must be a list, got {}", other))),
            };
            Shape::Leaf(LeafShape { scalar, checks })
        }
        "object" => {
            let mut fields = Vec::new();
            match map.get("fields") {
                None | Some(Value::Null) => {}
                Some(Value::Object(entries)) => {
                    for (name, node) in entries {
                        fields.push((name.clone(), schema_from_value(node, &child(name))?));
                    }
                }
                Some(other) => {
                    return Err(at(format!("'fields' must be a mapping, got {}", other)));
                }
            }
            let refinements = match map.get("refinements") {
                None | Some(Value::Null) => Vec::new(),
                Some(v) => serde_json::from_value(v.clone())
                    .map_err(|e| at(format!("invalid refinements: {}", e)))?,
            };
            Shape::Object(ObjectShape {
                fields,
                refinements,
            })
        }
        "array" => {
            let item = map
                .get("item")
                .ok_or_else(|| at("array requires an 'item' node".to_string()))?;
            let count = |key: &str| -> Result<Option<usize>, String> {
                match map.get(key) {
                    None | Some(Value::Null) => Ok(None),
                    Some(v) => v
                        .as_u64()
                        .map(|n| Some(n as usize))
                        .ok_or_else(|| at(format!("'{}' must be a non-negative integer", key))),
                }
            };
            Shape::Array(ArrayShape {
                item: Box::new(schema_from_value(item, &format!("{}[]", path))?),
                min_items: count("min_items")?,
                max_items: count("max_items")?,
            })
        }
        "optional" | "nullable" => {
            let inner = map
                .get("inner")
                .ok_or_else(|| at(format!("{} requires an 'inner' node", type_name)))?;
            let inner = Box::new(schema_from_value(inner, path)?);
            if type_name == "optional" {
                Shape::Optional(inner)
            } else {
                Shape::Nullable(inner)
            }
        }
        other => return Err(at(format!("unknown schema type: '{}'", other))),
    };

    let flag = |key: &str| -> Result<bool, String> {
        match map.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(at(format!("'{}' must be a boolean, got {}", key, other))),
        }
    };

    let description = match map.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => return Err(at(format!("'description' must be a string, got {}", other))),
    };

    let mut node = SchemaNode {
        shape,
        description: None,
        default: map.get("default").cloned(),
    };
    if flag("nullable")? {
        node = node.nullable();
    }
    if flag("optional")? {
        node = node.optional();
    }
    node.description = description;
    Ok(node)
}
