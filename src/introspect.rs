//! Field descriptor derivation.
//!
//! [`introspect`] walks an object schema in declaration order and produces one
//! [`FieldDescriptor`] per field. It never fails: shapes without dedicated
//! handling fall back to the text kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::condition::Condition;
use crate::enums::FieldKind;
use crate::primitives::{FieldPath, PathSegment, split_description, title_case};
use crate::schema::{CheckRule, LeafShape, Scalar, SchemaNode, Shape};

/// Bounds and options pulled from a field's declared checks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

/// Engine metadata for one field. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Template path of the field; items of repeating fields use `[]`
    /// (`contacts[].email`).
    pub path: String,
    pub kind: FieldKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    /// Explicit `null` is an accepted value.
    pub nullable: bool,
    pub constraints: Constraints,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Vec<FieldDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Box<FieldDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u8>,
    /// Set while an externally sourced option list is still resolving.
    pub loading: bool,
    /// The field's own schema node, wrappers included. This is the rule the
    /// validation bridge runs on every write.
    pub schema: SchemaNode,
}

impl FieldDescriptor {
    /// Finds the descriptor addressed by a concrete path, walking `nested` for
    /// field segments and `item` for index segments.
    pub fn find<'a>(fields: &'a [FieldDescriptor], path: &FieldPath) -> Option<&'a FieldDescriptor> {
        let mut segments = path.segments().iter();
        let first = match segments.next()? {
            PathSegment::Field(name) => name,
            PathSegment::Index(_) => return None,
        };
        let mut current = fields.iter().find(|d| &d.name == first)?;
        for seg in segments {
            current = match seg {
                PathSegment::Field(name) => current
                    .nested
                    .as_ref()?
                    .iter()
                    .find(|d| &d.name == name)?,
                PathSegment::Index(_) => current.item.as_deref()?,
            };
        }
        Some(current)
    }

    /// Depth-first iterator over this descriptor and everything beneath it.
    pub fn walk(&self) -> Vec<&FieldDescriptor> {
        let mut out = vec![self];
        if let Some(nested) = &self.nested {
            for child in nested {
                out.extend(child.walk());
            }
        }
        if let Some(item) = &self.item {
            out.extend(item.walk());
        }
        out
    }
}

/// Caller-supplied adjustments for one field. Every present property wins
/// over the derived value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Overrides keyed by template path (`address.city`, `contacts[].phone`).
pub type FieldOverrides = BTreeMap<String, FieldOverride>;

/// Derives the ordered descriptor list for an object schema.
///
/// A root that is not an object (after unwrapping) yields an empty list.
pub fn introspect(schema: &SchemaNode, overrides: &FieldOverrides) -> Vec<FieldDescriptor> {
    match schema.as_object() {
        Some(object) => object
            .fields
            .iter()
            .map(|(name, node)| describe_field(name, name, node, overrides))
            .collect(),
        None => Vec::new(),
    }
}

fn describe_field(
    name: &str,
    path: &str,
    node: &SchemaNode,
    overrides: &FieldOverrides,
) -> FieldDescriptor {
    let peeled = node.peel();
    let core = peeled.core;

    let (label, hint) = match node.effective_description() {
        Some(d) => split_description(d),
        None => (None, None),
    };

    let mut descriptor = FieldDescriptor {
        name: name.to_string(),
        path: path.to_string(),
        kind: FieldKind::Text,
        label: label.unwrap_or_else(|| title_case(name)),
        hint,
        placeholder: None,
        required: !peeled.optional,
        nullable: peeled.nullable,
        constraints: Constraints::default(),
        default_value: node.effective_default().cloned(),
        nested: None,
        item: None,
        condition: None,
        group: None,
        col_span: None,
        loading: false,
        schema: node.clone(),
    };

    match &core.shape {
        Shape::Leaf(leaf) => {
            descriptor.kind = classify_leaf(leaf);
            descriptor.constraints = leaf_constraints(leaf);
        }
        Shape::Object(object) => {
            descriptor.kind = FieldKind::Composite;
            descriptor.nested = Some(
                object
                    .fields
                    .iter()
                    .map(|(child, n)| {
                        describe_field(child, &format!("{}.{}", path, child), n, overrides)
                    })
                    .collect(),
            );
        }
        Shape::Array(array) => {
            descriptor.kind = FieldKind::Repeating;
            descriptor.constraints.min_items = array.min_items;
            descriptor.constraints.max_items = array.max_items;
            let item_path = format!("{}[]", path);
            let mut item = describe_field(name, &item_path, &array.item, overrides);
            if array.item.effective_description().is_none()
                && !overrides.get(&item_path).is_some_and(|o| o.label.is_some())
            {
                item.label = descriptor.label.clone();
            }
            descriptor.item = Some(Box::new(item));
        }
        // `peel` never returns a wrapper as the core.
        Shape::Optional(_) | Shape::Nullable(_) => {}
    }

    if let Some(ov) = overrides.get(path) {
        apply_override(&mut descriptor, ov);
    }

    descriptor
}

fn classify_leaf(leaf: &LeafShape) -> FieldKind {
    match &leaf.scalar {
        Scalar::String => {
            if leaf.checks.iter().any(|c| c.rule == CheckRule::Email) {
                FieldKind::Email
            } else {
                FieldKind::Text
            }
        }
        Scalar::Number | Scalar::Integer => FieldKind::Number,
        Scalar::Boolean => FieldKind::Checkbox,
        Scalar::Enum(_) => FieldKind::Select,
        Scalar::Date => FieldKind::Date,
        Scalar::Unknown => FieldKind::Text,
    }
}

fn leaf_constraints(leaf: &LeafShape) -> Constraints {
    let mut c = Constraints::default();
    if let Scalar::Enum(options) = &leaf.scalar {
        c.options = Some(options.clone());
    }
    for check in &leaf.checks {
        match &check.rule {
            CheckRule::Min(n) => c.min = Some(c.min.map_or(*n, |m| m.max(*n))),
            CheckRule::Max(n) => c.max = Some(c.max.map_or(*n, |m| m.min(*n))),
            CheckRule::MinLength(n) => c.min_length = Some(c.min_length.map_or(*n, |m| m.max(*n))),
            CheckRule::MaxLength(n) => c.max_length = Some(c.max_length.map_or(*n, |m| m.min(*n))),
            CheckRule::Pattern(p) => c.pattern = Some(p.clone()),
            CheckRule::Email | CheckRule::Url | CheckRule::Integer => {}
        }
    }
    c
}

fn apply_override(descriptor: &mut FieldDescriptor, ov: &FieldOverride) {
    if let Some(label) = &ov.label {
        descriptor.label = label.clone();
    }
    if let Some(hint) = &ov.hint {
        descriptor.hint = Some(hint.clone());
    }
    if let Some(placeholder) = &ov.placeholder {
        descriptor.placeholder = Some(placeholder.clone());
    }
    // Structural kinds follow the schema; only leaves can be re-skinned.
    if let Some(kind) = ov.kind
        && descriptor.kind.is_leaf()
        && kind.is_leaf()
    {
        descriptor.kind = kind;
    }
    if let Some(options) = &ov.options {
        descriptor.constraints.options = Some(options.clone());
    }
    if let Some(loading) = ov.loading {
        descriptor.loading = loading;
    }
    if let Some(span) = ov.col_span {
        descriptor.col_span = Some(span);
    }
    if let Some(condition) = &ov.condition {
        descriptor.condition = Some(condition.clone());
    }
    if let Some(group) = &ov.group {
        descriptor.group = Some(group.clone());
    }
}

/// Collects every template path an override may target.
pub fn override_targets(fields: &[FieldDescriptor]) -> Vec<String> {
    fields
        .iter()
        .flat_map(|f| f.walk())
        .map(|d| d.path.clone())
        .collect()
}
