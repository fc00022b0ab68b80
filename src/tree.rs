//! The live state tree.
//!
//! A [`StateTree`] mirrors the field descriptors exactly: one leaf per scalar
//! field, one composite per nested object and one repeating node per array.
//! Hiding a field never removes its node. Apart from repeating length, the
//! structure is fixed after [`build_tree`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::enums::FieldKind;
use crate::introspect::FieldDescriptor;
use crate::primitives::{FieldPath, PathSegment, number_value};

/// A scalar field's value and its cached validation state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeafState {
    pub value: Value,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub touched: bool,
}

impl LeafState {
    pub fn new(value: Value) -> Self {
        LeafState {
            value,
            valid: true,
            error: None,
            touched: false,
        }
    }
}

/// Named children in descriptor order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CompositeState {
    pub children: Vec<(String, StateNode)>,
}

impl CompositeState {
    pub fn child(&self, name: &str) -> Option<&StateNode> {
        self.children.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut StateNode> {
        self.children
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }
}

/// An ordered item list whose length stays within `[min, max]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepeatingState {
    pub items: Vec<StateNode>,
    pub min: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl RepeatingState {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn can_add(&self) -> bool {
        self.max.is_none_or(|max| self.items.len() < max)
    }

    pub fn can_remove(&self) -> bool {
        self.items.len() > self.min
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum StateNode {
    Leaf(LeafState),
    Composite(CompositeState),
    Repeating(RepeatingState),
}

impl StateNode {
    /// The raw value of this subtree: leaves as-is, composites as objects,
    /// repeating nodes as lists.
    pub fn value(&self) -> Value {
        match self {
            StateNode::Leaf(leaf) => leaf.value.clone(),
            StateNode::Composite(c) => Value::Object(
                c.children
                    .iter()
                    .map(|(n, child)| (n.clone(), child.value()))
                    .collect::<Map<_, _>>(),
            ),
            StateNode::Repeating(r) => Value::Array(r.items.iter().map(StateNode::value).collect()),
        }
    }

    /// Aggregate validity: a leaf's cached result, or the AND of every
    /// descendant leaf.
    pub fn is_valid(&self) -> bool {
        match self {
            StateNode::Leaf(leaf) => leaf.valid,
            StateNode::Composite(c) => c.children.iter().all(|(_, child)| child.is_valid()),
            StateNode::Repeating(r) => r.items.iter().all(StateNode::is_valid),
        }
    }

    /// True if any descendant leaf has been touched.
    pub fn is_touched(&self) -> bool {
        match self {
            StateNode::Leaf(leaf) => leaf.touched,
            StateNode::Composite(c) => c.children.iter().any(|(_, child)| child.is_touched()),
            StateNode::Repeating(r) => r.items.iter().any(StateNode::is_touched),
        }
    }

    /// Marks every descendant leaf touched.
    pub fn touch_all(&mut self) {
        match self {
            StateNode::Leaf(leaf) => leaf.touched = true,
            StateNode::Composite(c) => c.children.iter_mut().for_each(|(_, n)| n.touch_all()),
            StateNode::Repeating(r) => r.items.iter_mut().for_each(StateNode::touch_all),
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafState> {
        match self {
            StateNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafState> {
        match self {
            StateNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_repeating(&self) -> Option<&RepeatingState> {
        match self {
            StateNode::Repeating(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_repeating_mut(&mut self) -> Option<&mut RepeatingState> {
        match self {
            StateNode::Repeating(r) => Some(r),
            _ => None,
        }
    }

    fn child(&self, seg: &PathSegment) -> Option<&StateNode> {
        match (self, seg) {
            (StateNode::Composite(c), PathSegment::Field(name)) => c.child(name),
            (StateNode::Repeating(r), PathSegment::Index(i)) => r.items.get(*i),
            _ => None,
        }
    }

    fn child_mut(&mut self, seg: &PathSegment) -> Option<&mut StateNode> {
        match (self, seg) {
            (StateNode::Composite(c), PathSegment::Field(name)) => c.child_mut(name),
            (StateNode::Repeating(r), PathSegment::Index(i)) => r.items.get_mut(*i),
            _ => None,
        }
    }

    fn collect_paths(&self, at: &FieldPath, out: &mut Vec<FieldPath>) {
        match self {
            StateNode::Leaf(_) => {}
            StateNode::Composite(c) => {
                for (name, child) in &c.children {
                    let path = at.field(name);
                    out.push(path.clone());
                    child.collect_paths(&path, out);
                }
            }
            StateNode::Repeating(r) => {
                for (i, item) in r.items.iter().enumerate() {
                    let path = at.index(i);
                    out.push(path.clone());
                    item.collect_paths(&path, out);
                }
            }
        }
    }

    fn collect_leaves<'a>(&'a self, at: &FieldPath, out: &mut Vec<(FieldPath, &'a LeafState)>) {
        match self {
            StateNode::Leaf(leaf) => out.push((at.clone(), leaf)),
            StateNode::Composite(c) => {
                for (name, child) in &c.children {
                    child.collect_leaves(&at.field(name), out);
                }
            }
            StateNode::Repeating(r) => {
                for (i, item) in r.items.iter().enumerate() {
                    item.collect_leaves(&at.index(i), out);
                }
            }
        }
    }
}

/// The whole form state. The root is always a composite.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateTree {
    root: StateNode,
}

impl StateTree {
    pub fn root(&self) -> &StateNode {
        &self.root
    }

    /// The node at `path`; the root path returns the root composite.
    pub fn get(&self, path: &FieldPath) -> Option<&StateNode> {
        let mut node = &self.root;
        for seg in path.segments() {
            node = node.child(seg)?;
        }
        Some(node)
    }

    pub(crate) fn root_mut(&mut self) -> &mut StateNode {
        &mut self.root
    }

    pub(crate) fn get_mut(&mut self, path: &FieldPath) -> Option<&mut StateNode> {
        let mut node = &mut self.root;
        for seg in path.segments() {
            node = node.child_mut(seg)?;
        }
        Some(node)
    }

    /// The raw value of the whole tree as a JSON object.
    pub fn raw_value(&self) -> Value {
        self.root.value()
    }

    pub fn is_valid(&self) -> bool {
        self.root.is_valid()
    }

    /// Every concrete node path below the root, in tree order.
    pub fn paths(&self) -> Vec<FieldPath> {
        let mut out = Vec::new();
        self.root.collect_paths(&FieldPath::root(), &mut out);
        out
    }

    /// The node paths reachable through named fields only, mirroring
    /// [`SchemaNode::field_paths`](crate::schema::SchemaNode::field_paths).
    pub fn field_paths(&self) -> BTreeSet<String> {
        self.paths()
            .into_iter()
            .filter(|p| p.segments().iter().all(|s| matches!(s, PathSegment::Field(_))))
            .map(|p| p.to_string())
            .collect()
    }

    /// Every leaf with its concrete path, in tree order.
    pub fn leaves(&self) -> Vec<(FieldPath, &LeafState)> {
        let mut out = Vec::new();
        self.root.collect_leaves(&FieldPath::root(), &mut out);
        out
    }

    /// Concrete leaf paths at or beneath `prefix`.
    pub fn leaf_paths_under(&self, prefix: &FieldPath) -> Vec<FieldPath> {
        match self.get(prefix) {
            Some(node) => {
                let mut out = Vec::new();
                node.collect_leaves(prefix, &mut out);
                out.into_iter().map(|(p, _)| p).collect()
            }
            None => Vec::new(),
        }
    }
}

/// Builds the state tree for a descriptor list, seeded from `initial`.
///
/// `initial` is the partial initial-data object; anything that is not an
/// object is treated as empty.
pub fn build_tree(descriptors: &[FieldDescriptor], initial: &Value) -> StateTree {
    let children = descriptors
        .iter()
        .map(|d| (d.name.clone(), build_node(d, initial.get(&d.name))))
        .collect();
    StateTree {
        root: StateNode::Composite(CompositeState { children }),
    }
}

/// Builds one node from its descriptor.
///
/// Value precedence: `initial` > descriptor default > kind-specific zero
/// value. An initial `null` counts as absent unless the field is optional or
/// nullable. Repeating nodes keep at most `max` initial items and are padded up
/// to `min` with fresh items.
pub fn build_node(descriptor: &FieldDescriptor, initial: Option<&Value>) -> StateNode {
    let seed = initial
        .filter(|v| !v.is_null() || !descriptor.required || descriptor.nullable)
        .or(descriptor.default_value.as_ref());

    match descriptor.kind {
        FieldKind::Composite => {
            let nested = descriptor.nested.as_deref().unwrap_or_default();
            let children = nested
                .iter()
                .map(|child| {
                    let value = seed.and_then(|v| v.get(&child.name));
                    (child.name.clone(), build_node(child, value))
                })
                .collect();
            StateNode::Composite(CompositeState { children })
        }
        FieldKind::Repeating => {
            let min = descriptor.constraints.min_items.unwrap_or(0);
            let max = descriptor.constraints.max_items;
            let mut repeating = RepeatingState {
                items: Vec::new(),
                min,
                max,
            };
            if let Some(item) = descriptor.item.as_deref() {
                if let Some(Value::Array(values)) = seed {
                    for value in values {
                        if !repeating.can_add() {
                            break;
                        }
                        repeating.items.push(build_node(item, Some(value)));
                    }
                }
                while repeating.items.len() < min && repeating.can_add() {
                    repeating.items.push(build_node(item, None));
                }
            }
            StateNode::Repeating(repeating)
        }
        _ => {
            let value = match seed {
                Some(v) => v.clone(),
                None => zero_value(descriptor),
            };
            StateNode::Leaf(LeafState::new(value))
        }
    }
}

/// The kind-specific zero value of a leaf.
///
/// Optional and nullable leaves start out `null`. An untouched optional field
/// stays absent from the submitted value and an untouched nullable one submits
/// `null`.
pub fn zero_value(descriptor: &FieldDescriptor) -> Value {
    if !descriptor.required || descriptor.nullable {
        return Value::Null;
    }
    match descriptor.kind {
        FieldKind::Checkbox => Value::Bool(false),
        FieldKind::Number => descriptor
            .constraints
            .min
            .map(number_value)
            .unwrap_or(Value::Null),
        FieldKind::Repeating => Value::Array(Vec::new()),
        _ => Value::String(String::new()),
    }
}
