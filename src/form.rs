//! The live form instance.
//!
//! A [`Form`] owns one state tree together with the controllers around it:
//! repeating-item bounds, collapsible groups, wizard steps, the visibility
//! cache and path-scoped subscribers. Every mutation goes through a `Form`
//! method, which re-runs the validation bridge on the leaves it touched,
//! recomputes visibility, bumps the revision and notifies subscribers.
//!
//! Operations never fail. A write to an unknown path, an item add at the
//! upper bound or a blocked step transition is a refused no-op reported by
//! a `false` (or `None`) return.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use crate::condition::evaluate_condition;
use crate::definition::FormDefinition;
use crate::enums::{FieldKind, FormEventKind, HiddenFieldPolicy};
use crate::error::FieldIssue;
use crate::evaluate::CelEvaluator;
use crate::groups::GroupController;
use crate::introspect::{FieldDescriptor, introspect};
use crate::normalize::normalize_value;
use crate::primitives::{FieldPath, PathSegment, number_value, resolve_path, values_strict_equal};
use crate::steps::StepController;
use crate::tree::{StateNode, StateTree, build_node, build_tree};
use crate::validate::{validate_leaf, validate_value, validate_value_except};

/// A change notification delivered to subscribers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormEvent {
    pub kind: FormEventKind,
    /// The node the change happened at; form-wide changes use the root path.
    pub path: FieldPath,
    /// The form revision after the change.
    pub revision: u64,
}

/// Handle returned by [`Form::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FormEvent)>;

struct Subscriber {
    id: SubscriptionId,
    prefix: FieldPath,
    listener: Listener,
}

/// Read-only snapshot of one node, as a renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldView {
    pub value: Value,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub touched: bool,
    pub visible: bool,
    /// The value differs from the one the form was built with.
    pub dirty: bool,
}

pub struct Form {
    definition: FormDefinition,
    descriptors: Vec<FieldDescriptor>,
    initial: Value,
    tree: StateTree,
    pristine: Value,
    hidden: BTreeSet<FieldPath>,
    groups: GroupController,
    steps: StepController,
    evaluator: Option<Box<dyn CelEvaluator>>,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
    revision: u64,
    submit_issues: Vec<FieldIssue>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("tree", &self.tree)
            .field("hidden", &self.hidden)
            .field("groups", &self.groups)
            .field("steps", &self.steps)
            .field("subscribers", &self.subscribers.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Form {
    /// Builds a form instance from a definition and partial initial data.
    ///
    /// The tree is seeded, every leaf is run through the validation bridge
    /// and visibility is computed once before the form is returned. With the
    /// `cel-eval` feature the bundled CEL evaluator backs expression
    /// refinements.
    pub fn new(definition: FormDefinition, initial: Value) -> Self {
        let descriptors = introspect(&definition.schema, &definition.overrides);
        let tree = build_tree(&descriptors, &initial);
        let groups = GroupController::new(&definition.groups);
        let steps = StepController::new(definition.steps.len());

        let mut form = Form {
            definition,
            descriptors,
            initial,
            pristine: Value::Null,
            tree,
            hidden: BTreeSet::new(),
            groups,
            steps,
            evaluator: default_evaluator(),
            subscribers: Vec::new(),
            next_subscription: 0,
            revision: 0,
            submit_issues: Vec::new(),
        };
        form.revalidate_under(&FieldPath::root());
        form.hidden = form.compute_hidden();
        form.pristine = form.tree.raw_value();
        tracing::debug!(
            fields = form.descriptors.len(),
            steps = form.steps.step_count(),
            "form built"
        );
        form
    }

    /// Replaces the evaluator used for expression refinements at submit.
    pub fn with_evaluator(mut self, evaluator: Box<dyn CelEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Disables expression refinements; they are skipped at submit.
    pub fn without_evaluator(mut self) -> Self {
        self.evaluator = None;
        self
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    /// The descriptor for a concrete or template path.
    pub fn descriptor(&self, path: &str) -> Option<&FieldDescriptor> {
        let template = template_of(path);
        self.descriptors
            .iter()
            .flat_map(|d| d.walk())
            .find(|d| d.path == template)
    }

    pub fn tree(&self) -> &StateTree {
        &self.tree
    }

    /// The raw value of the whole tree, before normalization.
    pub fn raw_value(&self) -> Value {
        self.tree.raw_value()
    }

    /// Aggregate bridge validity of every leaf.
    pub fn is_valid(&self) -> bool {
        self.tree.is_valid()
    }

    /// Monotonic counter bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True once any value differs from the built value.
    pub fn is_dirty(&self) -> bool {
        !values_strict_equal(&self.tree.raw_value(), &self.pristine)
    }

    // ─── Values ─────────────────────────────────────────────────────────────

    /// Writes a leaf value and re-runs the bridge on it.
    ///
    /// Number fields accept numeric strings (converted to numbers) and treat
    /// an empty string as `null`. Returns false if `path` is not a leaf.
    pub fn set_value(&mut self, path: &str, value: Value) -> bool {
        let Some(path) = self.leaf_path(path) else {
            tracing::warn!(path, "write to unknown field ignored");
            return false;
        };
        let Some(descriptor) = FieldDescriptor::find(&self.descriptors, &path) else {
            return false;
        };
        let value = coerce_input(descriptor.kind, value);
        tracing::trace!(path = %path, value = %value, "value written");

        if let Some(leaf) = self.tree.get_mut(&path).and_then(StateNode::as_leaf_mut) {
            leaf.value = value;
        }
        revalidate_leaf(&self.descriptors, &mut self.tree, &path);

        self.revision += 1;
        let mut events = vec![(FormEventKind::ValueChanged, path)];
        events.extend(self.refresh_visibility());
        self.emit(events);
        true
    }

    /// Marks a node (and every leaf beneath it) touched.
    pub fn touch(&mut self, path: &str) -> bool {
        let Some(path) = FieldPath::parse(path) else {
            return false;
        };
        let Some(node) = self.tree.get_mut(&path) else {
            tracing::warn!(path = %path, "touch on unknown field ignored");
            return false;
        };
        node.touch_all();
        self.revision += 1;
        self.emit(vec![(FormEventKind::Touched, path)]);
        true
    }

    /// A snapshot of the node at `path`. Composite and repeating nodes
    /// report their aggregate validity and touched state.
    pub fn field(&self, path: &str) -> Option<FieldView> {
        let path = FieldPath::parse(path)?;
        let node = self.tree.get(&path)?;
        let value = node.value();
        let dirty = !resolve_path(&path, &self.pristine)
            .is_some_and(|before| values_strict_equal(before, &value));
        let error = node.as_leaf().and_then(|leaf| leaf.error.clone());
        Some(FieldView {
            valid: node.is_valid(),
            touched: node.is_touched(),
            visible: !self.hidden.contains(&path),
            error,
            dirty,
            value,
        })
    }

    /// Whether the node is shown: its own condition holds and so do those of
    /// all its ancestors. Unknown paths are not visible.
    pub fn is_visible(&self, path: &str) -> bool {
        match FieldPath::parse(path) {
            Some(path) => self.tree.get(&path).is_some() && !self.hidden.contains(&path),
            None => false,
        }
    }

    /// Replaces the option list of a field (concrete or template path) and
    /// its loading flag. Used for lists resolved outside the engine.
    pub fn set_options(&mut self, path: &str, options: Vec<String>, loading: bool) -> bool {
        let template = template_of(path);
        let Some(descriptor) = find_by_template_mut(&mut self.descriptors, &template) else {
            tracing::warn!(path, "options for unknown field ignored");
            return false;
        };
        descriptor.constraints.options = Some(options);
        descriptor.loading = loading;
        self.revision += 1;
        let at = FieldPath::parse(path).unwrap_or_default();
        self.emit(vec![(FormEventKind::OptionsChanged, at)]);
        true
    }

    // ─── Repeating fields ───────────────────────────────────────────────────

    pub fn item_count(&self, path: &str) -> Option<usize> {
        let path = FieldPath::parse(path)?;
        self.tree.get(&path)?.as_repeating().map(|r| r.len())
    }

    pub fn can_add_item(&self, path: &str) -> bool {
        FieldPath::parse(path)
            .and_then(|p| self.tree.get(&p))
            .and_then(StateNode::as_repeating)
            .is_some_and(|r| r.can_add())
    }

    pub fn can_remove_item(&self, path: &str) -> bool {
        FieldPath::parse(path)
            .and_then(|p| self.tree.get(&p))
            .and_then(StateNode::as_repeating)
            .is_some_and(|r| r.can_remove())
    }

    /// Appends a fresh item. Refused at the upper bound.
    pub fn add_item(&mut self, path: &str) -> bool {
        let Some(path) = FieldPath::parse(path) else {
            return false;
        };
        let Some(item) = FieldDescriptor::find(&self.descriptors, &path)
            .and_then(|d| d.item.as_deref())
        else {
            tracing::warn!(path = %path, "add_item on non-repeating field ignored");
            return false;
        };
        let Some(repeating) = self.tree.get_mut(&path).and_then(StateNode::as_repeating_mut)
        else {
            return false;
        };
        if !repeating.can_add() {
            tracing::debug!(path = %path, len = repeating.len(), "add_item refused at max");
            return false;
        }
        repeating.items.push(build_node(item, None));
        let index = repeating.len() - 1;
        tracing::debug!(path = %path, len = index + 1, "item added");

        self.revalidate_under(&path.index(index));
        self.revision += 1;
        let mut events = vec![(FormEventKind::ItemAdded, path)];
        events.extend(self.refresh_visibility());
        self.emit(events);
        true
    }

    /// Removes the item at `index`. Refused at the lower bound or for an
    /// index out of range.
    pub fn remove_item(&mut self, path: &str, index: usize) -> bool {
        let Some(path) = FieldPath::parse(path) else {
            return false;
        };
        let Some(repeating) = self.tree.get_mut(&path).and_then(StateNode::as_repeating_mut)
        else {
            tracing::warn!(path = %path, "remove_item on non-repeating field ignored");
            return false;
        };
        if index >= repeating.len() || !repeating.can_remove() {
            tracing::debug!(
                path = %path,
                index,
                len = repeating.len(),
                "remove_item refused"
            );
            return false;
        }
        repeating.items.remove(index);
        tracing::debug!(path = %path, index, len = repeating.len(), "item removed");

        self.revision += 1;
        let mut events = vec![(FormEventKind::ItemRemoved, path)];
        events.extend(self.refresh_visibility());
        self.emit(events);
        true
    }

    // ─── Groups ─────────────────────────────────────────────────────────────

    pub fn is_collapsed(&self, group: &str) -> Option<bool> {
        self.groups.is_collapsed(group)
    }

    /// Flips a group's collapsed flag and returns the new state.
    pub fn toggle_group(&mut self, group: &str) -> Option<bool> {
        let collapsed = self.groups.toggle(group)?;
        tracing::debug!(group, collapsed, "group toggled");
        self.revision += 1;
        self.emit(vec![(FormEventKind::GroupToggled, FieldPath::root())]);
        Some(collapsed)
    }

    /// Descriptors assigned to a group, in declaration order.
    pub fn group_fields(&self, group: &str) -> Vec<&FieldDescriptor> {
        self.descriptors
            .iter()
            .flat_map(|d| d.walk())
            .filter(|d| d.group.as_deref() == Some(group))
            .collect()
    }

    // ─── Steps ──────────────────────────────────────────────────────────────

    pub fn current_step(&self) -> usize {
        self.steps.current()
    }

    pub fn step_count(&self) -> usize {
        self.steps.step_count()
    }

    pub fn is_last_step(&self) -> bool {
        self.steps.is_last()
    }

    /// Top-level descriptors shown on the current step. Without declared
    /// steps every field belongs to the single implicit step.
    pub fn current_step_fields(&self) -> Vec<&FieldDescriptor> {
        match self.definition.steps.get(self.steps.current()) {
            Some(step) => step
                .fields
                .iter()
                .filter_map(|name| self.descriptors.iter().find(|d| &d.name == name))
                .collect(),
            None => self.descriptors.iter().collect(),
        }
    }

    /// Advances one step if every visible leaf of the current step passes
    /// the bridge. On refusal the first invalid leaf is touched so its error
    /// shows.
    pub fn next_step(&mut self) -> bool {
        let current = self.steps.current();
        if self.steps.is_last() {
            return false;
        }

        let gated = self
            .definition
            .steps
            .get(current)
            .is_none_or(|step| step.validate);
        if gated && let Some(path) = self.first_invalid_in_step() {
            tracing::debug!(step = current, path = %path, "step advance refused");
            if let Some(node) = self.tree.get_mut(&path) {
                node.touch_all();
            }
            self.revision += 1;
            self.emit(vec![(FormEventKind::Touched, path)]);
            return false;
        }

        self.steps.advance();
        tracing::debug!(from = current, to = self.steps.current(), "step advanced");
        self.revision += 1;
        self.emit(vec![(FormEventKind::StepChanged, FieldPath::root())]);
        true
    }

    /// Moves back one step without validation. False at the first step.
    pub fn previous_step(&mut self) -> bool {
        if !self.steps.retreat() {
            return false;
        }
        tracing::debug!(to = self.steps.current(), "step retreated");
        self.revision += 1;
        self.emit(vec![(FormEventKind::StepChanged, FieldPath::root())]);
        true
    }

    fn first_invalid_in_step(&self) -> Option<FieldPath> {
        let names: Vec<&str> = self
            .current_step_fields()
            .into_iter()
            .map(|d| d.name.as_str())
            .collect();
        names.into_iter().find_map(|name| {
            self.tree
                .leaf_paths_under(&FieldPath::root().field(name))
                .into_iter()
                .filter(|p| !self.hidden.contains(p))
                .find(|p| {
                    self.tree
                        .get(p)
                        .and_then(StateNode::as_leaf)
                        .is_some_and(|leaf| !leaf.valid)
                })
        })
    }

    // ─── Submit ─────────────────────────────────────────────────────────────

    /// Runs full-schema validation over the tree and returns the normalized
    /// value, or `None` when validation fails.
    ///
    /// The bridge is re-run on every leaf first so per-field state is
    /// current. On failure every node is marked touched, schema issues are
    /// attached to leaves that carry no bridge error, and the issues are kept
    /// for [`Form::submit_issues`].
    pub fn submit(&mut self) -> Option<Value> {
        self.revalidate_under(&FieldPath::root());

        let raw = self.tree.raw_value();
        let outcome = match self.definition.options.hidden_fields {
            HiddenFieldPolicy::Enforce => validate_value(
                &self.definition.schema,
                &raw,
                self.evaluator.as_deref(),
            ),
            HiddenFieldPolicy::Exempt => self.validate_visible(raw),
        };

        self.revision += 1;
        match outcome {
            Ok(value) => {
                tracing::debug!(revision = self.revision, "submit accepted");
                self.submit_issues.clear();
                self.emit(vec![(FormEventKind::Submitted, FieldPath::root())]);
                Some(value)
            }
            Err(issues) => {
                tracing::debug!(issues = issues.len(), "submit rejected");
                self.tree.root_mut().touch_all();
                for issue in &issues {
                    let Some(path) = FieldPath::parse(&issue.path) else {
                        continue;
                    };
                    if let Some(leaf) = self.tree.get_mut(&path).and_then(StateNode::as_leaf_mut)
                        && leaf.error.is_none()
                    {
                        leaf.valid = false;
                        leaf.error = Some(issue.message.clone());
                    }
                }
                self.submit_issues = issues;
                self.emit(vec![(FormEventKind::SubmitRejected, FieldPath::root())]);
                None
            }
        }
    }

    /// Issues recorded by the last rejected submit; empty after a successful
    /// one.
    pub fn submit_issues(&self) -> &[FieldIssue] {
        &self.submit_issues
    }

    /// Validation with condition-hidden fields removed from both the schema
    /// and the value. Hidden fields inside repeating items cannot be pruned
    /// from the shared item schema, so they pass unchecked instead and the
    /// item's refinements still run. Refinement issues aimed at a hidden field
    /// are dropped.
    fn validate_visible(&self, mut raw: Value) -> Result<Value, Vec<FieldIssue>> {
        let hidden: Vec<FieldPath> = self
            .hidden
            .iter()
            .filter(|p| !p.parent().is_some_and(|parent| self.hidden.contains(&parent)))
            .cloned()
            .collect();
        for path in &hidden {
            remove_at(&mut raw, path);
        }
        let schema = self.definition.schema.without_fields(&hidden);

        match validate_value_except(&schema, &raw, self.evaluator.as_deref(), &hidden) {
            Ok(value) => Ok(value),
            Err(issues) => {
                let remaining: Vec<FieldIssue> = issues
                    .into_iter()
                    .filter(|issue| {
                        FieldPath::parse(&issue.path)
                            .is_none_or(|p| !hidden.iter().any(|h| p.starts_with(h)))
                    })
                    .collect();
                if remaining.is_empty() {
                    Ok(normalize_value(&schema, &raw))
                } else {
                    Err(remaining)
                }
            }
        }
    }

    // ─── Reset ──────────────────────────────────────────────────────────────

    /// Rebuilds the tree from the initial data and returns every controller
    /// to its starting state. Subscribers and resolved option lists are kept.
    pub fn reset(&mut self) {
        self.tree = build_tree(&self.descriptors, &self.initial);
        self.revalidate_under(&FieldPath::root());
        self.hidden = self.compute_hidden();
        self.groups.reset(&self.definition.groups);
        self.steps.reset();
        self.submit_issues.clear();
        self.revision += 1;
        tracing::debug!(revision = self.revision, "form reset");
        self.emit(vec![(FormEventKind::Reset, FieldPath::root())]);
    }

    // ─── Subscriptions ──────────────────────────────────────────────────────

    /// Registers a listener for events at or beneath `prefix` (the empty
    /// string subscribes to everything). Events raised at an ancestor of the
    /// prefix, such as a reset, are delivered as well. Returns `None` for a
    /// malformed prefix.
    pub fn subscribe<F>(&mut self, prefix: &str, listener: F) -> Option<SubscriptionId>
    where
        F: FnMut(&FormEvent) + 'static,
    {
        let prefix = FieldPath::parse(prefix)?;
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            prefix,
            listener: Box::new(listener),
        });
        Some(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    fn emit(&mut self, events: Vec<(FormEventKind, FieldPath)>) {
        for (kind, path) in events {
            let event = FormEvent {
                kind,
                path,
                revision: self.revision,
            };
            for sub in &mut self.subscribers {
                if event.path.starts_with(&sub.prefix) || sub.prefix.starts_with(&event.path) {
                    (sub.listener)(&event);
                }
            }
        }
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn leaf_path(&self, path: &str) -> Option<FieldPath> {
        let path = FieldPath::parse(path)?;
        self.tree.get(&path)?.as_leaf()?;
        Some(path)
    }

    fn revalidate_under(&mut self, prefix: &FieldPath) {
        for path in self.tree.leaf_paths_under(prefix) {
            revalidate_leaf(&self.descriptors, &mut self.tree, &path);
        }
    }

    /// Recomputes the hidden set and returns a visibility event for every
    /// node whose state flipped.
    fn refresh_visibility(&mut self) -> Vec<(FormEventKind, FieldPath)> {
        let hidden = self.compute_hidden();
        let changed: Vec<(FormEventKind, FieldPath)> = hidden
            .symmetric_difference(&self.hidden)
            .map(|p| (FormEventKind::VisibilityChanged, p.clone()))
            .collect();
        self.hidden = hidden;
        changed
    }

    fn compute_hidden(&self) -> BTreeSet<FieldPath> {
        let root = self.tree.raw_value();
        let mut hidden = BTreeSet::new();
        for descriptor in &self.descriptors {
            mark_hidden(
                descriptor,
                &FieldPath::root().field(&descriptor.name),
                &root,
                &root,
                false,
                &mut hidden,
            );
        }
        hidden
    }
}

#[cfg(feature = "cel-eval")]
fn default_evaluator() -> Option<Box<dyn CelEvaluator>> {
    Some(Box::new(crate::evaluate::default_cel_evaluator()))
}

#[cfg(not(feature = "cel-eval"))]
fn default_evaluator() -> Option<Box<dyn CelEvaluator>> {
    None
}

fn revalidate_leaf(descriptors: &[FieldDescriptor], tree: &mut StateTree, path: &FieldPath) {
    let Some(descriptor) = FieldDescriptor::find(descriptors, path) else {
        return;
    };
    if let Some(leaf) = tree.get_mut(path).and_then(StateNode::as_leaf_mut) {
        match validate_leaf(descriptor, &leaf.value) {
            Ok(()) => {
                leaf.valid = true;
                leaf.error = None;
            }
            Err(message) => {
                leaf.valid = false;
                leaf.error = Some(message);
            }
        }
    }
}

/// Walks one descriptor over the current values, recording hidden paths.
/// `scope` is the value of the enclosing object; a node's own value becomes
/// the scope of its children.
fn mark_hidden(
    descriptor: &FieldDescriptor,
    path: &FieldPath,
    scope: &Value,
    root: &Value,
    ancestor_hidden: bool,
    out: &mut BTreeSet<FieldPath>,
) {
    let hidden = ancestor_hidden
        || descriptor
            .condition
            .as_ref()
            .is_some_and(|c| !evaluate_condition(c, scope, root));
    if hidden {
        out.insert(path.clone());
    }

    let own = resolve_path(path, root).unwrap_or(&Value::Null);
    if let Some(nested) = &descriptor.nested {
        for child in nested {
            mark_hidden(child, &path.field(&child.name), own, root, hidden, out);
        }
    }
    if let (Some(item), Value::Array(items)) = (&descriptor.item, own) {
        for i in 0..items.len() {
            mark_hidden(item, &path.index(i), scope, root, hidden, out);
        }
    }
}

fn coerce_input(kind: FieldKind, value: Value) -> Value {
    match (kind, value) {
        (FieldKind::Number, Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => number_value(n),
                    _ => Value::String(s),
                }
            }
        }
        (_, value) => value,
    }
}

fn template_of(path: &str) -> String {
    match FieldPath::parse(path) {
        Some(p) => p.template(),
        None => path.to_string(),
    }
}

fn find_by_template_mut<'a>(
    descriptors: &'a mut [FieldDescriptor],
    template: &str,
) -> Option<&'a mut FieldDescriptor> {
    for descriptor in descriptors {
        if descriptor.path == template {
            return Some(descriptor);
        }
        if !template.starts_with(descriptor.path.as_str()) {
            continue;
        }
        if let Some(nested) = descriptor.nested.as_mut()
            && let Some(found) = find_by_template_mut(nested, template)
        {
            return Some(found);
        }
        if let Some(item) = descriptor.item.as_mut()
            && let Some(found) = find_by_template_mut(std::slice::from_mut(item.as_mut()), template)
        {
            return Some(found);
        }
    }
    None
}

/// Removes the key a path ends in. Paths ending in an index are left alone
/// so sibling indices stay stable.
fn remove_at(value: &mut Value, path: &FieldPath) {
    let Some((PathSegment::Field(last), parents)) = path.segments().split_last() else {
        return;
    };
    let mut current = value;
    for seg in parents {
        let next = match seg {
            PathSegment::Field(name) => current.get_mut(name.as_str()),
            PathSegment::Index(i) => current.get_mut(*i),
        };
        match next {
            Some(v) => current = v,
            None => return,
        }
    }
    if let Some(map) = current.as_object_mut() {
        map.remove(last);
    }
}
