//! Semantic checks over a parsed [`FormDefinition`].
//!
//! Parsing guarantees the definition is well-typed; linting checks that its
//! parts agree with each other: steps and overrides name real fields,
//! conditions point somewhere, bounds are ordered and patterns compile.

use regex::Regex;
use std::collections::{BTreeSet, HashSet};

use crate::definition::FormDefinition;
use crate::error::{DefinitionError, Diagnostic, DiagnosticSeverity, LintResult};
use crate::introspect::{FieldOverrides, introspect, override_targets};
use crate::primitives::FieldPath;
use crate::schema::{CheckRule, Refinement, SchemaNode, Shape};

/// Runs every rule against a definition and collects errors and warnings.
pub fn lint(definition: &FormDefinition) -> LintResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    d001_unknown_step_member(definition, &mut errors);
    d002_duplicate_step_id(definition, &mut errors);
    d003_unknown_override_path(definition, &mut errors);
    d004_condition_target(definition, &mut errors);
    d005_unknown_group(definition, &mut errors);
    d006_bounds_order(definition, &mut errors);
    d007_item_bounds_order(definition, &mut errors);
    d008_pattern_valid(definition, &mut errors);
    d009_cel_valid(definition, &mut errors);

    w001_field_outside_steps(definition, &mut warnings);
    w002_structural_kind_override(definition, &mut warnings);
    w003_unused_group(definition, &mut warnings);

    LintResult { errors, warnings }
}

fn error(rule: &str, path: impl Into<String>, message: impl Into<String>) -> DefinitionError {
    DefinitionError {
        rule: rule.to_string(),
        path: path.into(),
        message: message.into(),
    }
}

fn warning(code: &str, path: impl Into<String>, message: impl Into<String>) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Warning,
        code: code.to_string(),
        path: Some(path.into()),
        message: message.into(),
    }
}

fn top_level_names(definition: &FormDefinition) -> Vec<&str> {
    definition
        .schema
        .as_object()
        .map(|o| o.fields.iter().map(|(n, _)| n.as_str()).collect())
        .unwrap_or_default()
}

/// Every template path an override or condition may name.
fn known_targets(definition: &FormDefinition) -> BTreeSet<String> {
    let descriptors = introspect(&definition.schema, &FieldOverrides::new());
    override_targets(&descriptors).into_iter().collect()
}

/// Visits every schema node depth-first with its display path
/// (`schema.address.city`, `schema.contacts[]`).
fn walk_schema<'a>(node: &'a SchemaNode, path: &str, visit: &mut dyn FnMut(&'a SchemaNode, &str)) {
    visit(node, path);
    match &node.peel().core.shape {
        Shape::Object(object) => {
            for (name, child) in &object.fields {
                walk_schema(child, &format!("{}.{}", path, name), visit);
            }
        }
        Shape::Array(array) => walk_schema(&array.item, &format!("{}[]", path), visit),
        _ => {}
    }
}

fn template_of(path: &str) -> Option<String> {
    FieldPath::parse(path).map(|p| p.template())
}

// ─── D-001 ──────────────────────────────────────────────────────────────────

fn d001_unknown_step_member(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    let names = top_level_names(definition);
    for (i, step) in definition.steps.iter().enumerate() {
        for (j, field) in step.fields.iter().enumerate() {
            if !names.contains(&field.as_str()) {
                errors.push(error(
                    "D-001",
                    format!("steps[{}].fields[{}]", i, j),
                    format!("step '{}' names unknown field '{}'", step.id, field),
                ));
            }
        }
    }
}

// ─── D-002 ──────────────────────────────────────────────────────────────────

fn d002_duplicate_step_id(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    let mut seen = HashSet::new();
    for (i, step) in definition.steps.iter().enumerate() {
        if !seen.insert(step.id.as_str()) {
            errors.push(error(
                "D-002",
                format!("steps[{}].id", i),
                format!("duplicate step id: '{}'", step.id),
            ));
        }
    }
}

// ─── D-003 ──────────────────────────────────────────────────────────────────

fn d003_unknown_override_path(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    let targets = known_targets(definition);
    for key in definition.overrides.keys() {
        if !targets.contains(key) {
            errors.push(error(
                "D-003",
                format!("overrides.{}", key),
                format!("override targets unknown field '{}'", key),
            ));
        }
    }
}

// ─── D-004 ──────────────────────────────────────────────────────────────────

fn d004_condition_target(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    let targets = known_targets(definition);

    // Override conditions resolve against the enclosing object first, then
    // the root.
    for (key, ov) in &definition.overrides {
        let Some(condition) = &ov.condition else {
            continue;
        };
        let scope = key.rsplit_once('.').map(|(scope, _)| scope);
        let found = template_of(&condition.field).is_some_and(|target| {
            scope.is_some_and(|s| targets.contains(&format!("{}.{}", s, target)))
                || targets.contains(&target)
        });
        if !found {
            errors.push(error(
                "D-004",
                format!("overrides.{}.condition.field", key),
                format!("condition targets unknown field '{}'", condition.field),
            ));
        }
    }

    // Refinements only see the object that declares them.
    walk_schema(&definition.schema, "schema", &mut |node, path| {
        let Some(object) = node.as_object() else {
            return;
        };
        let local = node.field_paths();
        let known = |field: &str| template_of(field).is_some_and(|t| local.contains(&t));
        for (i, refinement) in object.refinements.iter().enumerate() {
            let named: Vec<(&str, &str)> = match refinement {
                Refinement::Matches { field, other, .. } => {
                    vec![("field", field.as_str()), ("other", other.as_str())]
                }
                Refinement::RequiredIf { field, when, .. } => {
                    vec![("field", field.as_str()), ("when.field", when.field.as_str())]
                }
                Refinement::Expression { path: Some(p), .. } => vec![("path", p.as_str())],
                Refinement::Expression { path: None, .. } => Vec::new(),
            };
            for (slot, field) in named {
                if !known(field) {
                    errors.push(error(
                        "D-004",
                        format!("{}.refinements[{}].{}", path, i, slot),
                        format!("refinement targets unknown field '{}'", field),
                    ));
                }
            }
        }
    });
}

// ─── D-005 ──────────────────────────────────────────────────────────────────

fn d005_unknown_group(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    let groups: HashSet<&str> = definition.groups.iter().map(|g| g.id.as_str()).collect();
    for (key, ov) in &definition.overrides {
        if let Some(group) = &ov.group
            && !groups.contains(group.as_str())
        {
            errors.push(error(
                "D-005",
                format!("overrides.{}.group", key),
                format!("unknown group: '{}'", group),
            ));
        }
    }
}

// ─── D-006 ──────────────────────────────────────────────────────────────────

fn d006_bounds_order(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    walk_schema(&definition.schema, "schema", &mut |node, path| {
        let Shape::Leaf(leaf) = &node.peel().core.shape else {
            return;
        };
        let mut min = None;
        let mut max = None;
        let mut min_length = None;
        let mut max_length = None;
        for check in &leaf.checks {
            match check.rule {
                CheckRule::Min(n) => min = Some(n),
                CheckRule::Max(n) => max = Some(n),
                CheckRule::MinLength(n) => min_length = Some(n),
                CheckRule::MaxLength(n) => max_length = Some(n),
                _ => {}
            }
        }
        if let (Some(lo), Some(hi)) = (min, max)
            && lo > hi
        {
            errors.push(error(
                "D-006",
                path,
                format!("min ({}) is greater than max ({})", lo, hi),
            ));
        }
        if let (Some(lo), Some(hi)) = (min_length, max_length)
            && lo > hi
        {
            errors.push(error(
                "D-006",
                path,
                format!("min_length ({}) is greater than max_length ({})", lo, hi),
            ));
        }
    });
}

// ─── D-007 ──────────────────────────────────────────────────────────────────

fn d007_item_bounds_order(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    walk_schema(&definition.schema, "schema", &mut |node, path| {
        if let Shape::Array(array) = &node.peel().core.shape
            && let (Some(lo), Some(hi)) = (array.min_items, array.max_items)
            && lo > hi
        {
            errors.push(error(
                "D-007",
                path,
                format!("min_items ({}) is greater than max_items ({})", lo, hi),
            ));
        }
    });
}

// ─── D-008 ──────────────────────────────────────────────────────────────────

fn d008_pattern_valid(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    walk_schema(&definition.schema, "schema", &mut |node, path| {
        let Shape::Leaf(leaf) = &node.peel().core.shape else {
            return;
        };
        for check in &leaf.checks {
            if let CheckRule::Pattern(p) = &check.rule
                && let Err(e) = Regex::new(p)
            {
                errors.push(error("D-008", path, format!("invalid regex: {}", e)));
            }
        }
    });
}

// ─── D-009 ──────────────────────────────────────────────────────────────────

fn d009_cel_valid(definition: &FormDefinition, errors: &mut Vec<DefinitionError>) {
    #[cfg(feature = "cel-eval")]
    walk_schema(&definition.schema, "schema", &mut |node, path| {
        let Some(object) = node.as_object() else {
            return;
        };
        for (i, refinement) in object.refinements.iter().enumerate() {
            if let Refinement::Expression { cel, .. } = refinement
                && let Err(e) = cel::Program::compile(cel)
            {
                errors.push(error(
                    "D-009",
                    format!("{}.refinements[{}].cel", path, i),
                    format!("invalid CEL expression: {}", e),
                ));
            }
        }
    });
    #[cfg(not(feature = "cel-eval"))]
    let _ = (definition, errors);
}

// ─── Warnings ───────────────────────────────────────────────────────────────

fn w001_field_outside_steps(definition: &FormDefinition, warnings: &mut Vec<Diagnostic>) {
    if definition.steps.is_empty() {
        return;
    }
    let assigned: HashSet<&str> = definition
        .steps
        .iter()
        .flat_map(|s| s.fields.iter().map(String::as_str))
        .collect();
    for name in top_level_names(definition) {
        if !assigned.contains(name) {
            warnings.push(warning(
                "W-001",
                format!("schema.{}", name),
                format!("field '{}' is not shown on any step", name),
            ));
        }
    }
}

fn w002_structural_kind_override(definition: &FormDefinition, warnings: &mut Vec<Diagnostic>) {
    let descriptors = introspect(&definition.schema, &FieldOverrides::new());
    for (key, ov) in &definition.overrides {
        let Some(kind) = ov.kind else {
            continue;
        };
        let target = descriptors
            .iter()
            .flat_map(|d| d.walk())
            .find(|d| &d.path == key);
        if let Some(target) = target
            && (!kind.is_leaf() || !target.kind.is_leaf())
        {
            warnings.push(warning(
                "W-002",
                format!("overrides.{}.kind", key),
                format!(
                    "kind override {:?} on a {:?} field is ignored",
                    kind, target.kind
                ),
            ));
        }
    }
}

fn w003_unused_group(definition: &FormDefinition, warnings: &mut Vec<Diagnostic>) {
    let used: HashSet<&str> = definition
        .overrides
        .values()
        .filter_map(|o| o.group.as_deref())
        .collect();
    for (i, group) in definition.groups.iter().enumerate() {
        if !used.contains(group.id.as_str()) {
            warnings.push(warning(
                "W-003",
                format!("groups[{}]", i),
                format!("group '{}' has no fields", group.id),
            ));
        }
    }
}
