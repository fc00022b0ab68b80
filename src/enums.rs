//! Closed enumerations used throughout the form engine.
//!
//! Every variant set here is fixed; unknown strings are rejected at parse time
//! rather than carried through as open values.

use serde::{Deserialize, Serialize};

/// Presentation kind of a field, derived from its schema shape or requested
/// through an override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Textarea,
    Number,
    Checkbox,
    Select,
    Date,
    Composite,
    Repeating,
}

impl FieldKind {
    /// True for kinds backed by a single scalar value.
    pub fn is_leaf(self) -> bool {
        !matches!(self, FieldKind::Composite | FieldKind::Repeating)
    }
}

/// Comparison applied by a visibility [`Condition`](crate::condition::Condition).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    #[serde(alias = "eq")]
    Equals,
    #[serde(alias = "notEquals", alias = "ne")]
    NotEquals,
    Contains,
    #[serde(alias = "greaterThan", alias = "gt")]
    GreaterThan,
    #[serde(alias = "lessThan", alias = "lt")]
    LessThan,
    Truthy,
    Falsy,
}

impl ConditionOperator {
    /// Whether the operator reads a comparison value.
    pub fn takes_value(self) -> bool {
        !matches!(self, ConditionOperator::Truthy | ConditionOperator::Falsy)
    }
}

/// How fields hidden by a condition are treated at submit time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenFieldPolicy {
    /// Hidden fields are validated and submitted like visible ones.
    #[default]
    Enforce,
    /// Hidden fields are removed from the submit-time schema and value.
    Exempt,
}

/// Kind of change delivered to form subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormEventKind {
    ValueChanged,
    Touched,
    ItemAdded,
    ItemRemoved,
    VisibilityChanged,
    OptionsChanged,
    StepChanged,
    GroupToggled,
    Submitted,
    SubmitRejected,
    Reset,
}
