//! Wizard steps.
//!
//! [`StepController`] is the bare index state machine. The validation gate on
//! forward moves lives in [`Form::next_step`](crate::form::Form::next_step),
//! which owns the state tree the gate inspects.

use serde::{Deserialize, Serialize};

/// One wizard step: a title and the top-level fields it shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDeclaration {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Top-level field names belonging to this step.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Whether leaving the step forward requires its fields to be valid.
    #[serde(default = "default_true")]
    pub validate: bool,
}

fn default_true() -> bool {
    true
}

/// Current position within `0..len`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepController {
    current: usize,
    len: usize,
}

impl StepController {
    /// A controller over `len` steps. Zero declared steps still yield one
    /// implicit step.
    pub fn new(len: usize) -> Self {
        StepController {
            current: 0,
            len: len.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.len
    }

    /// Moves forward one step. Returns false at the last step.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Moves back one step. Returns false at the first step.
    pub fn retreat(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub(crate) fn reset(&mut self) {
        self.current = 0;
    }
}
