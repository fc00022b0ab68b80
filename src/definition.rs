//! Form definitions: everything a form instance is built from except its
//! initial data.

use serde::{Deserialize, Serialize};

use crate::enums::HiddenFieldPolicy;
use crate::groups::GroupDeclaration;
use crate::introspect::FieldOverrides;
use crate::schema::SchemaNode;
use crate::steps::StepDeclaration;

/// Engine options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormOptions {
    /// Treatment of condition-hidden fields at submit.
    #[serde(default)]
    pub hidden_fields: HiddenFieldPolicy,
}

/// A schema plus its presentation declarations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub schema: SchemaNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDeclaration>,
    #[serde(default, skip_serializing_if = "FieldOverrides::is_empty")]
    pub overrides: FieldOverrides,
    #[serde(default)]
    pub options: FormOptions,
}

impl FormDefinition {
    /// A definition with no steps, groups or overrides.
    pub fn new(schema: SchemaNode) -> Self {
        FormDefinition {
            schema,
            steps: Vec::new(),
            groups: Vec::new(),
            overrides: FieldOverrides::new(),
            options: FormOptions::default(),
        }
    }

    pub fn with_steps(mut self, steps: Vec<StepDeclaration>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_groups(mut self, groups: Vec<GroupDeclaration>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_overrides(mut self, overrides: FieldOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }
}
