//! Schema-driven dynamic forms.
//!
//! `formwright` turns a data schema into a live form: it derives field
//! metadata from the schema, builds a state tree mirroring it (nested objects,
//! repeating groups, wizard steps), validates every write with the schema's
//! own rules, evaluates field-to-field visibility conditions and gates step
//! transitions and submission on validity.
//!
//! ```text
//! parse(yaml) → FormDefinition → lint(def) → LintResult
//!                              → Form::new(def, initial) → set_value / next_step / submit
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//!
//! let yaml = r#"
//! schema:
//!   type: object
//!   fields:
//!     email: { type: string, checks: [email], description: "Email|Work address" }
//!     age: { type: number, optional: true, checks: [{ min: 18 }] }
//! "#;
//!
//! let loaded = formwright::load(yaml).expect("valid definition");
//! let mut form = formwright::Form::new(loaded.definition, json!({}));
//!
//! form.set_value("email", json!("ada@example.com"));
//! form.set_value("age", json!("21"));
//! assert_eq!(
//!     form.submit(),
//!     Some(json!({ "email": "ada@example.com", "age": 21 }))
//! );
//! ```
//!
//! # Feature Flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `cel-eval` | yes     | CEL expression refinements via the [`cel`] crate. Enables [`evaluate::DefaultCelEvaluator`]. |
//!
//! # Logging
//!
//! The engine emits [`tracing`] events (`debug` for step, item and submit
//! transitions, `trace` for value writes, `warn` for ignored operations).
//! No subscriber is installed.

pub mod condition;
pub mod definition;
pub mod enums;
pub mod error;
pub mod evaluate;
pub mod form;
pub mod groups;
pub mod introspect;
pub mod lint;
pub mod normalize;
pub mod parse;
pub mod primitives;
pub mod schema;
pub mod steps;
pub mod tree;
pub mod validate;

pub use condition::Condition;
pub use definition::{FormDefinition, FormOptions};
pub use enums::*;
pub use error::*;
pub use form::{FieldView, Form, FormEvent, SubscriptionId};
pub use introspect::{FieldDescriptor, FieldOverride, FieldOverrides};
pub use primitives::FieldPath;
pub use schema::SchemaNode;

// Re-export entry-point functions at the crate root for convenience.
pub use introspect::introspect;
pub use lint::lint;
pub use normalize::normalize_value;
pub use parse::parse;
pub use tree::build_tree;
pub use validate::{validate_leaf, validate_value};

/// Result of the [`load`] convenience entry point.
#[derive(Debug)]
pub struct LoadResult {
    /// The parsed and linted definition.
    pub definition: FormDefinition,
    /// Non-fatal warnings produced during linting.
    pub warnings: Vec<Diagnostic>,
}

/// Convenience entry point composing parse → lint.
///
/// # Errors
///
/// Returns `Err(Vec<FormError>)` if parsing fails or linting finds errors.
///
/// # Example
///
/// ```rust
/// let yaml = r#"
/// schema:
///   type: object
///   fields:
///     name: { type: string }
/// steps:
///   - id: basics
///     fields: [name, nickname]
/// "#;
///
/// match formwright::load(yaml) {
///     Ok(result) => println!("Loaded with {} warnings", result.warnings.len()),
///     Err(errors) => eprintln!("{} errors", errors.len()),
/// }
/// ```
pub fn load(input: &str) -> Result<LoadResult, Vec<FormError>> {
    let definition = parse::parse(input).map_err(|e| vec![FormError::Parse(e)])?;

    let result = lint::lint(&definition);
    if !result.errors.is_empty() {
        return Err(result
            .errors
            .into_iter()
            .map(FormError::Definition)
            .collect());
    }

    Ok(LoadResult {
        definition,
        warnings: result.warnings,
    })
}
