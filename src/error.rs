use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic severity level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A structured non-fatal message produced while linting a form definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

/// Error kind for parse failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
    UnknownField,
}

/// Produced by `parse` when a form definition cannot be deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", display_parse_error(.message, .path))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn display_parse_error(message: &str, path: &Option<String>) -> String {
    match path {
        Some(p) => format!("{}: {}", p, message),
        None => message.to_string(),
    }
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            path: None,
        }
    }

    pub(crate) fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Produced by `lint` when a form definition is internally inconsistent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{rule} at {path}: {message}")]
pub struct DefinitionError {
    pub rule: String,
    pub path: String,
    pub message: String,
}

/// Result of linting: errors and warnings.
#[derive(Clone, Debug, Default)]
pub struct LintResult {
    pub errors: Vec<DefinitionError>,
    pub warnings: Vec<Diagnostic>,
}

impl LintResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Machine-readable category of a [`FieldIssue`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidType,
    TooSmall,
    TooBig,
    InvalidFormat,
    InvalidOption,
    TooFewItems,
    TooManyItems,
    Refinement,
}

/// A single failure found by full-schema validation.
///
/// `path` uses the same syntax as the state tree (`contacts[1].email`); the
/// empty string refers to the root object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{path}: {message}")]
pub struct FieldIssue {
    pub code: IssueCode,
    pub path: String,
    pub message: String,
}

/// Error returned by a [`CelEvaluator`](crate::evaluate::CelEvaluator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct EvaluationError {
    pub message: String,
}

/// Combined error type for the `load` entry point.
#[derive(Clone, Debug, Error)]
pub enum FormError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),
}
