use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::definition::FormDefinition;
use crate::error::{ParseError, ParseErrorKind};
use crate::schema::schema_from_value;

const TOP_LEVEL_KEYS: &[&str] = &["schema", "steps", "groups", "overrides", "options"];

/// Parse a YAML string into an unlinted [`FormDefinition`].
///
/// Performs YAML deserialization and type mapping only. Cross-references
/// between steps, overrides and the schema are checked by
/// [`lint`](crate::lint::lint).
pub fn parse(input: &str) -> Result<FormDefinition, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Syntax, "empty input"));
    }

    check_multi_document(input)?;

    // YAML goes through serde_json::Value so that declared field order
    // survives (preserve_order) and schema nodes get path-aware errors.
    let value: Value = serde_saphyr::from_str(input)
        .map_err(|e| ParseError::new(ParseErrorKind::Syntax, e.to_string()))?;

    let Some(root) = value.as_object() else {
        return Err(ParseError::new(
            ParseErrorKind::TypeMismatch,
            "document root must be a YAML mapping",
        ));
    };

    for key in root.keys() {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            return Err(ParseError::new(
                ParseErrorKind::UnknownField,
                format!("unknown top-level field: {}", key),
            )
            .at(key.clone()));
        }
    }

    let schema = root.get("schema").ok_or_else(|| {
        ParseError::new(ParseErrorKind::TypeMismatch, "missing field 'schema'").at("schema")
    })?;
    let schema = schema_from_value(schema, "schema").map_err(schema_error)?;

    let mut definition = FormDefinition::new(schema);
    if let Some(steps) = section(root.get("steps"), "steps")? {
        definition.steps = steps;
    }
    if let Some(groups) = section(root.get("groups"), "groups")? {
        definition.groups = groups;
    }
    if let Some(overrides) = section(root.get("overrides"), "overrides")? {
        definition.overrides = overrides;
    }
    if let Some(options) = section(root.get("options"), "options")? {
        definition.options = options;
    }
    Ok(definition)
}

/// Deserializes one optional top-level section. An explicit `null` counts
/// as absent.
fn section<T: DeserializeOwned>(value: Option<&Value>, key: &str) -> Result<Option<T>, ParseError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(|e| {
            let msg = e.to_string();
            ParseError::new(classify_error(&msg), msg).at(key)
        }),
    }
}

/// Schema errors arrive as `path: message`.
fn schema_error(msg: String) -> ParseError {
    let kind = if msg.contains("unknown schema key") {
        ParseErrorKind::UnknownField
    } else {
        classify_error(&msg)
    };
    match msg.split_once(": ") {
        Some((path, message)) if path.starts_with("schema") && !path.contains(' ') => {
            ParseError::new(kind, message).at(path)
        }
        _ => ParseError::new(kind, msg).at("schema"),
    }
}

/// Check for multiple YAML documents (--- separator).
/// Only matches `---` at column 0 to avoid false positives inside block scalars.
fn check_multi_document(input: &str) -> Result<(), ParseError> {
    let markers = input
        .lines()
        .filter(|line| line.starts_with("---") && line[3..].trim().is_empty())
        .count();
    if markers > 1 {
        return Err(ParseError::new(
            ParseErrorKind::Syntax,
            "multi-document YAML is not supported",
        ));
    }
    Ok(())
}

fn classify_error(msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown field") || lower.contains("unknown variant") {
        ParseErrorKind::UnknownField
    } else if lower.contains("missing field")
        || lower.contains("invalid type")
        || lower.contains("expected")
        || lower.contains("must be")
        || lower.contains("requires")
        || lower.contains("unknown schema type")
    {
        ParseErrorKind::TypeMismatch
    } else {
        ParseErrorKind::Syntax
    }
}

