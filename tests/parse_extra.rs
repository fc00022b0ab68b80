use formwright::enums::{ConditionOperator, FieldKind, HiddenFieldPolicy};
use formwright::error::ParseErrorKind;
use formwright::parse::parse;
use formwright::schema::{CheckRule, Refinement, Scalar, SchemaNode, Shape};

fn parse_err(input: &str) -> formwright::ParseError {
    parse(input).expect_err("parse should fail")
}

#[test]
fn full_definition_parses() {
    let yaml = r#"
schema:
  type: object
  fields:
    name: { type: string, description: "Full name" }
    age: { type: integer, optional: true, checks: [{ min: 18, message: "Adults only" }, int] }
    kind: { type: enum, options: [a, b] }
steps:
  - id: one
    title: First
    fields: [name, age]
  - id: two
    fields: [kind]
    validate: false
groups:
  - id: extra
    title: Extra
overrides:
  age:
    label: Your age
    kind: number
    condition: { field: kind, operator: gt, value: 3 }
    group: extra
options:
  hidden_fields: exempt
"#;
    let def = parse(yaml).expect("should parse");

    let root = def.schema.as_object().unwrap();
    let names: Vec<&str> = root.fields.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["name", "age", "kind"]);

    let age = root.field("age").unwrap();
    assert!(age.is_optional());
    let Shape::Leaf(leaf) = &age.peel().core.shape else {
        panic!("age should be a leaf");
    };
    assert_eq!(leaf.scalar, Scalar::Integer);
    assert_eq!(leaf.checks[0].rule, CheckRule::Min(18.0));
    assert_eq!(leaf.checks[0].message.as_deref(), Some("Adults only"));
    assert_eq!(leaf.checks[1].rule, CheckRule::Integer);

    assert_eq!(def.steps.len(), 2);
    assert!(def.steps[0].validate);
    assert!(!def.steps[1].validate);
    assert_eq!(def.steps[0].title.as_deref(), Some("First"));
    assert!(!def.groups[0].collapsed_by_default);

    let ov = &def.overrides["age"];
    assert_eq!(ov.label.as_deref(), Some("Your age"));
    assert_eq!(ov.kind, Some(FieldKind::Number));
    assert_eq!(
        ov.condition.as_ref().unwrap().operator,
        ConditionOperator::GreaterThan
    );
    assert_eq!(def.options.hidden_fields, HiddenFieldPolicy::Exempt);
}

#[test]
fn long_form_wrappers_and_refinements() {
    let yaml = r#"
schema:
  type: object
  fields:
    nick:
      type: optional
      inner: { type: string, checks: [{ max_length: 10 }] }
    password: { type: string }
    confirm: { type: string }
  refinements:
    - matches: { field: password, other: confirm, message: "Must match" }
    - required_if:
        field: nick
        when: { field: password, operator: truthy }
"#;
    let def = parse(yaml).unwrap();
    let root = def.schema.as_object().unwrap();
    assert!(matches!(root.field("nick").unwrap().shape, Shape::Optional(_)));
    assert_eq!(root.refinements.len(), 2);
    assert!(matches!(root.refinements[0], Refinement::Matches { .. }));
    assert!(matches!(root.refinements[1], Refinement::RequiredIf { .. }));
}

#[test]
fn schema_roundtrips_through_serde() {
    let schema = SchemaNode::object([
        ("email", SchemaNode::string().email().describe("Email|Work")),
        (
            "tags",
            SchemaNode::array(SchemaNode::enumeration(["x", "y"]))
                .min_items(1)
                .max_items(2),
        ),
        ("age", SchemaNode::number().min(0.0).optional()),
    ]);
    let value = serde_json::to_value(&schema).unwrap();
    let back: SchemaNode = serde_json::from_value(value).unwrap();
    assert_eq!(back, schema);
}

#[test]
fn empty_input_is_a_syntax_error() {
    let err = parse_err("   \n");
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.message, "empty input");
}

#[test]
fn root_must_be_a_mapping() {
    let err = parse_err("- a\n- b\n");
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
}

#[test]
fn unknown_top_level_key() {
    let err = parse_err("schema: { type: object }\nlayout: grid\n");
    assert_eq!(err.kind, ParseErrorKind::UnknownField);
    assert_eq!(err.path.as_deref(), Some("layout"));
}

#[test]
fn missing_schema() {
    let err = parse_err("steps: []\n");
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
    assert_eq!(err.path.as_deref(), Some("schema"));
}

#[test]
fn unknown_schema_key_reports_its_path() {
    let yaml = r#"
schema:
  type: object
  fields:
    age: { type: number, minimum: 3 }
"#;
    let err = parse_err(yaml);
    assert_eq!(err.kind, ParseErrorKind::UnknownField);
    assert_eq!(err.path.as_deref(), Some("schema.age"));
    assert!(err.message.contains("minimum"));
}

#[test]
fn unknown_schema_type() {
    let err = parse_err("schema: { type: object, fields: { a: { type: money } } }\n");
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
    assert_eq!(err.path.as_deref(), Some("schema.a"));
}

#[test]
fn bad_check_is_rejected() {
    let err = parse_err("schema: { type: object, fields: { a: { type: string, checks: [shiny] } } }\n");
    assert_eq!(err.path.as_deref(), Some("schema.a"));
    assert!(err.message.contains("unknown check"));
}

#[test]
fn unknown_step_key_is_rejected() {
    let yaml = r#"
schema: { type: object }
steps:
  - id: one
    colour: blue
"#;
    let err = parse_err(yaml);
    assert_eq!(err.kind, ParseErrorKind::UnknownField);
    assert_eq!(err.path.as_deref(), Some("steps"));
}

#[test]
fn unknown_operator_is_rejected() {
    let yaml = r#"
schema: { type: object, fields: { a: { type: string } } }
overrides:
  a:
    condition: { field: a, operator: resembles, value: x }
"#;
    let err = parse_err(yaml);
    assert_eq!(err.kind, ParseErrorKind::UnknownField);
    assert_eq!(err.path.as_deref(), Some("overrides"));
}

#[test]
fn multi_document_is_rejected() {
    let err = parse_err("---\nschema: { type: object }\n---\nschema: { type: object }\n");
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn null_sections_are_absent() {
    let def = parse("schema: { type: object }\nsteps: ~\noverrides: ~\n").unwrap();
    assert!(def.steps.is_empty());
    assert!(def.overrides.is_empty());
}
