use formwright::enums::FieldKind;
use formwright::introspect::{FieldDescriptor, FieldOverride, FieldOverrides, introspect};
use formwright::primitives::FieldPath;
use formwright::schema::SchemaNode;
use serde_json::json;

fn no_overrides() -> FieldOverrides {
    FieldOverrides::new()
}

#[test]
fn kinds_follow_schema_shape() {
    let schema = SchemaNode::object([
        ("name", SchemaNode::string()),
        ("email", SchemaNode::string().email()),
        ("age", SchemaNode::integer()),
        ("rate", SchemaNode::number()),
        ("active", SchemaNode::boolean()),
        ("role", SchemaNode::enumeration(["a", "b"])),
        ("born", SchemaNode::date()),
        ("blob", SchemaNode::unknown()),
        (
            "address",
            SchemaNode::object([("city", SchemaNode::string())]),
        ),
        ("tags", SchemaNode::array(SchemaNode::string())),
    ]);
    let kinds: Vec<FieldKind> = introspect(&schema, &no_overrides())
        .iter()
        .map(|d| d.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            FieldKind::Text,
            FieldKind::Email,
            FieldKind::Number,
            FieldKind::Number,
            FieldKind::Checkbox,
            FieldKind::Select,
            FieldKind::Date,
            FieldKind::Text,
            FieldKind::Composite,
            FieldKind::Repeating,
        ]
    );
}

#[test]
fn declaration_order_is_kept() {
    let schema = SchemaNode::object([
        ("zeta", SchemaNode::string()),
        ("alpha", SchemaNode::string()),
        ("mid", SchemaNode::string()),
    ]);
    let names: Vec<String> = introspect(&schema, &no_overrides())
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn wrappers_mark_fields_optional() {
    let schema = SchemaNode::object([
        ("a", SchemaNode::string()),
        ("b", SchemaNode::string().optional()),
        ("c", SchemaNode::string().nullable()),
        ("d", SchemaNode::string().nullable().optional()),
    ]);
    let fields = introspect(&schema, &no_overrides());
    let required: Vec<bool> = fields.iter().map(|d| d.required).collect();
    assert_eq!(required, vec![true, false, true, false]);
    let nullable: Vec<bool> = fields.iter().map(|d| d.nullable).collect();
    assert_eq!(nullable, vec![false, false, true, true]);
}

#[test]
fn labels_come_from_description_or_identifier() {
    let schema = SchemaNode::object([
        ("hourlyRate", SchemaNode::number()),
        ("email", SchemaNode::string().describe("E-mail|Used for login")),
        ("note", SchemaNode::string().describe("|Only a hint")),
        ("city", SchemaNode::string().optional().describe("Town")),
    ]);
    let fields = introspect(&schema, &no_overrides());

    assert_eq!(fields[0].label, "Hourly Rate");
    assert_eq!(fields[0].hint, None);
    assert_eq!(fields[1].label, "E-mail");
    assert_eq!(fields[1].hint.as_deref(), Some("Used for login"));
    assert_eq!(fields[2].label, "Note");
    assert_eq!(fields[2].hint.as_deref(), Some("Only a hint"));
    assert_eq!(fields[3].label, "Town");
}

#[test]
fn constraints_are_extracted() {
    let schema = SchemaNode::object([
        ("age", SchemaNode::number().min(18.0).max(99.0)),
        (
            "code",
            SchemaNode::string().min_length(2).max_length(4).pattern("^[A-Z]+$"),
        ),
        ("role", SchemaNode::enumeration(["admin", "editor"])),
        (
            "tags",
            SchemaNode::array(SchemaNode::string()).min_items(1).max_items(3),
        ),
    ]);
    let fields = introspect(&schema, &no_overrides());

    assert_eq!(fields[0].constraints.min, Some(18.0));
    assert_eq!(fields[0].constraints.max, Some(99.0));
    assert_eq!(fields[1].constraints.min_length, Some(2));
    assert_eq!(fields[1].constraints.max_length, Some(4));
    assert_eq!(fields[1].constraints.pattern.as_deref(), Some("^[A-Z]+$"));
    assert_eq!(
        fields[2].constraints.options,
        Some(vec!["admin".to_string(), "editor".to_string()])
    );
    assert_eq!(fields[3].constraints.min_items, Some(1));
    assert_eq!(fields[3].constraints.max_items, Some(3));
}

#[test]
fn nested_and_item_paths_use_templates() {
    let schema = SchemaNode::object([
        (
            "address",
            SchemaNode::object([("city", SchemaNode::string())]),
        ),
        (
            "contacts",
            SchemaNode::array(SchemaNode::object([("phone", SchemaNode::string())])),
        ),
    ]);
    let fields = introspect(&schema, &no_overrides());

    let city = &fields[0].nested.as_ref().unwrap()[0];
    assert_eq!(city.path, "address.city");

    let item = fields[1].item.as_deref().unwrap();
    assert_eq!(item.path, "contacts[]");
    assert_eq!(item.kind, FieldKind::Composite);
    assert_eq!(item.label, "Contacts");
    assert_eq!(item.nested.as_ref().unwrap()[0].path, "contacts[].phone");
}

#[test]
fn find_walks_indices_through_items() {
    let schema = SchemaNode::object([(
        "contacts",
        SchemaNode::array(SchemaNode::object([("phone", SchemaNode::string())])),
    )]);
    let fields = introspect(&schema, &no_overrides());

    let path = FieldPath::parse("contacts[4].phone").unwrap();
    let found = FieldDescriptor::find(&fields, &path).unwrap();
    assert_eq!(found.path, "contacts[].phone");

    assert!(FieldDescriptor::find(&fields, &FieldPath::parse("contacts.phone").unwrap()).is_none());
    assert!(FieldDescriptor::find(&fields, &FieldPath::root()).is_none());
}

#[test]
fn overrides_win_property_by_property() {
    let schema = SchemaNode::object([
        ("bio", SchemaNode::string().describe("Biography|Tell us about you")),
        (
            "contacts",
            SchemaNode::array(SchemaNode::object([("phone", SchemaNode::string())])),
        ),
    ]);
    let mut overrides = FieldOverrides::new();
    overrides.insert(
        "bio".into(),
        FieldOverride {
            kind: Some(FieldKind::Textarea),
            placeholder: Some("A few words".into()),
            col_span: Some(2),
            ..Default::default()
        },
    );
    overrides.insert(
        "contacts[].phone".into(),
        FieldOverride {
            label: Some("Phone number".into()),
            ..Default::default()
        },
    );
    overrides.insert(
        "contacts".into(),
        FieldOverride {
            kind: Some(FieldKind::Text),
            ..Default::default()
        },
    );
    let fields = introspect(&schema, &overrides);

    let bio = &fields[0];
    assert_eq!(bio.kind, FieldKind::Textarea);
    assert_eq!(bio.label, "Biography");
    assert_eq!(bio.hint.as_deref(), Some("Tell us about you"));
    assert_eq!(bio.placeholder.as_deref(), Some("A few words"));
    assert_eq!(bio.col_span, Some(2));

    // Structural kinds cannot be overridden.
    assert_eq!(fields[1].kind, FieldKind::Repeating);
    let phone = &fields[1].item.as_ref().unwrap().nested.as_ref().unwrap()[0];
    assert_eq!(phone.label, "Phone number");
}

#[test]
fn defaults_are_carried() {
    let schema = SchemaNode::object([
        ("country", SchemaNode::string().with_default(json!("NO"))),
        (
            "count",
            SchemaNode::number().with_default(json!(3)).optional(),
        ),
    ]);
    let fields = introspect(&schema, &no_overrides());
    assert_eq!(fields[0].default_value, Some(json!("NO")));
    assert_eq!(fields[1].default_value, Some(json!(3)));
}

#[test]
fn non_object_root_yields_nothing() {
    assert!(introspect(&SchemaNode::string(), &no_overrides()).is_empty());
    assert!(
        introspect(
            &SchemaNode::array(SchemaNode::string()),
            &no_overrides()
        )
        .is_empty()
    );
}
