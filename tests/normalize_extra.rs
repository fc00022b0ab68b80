use formwright::normalize::{normalize_node, normalize_value};
use formwright::schema::SchemaNode;
use serde_json::json;

#[test]
fn declared_order_and_stripping() {
    let schema = SchemaNode::object([
        ("b", SchemaNode::string()),
        ("a", SchemaNode::string()),
    ]);
    let normalized = normalize_value(&schema, &json!({"a": "1", "zzz": true, "b": "2"}));
    assert_eq!(normalized, json!({"b": "2", "a": "1"}));
    let keys: Vec<&String> = normalized.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["b", "a"]);
}

#[test]
fn optional_empties_are_removed() {
    let schema = SchemaNode::object([
        ("nick", SchemaNode::string().optional()),
        ("age", SchemaNode::number().optional()),
        ("note", SchemaNode::string().nullable()),
    ]);
    assert_eq!(
        normalize_value(&schema, &json!({"nick": "", "age": null, "note": null})),
        json!({"note": null})
    );
}

#[test]
fn defaults_fill_missing_values() {
    let schema = SchemaNode::object([
        ("country", SchemaNode::string().with_default(json!("NO"))),
        (
            "size",
            SchemaNode::string().optional().with_default(json!("M")),
        ),
        (
            "prefs",
            SchemaNode::object([("theme", SchemaNode::string().with_default(json!("dark")))])
                .with_default(json!({})),
        ),
    ]);
    assert_eq!(
        normalize_value(&schema, &json!({"size": ""})),
        json!({"country": "NO", "size": "M", "prefs": {"theme": "dark"}})
    );
}

#[test]
fn arrays_normalize_each_item() {
    let schema = SchemaNode::object([(
        "rows",
        SchemaNode::array(SchemaNode::object([
            ("id", SchemaNode::number()),
            ("tag", SchemaNode::string().optional()),
        ])),
    )]);
    assert_eq!(
        normalize_value(
            &schema,
            &json!({"rows": [{"id": 1, "tag": "", "x": 0}, {"id": 2, "tag": "t"}]})
        ),
        json!({"rows": [{"id": 1}, {"id": 2, "tag": "t"}]})
    );
}

#[test]
fn mismatched_shapes_pass_through() {
    let schema = SchemaNode::object([("meta", SchemaNode::object([("k", SchemaNode::string())]))]);
    assert_eq!(
        normalize_value(&schema, &json!({"meta": "flat"})),
        json!({"meta": "flat"})
    );
}

#[test]
fn absent_optional_root_is_none() {
    let schema = SchemaNode::string().optional();
    assert_eq!(normalize_node(&schema, None), None);
    assert_eq!(normalize_value(&schema, &json!("")), json!(null));
}

#[test]
fn normalization_is_idempotent() {
    let schema = SchemaNode::object([
        ("a", SchemaNode::string().optional()),
        ("b", SchemaNode::number().with_default(json!(5))),
        (
            "c",
            SchemaNode::array(SchemaNode::object([("d", SchemaNode::boolean())])),
        ),
    ]);
    let once = normalize_value(&schema, &json!({"a": "", "c": [{"d": true, "e": 1}]}));
    assert_eq!(normalize_value(&schema, &once), once);
}
