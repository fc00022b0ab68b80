use formwright::introspect::{FieldOverrides, introspect};
use formwright::schema::SchemaNode;
use formwright::tree::build_tree;
use proptest::prelude::*;
use serde_json::{Value, json};

/// Strategy for small nested object schemas. Names are unique per level.
fn arb_schema() -> impl Strategy<Value = SchemaNode> {
    let leaf = prop_oneof![
        Just(SchemaNode::string()),
        Just(SchemaNode::number()),
        Just(SchemaNode::boolean()),
        Just(SchemaNode::enumeration(["a", "b"])),
        Just(SchemaNode::string().optional()),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|children| {
                SchemaNode::object(
                    children
                        .into_iter()
                        .enumerate()
                        .map(|(i, node)| (format!("f{}", i), node)),
                )
            }),
            inner.prop_map(SchemaNode::array),
        ]
    })
    .prop_map(|node| match node.as_object() {
        Some(_) => node,
        None => SchemaNode::object([("root", node)]),
    })
}

fn arb_data() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({})),
        Just(json!({"f0": "x", "f1": [1, 2], "root": [{"f0": true}]})),
        Just(json!({"f0": {"f0": null}, "f2": [[]]})),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // The tree exposes exactly the schema's named-field paths
    #[test]
    fn tree_field_paths_match_schema(schema in arb_schema(), data in arb_data()) {
        let descriptors = introspect(&schema, &FieldOverrides::new());
        let tree = build_tree(&descriptors, &data);
        prop_assert_eq!(tree.field_paths(), schema.field_paths());
    }

    // One descriptor per top-level field, in declared order
    #[test]
    fn descriptors_follow_declaration_order(schema in arb_schema()) {
        let descriptors = introspect(&schema, &FieldOverrides::new());
        let declared: Vec<String> = schema
            .as_object()
            .map(|o| o.fields.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default();
        let described: Vec<String> = descriptors.iter().map(|d| d.name.clone()).collect();
        prop_assert_eq!(described, declared);
    }
}
