use formwright::normalize::normalize_value;
use formwright::schema::SchemaNode;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn schema() -> SchemaNode {
    SchemaNode::object([
        ("name", SchemaNode::string()),
        ("nick", SchemaNode::string().optional()),
        ("age", SchemaNode::number().optional()),
        ("country", SchemaNode::string().with_default(json!("NO"))),
        (
            "rows",
            SchemaNode::array(SchemaNode::object([
                ("id", SchemaNode::number()),
                ("note", SchemaNode::string().optional()),
            ])),
        ),
    ])
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!("")),
        "[a-z]{1,5}".prop_map(Value::String),
        (-50i64..50).prop_map(|n| json!(n)),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// Random objects over the declared keys plus one stray key.
fn arb_object(keys: &'static [&'static str]) -> impl Strategy<Value = Value> {
    prop::collection::vec((prop::sample::select(keys), arb_leaf()), 0..6).prop_map(|entries| {
        let mut map = Map::new();
        for (k, v) in entries {
            map.insert(k.to_string(), v);
        }
        Value::Object(map)
    })
}

fn arb_data() -> impl Strategy<Value = Value> {
    (
        arb_object(&["name", "nick", "age", "country", "stray"]),
        prop::collection::vec(arb_object(&["id", "note", "stray"]), 0..3),
        any::<bool>(),
    )
        .prop_map(|(mut top, rows, with_rows)| {
            if with_rows && let Some(map) = top.as_object_mut() {
                map.insert("rows".into(), Value::Array(rows));
            }
            top
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // normalize(normalize(x)) == normalize(x)
    #[test]
    fn idempotent(data in arb_data()) {
        let s = schema();
        let once = normalize_value(&s, &data);
        let twice = normalize_value(&s, &once);
        prop_assert_eq!(twice, once);
    }

    // Undeclared keys never survive
    #[test]
    fn strays_are_stripped(data in arb_data()) {
        let normalized = normalize_value(&schema(), &data);
        let object = normalized.as_object().expect("object in, object out");
        prop_assert!(!object.contains_key("stray"));
        if let Some(Value::Array(rows)) = object.get("rows") {
            for row in rows {
                prop_assert!(row.get("stray").is_none());
            }
        }
    }

    // Optional empties are dropped and defaults fill gaps
    #[test]
    fn optional_and_default_handling(data in arb_data()) {
        let normalized = normalize_value(&schema(), &data);
        for key in ["nick", "age"] {
            if let Some(v) = normalized.get(key) {
                prop_assert!(!v.is_null() && v != &json!(""), "{} kept as {}", key, v);
            }
        }
        prop_assert!(normalized.get("country").is_some());
    }
}
