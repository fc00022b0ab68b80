use formwright::normalize::normalize_value;
use formwright::schema::SchemaNode;
use formwright::{Form, FormDefinition};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn schema() -> SchemaNode {
    SchemaNode::object([
        ("name", SchemaNode::string().min_length(1)),
        ("age", SchemaNode::integer().min(0.0).optional()),
        ("newsletter", SchemaNode::boolean()),
        ("role", SchemaNode::enumeration(["dev", "ops"])),
        ("status", SchemaNode::enumeration(["open", "closed"]).nullable()),
        (
            "address",
            SchemaNode::object([
                ("city", SchemaNode::string()),
                ("zip", SchemaNode::string().optional()),
            ]),
        ),
        ("tags", SchemaNode::array(SchemaNode::string()).max_items(4)),
    ])
}

/// Data that satisfies [`schema`], with optional keys sometimes left out and
/// the nullable status sometimes `null`.
fn arb_valid_data() -> impl Strategy<Value = Value> {
    (
        "[A-Za-z]{1,10}",
        prop::option::of(0i64..120),
        any::<bool>(),
        prop::sample::select(vec!["dev", "ops"]),
        prop::option::of(prop::sample::select(vec!["open", "closed"])),
        "[a-z]{1,8}",
        prop::option::of("[0-9]{4}"),
        prop::collection::vec("[a-z]{1,6}", 0..5),
    )
        .prop_map(|(name, age, newsletter, role, status, city, zip, tags)| {
            let mut address = Map::new();
            address.insert("city".into(), json!(city));
            if let Some(zip) = zip {
                address.insert("zip".into(), json!(zip));
            }
            let mut data = Map::new();
            data.insert("name".into(), json!(name));
            if let Some(age) = age {
                data.insert("age".into(), json!(age));
            }
            data.insert("newsletter".into(), json!(newsletter));
            data.insert("role".into(), json!(role));
            data.insert("status".into(), json!(status));
            data.insert("address".into(), Value::Object(address));
            data.insert("tags".into(), json!(tags.into_iter().take(4).collect::<Vec<_>>()));
            Value::Object(data)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Building from valid data and submitting yields the normalized data
    #[test]
    fn submit_of_untouched_form_is_normalized_initial(data in arb_valid_data()) {
        let s = schema();
        let mut form = Form::new(FormDefinition::new(s.clone()), data.clone());
        let submitted = form.submit();
        prop_assert_eq!(submitted, Some(normalize_value(&s, &data)), "issues: {:?}", form.submit_issues());
    }

    // Submitted values list keys in declaration order
    #[test]
    fn submit_preserves_declared_order(data in arb_valid_data()) {
        let s = schema();
        let mut form = Form::new(FormDefinition::new(s.clone()), data);
        let submitted = form.submit().expect("valid data submits");
        let keys: Vec<&String> = submitted.as_object().unwrap().keys().collect();
        let declared: Vec<&String> = s.as_object().unwrap().fields.iter().map(|(n, _)| n).collect();
        let expected: Vec<&String> = declared.into_iter().filter(|k| keys.contains(k)).collect();
        prop_assert_eq!(keys, expected);
    }

    // Every successful mutation bumps the revision by one
    #[test]
    fn revision_counts_mutations(data in arb_valid_data(), names in prop::collection::vec("[a-z]{1,5}", 0..10)) {
        let mut form = Form::new(FormDefinition::new(schema()), data);
        let start = form.revision();
        for (i, name) in names.iter().enumerate() {
            prop_assert!(form.set_value("name", json!(name)));
            prop_assert_eq!(form.revision(), start + i as u64 + 1);
        }
        prop_assert!(!form.set_value("nowhere", json!(1)));
        prop_assert_eq!(form.revision(), start + names.len() as u64);
    }
}
