use formwright::schema::SchemaNode;
use formwright::{Form, FormDefinition};
use proptest::prelude::*;
use serde_json::{Value, json};

fn form_with(min: usize, max: usize, initial: usize) -> Form {
    let schema = SchemaNode::object([(
        "list",
        SchemaNode::array(SchemaNode::string())
            .min_items(min)
            .max_items(max),
    )]);
    let items: Vec<Value> = (0..initial).map(|i| json!(format!("item{}", i))).collect();
    Form::new(FormDefinition::new(schema), json!({ "list": items }))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Initial item count is clamped into [min, max]
    #[test]
    fn initial_count_is_clamped(min in 0usize..4, extra in 0usize..4, initial in 0usize..10) {
        let max = min + extra;
        let form = form_with(min, max, initial);
        prop_assert_eq!(form.item_count("list"), Some(initial.clamp(min, max)));
    }

    // Any sequence of adds and removes keeps the count within bounds
    #[test]
    fn operations_respect_bounds(
        min in 0usize..4,
        extra in 0usize..4,
        initial in 0usize..10,
        ops in prop::collection::vec((any::<bool>(), 0usize..8), 0..30),
    ) {
        let max = min + extra;
        let mut form = form_with(min, max, initial);
        for (add, index) in ops {
            let before = form.item_count("list").unwrap_or(0);
            let accepted = if add {
                form.add_item("list")
            } else {
                form.remove_item("list", index)
            };
            let after = form.item_count("list").unwrap_or(0);
            prop_assert!(after >= min && after <= max, "count {} outside [{}, {}]", after, min, max);
            if add {
                prop_assert_eq!(accepted, before < max);
            } else {
                prop_assert_eq!(accepted, before > min && index < before);
            }
            prop_assert_eq!(form.can_add_item("list"), after < max);
            prop_assert_eq!(form.can_remove_item("list"), after > min);
        }
    }
}
