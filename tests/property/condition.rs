use formwright::Condition;
use formwright::condition::{apply_operator, evaluate_condition};
use formwright::enums::ConditionOperator;
use proptest::prelude::*;
use serde_json::{Value, json};

fn arb_operator() -> impl Strategy<Value = ConditionOperator> {
    prop_oneof![
        Just(ConditionOperator::Equals),
        Just(ConditionOperator::NotEquals),
        Just(ConditionOperator::Contains),
        Just(ConditionOperator::GreaterThan),
        Just(ConditionOperator::LessThan),
        Just(ConditionOperator::Truthy),
        Just(ConditionOperator::Falsy),
    ]
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-100i64..100).prop_map(|n| json!(n)),
        "[a-z0-9]{0,6}".prop_map(Value::String),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Same snapshot, same answer
    #[test]
    fn evaluation_is_deterministic(
        operator in arb_operator(),
        target in arb_scalar(),
        expected in arb_scalar(),
    ) {
        let condition = Condition::new("x", operator, Some(expected));
        let root = json!({"x": target});
        let first = evaluate_condition(&condition, &root, &root);
        let second = evaluate_condition(&condition, &root, &root);
        prop_assert_eq!(first, second);
    }

    // Paired operators are complements
    #[test]
    fn complements(target in arb_scalar(), expected in arb_scalar()) {
        let t = Some(&target);
        let e = Some(&expected);
        prop_assert_ne!(
            apply_operator(ConditionOperator::Equals, t, e),
            apply_operator(ConditionOperator::NotEquals, t, e)
        );
        prop_assert_ne!(
            apply_operator(ConditionOperator::Truthy, t, None),
            apply_operator(ConditionOperator::Falsy, t, None)
        );
    }

    // Ordering comparisons agree with integer ordering
    #[test]
    fn ordering_matches_integers(a in -1000i64..1000, b in -1000i64..1000) {
        let (x, y) = (json!(a), json!(b));
        prop_assert_eq!(apply_operator(ConditionOperator::GreaterThan, Some(&x), Some(&y)), a > b);
        prop_assert_eq!(apply_operator(ConditionOperator::LessThan, Some(&x), Some(&y)), a < b);
    }

    // A missing target is never greater, smaller or containing
    #[test]
    fn missing_target(expected in arb_scalar()) {
        for op in [
            ConditionOperator::Contains,
            ConditionOperator::GreaterThan,
            ConditionOperator::LessThan,
            ConditionOperator::Truthy,
        ] {
            prop_assert!(!apply_operator(op, None, Some(&expected)));
        }
    }
}
