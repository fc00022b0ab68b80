#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use formwright::Condition;
use formwright::condition::evaluate_condition;
use formwright::enums::ConditionOperator;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

fn arbitrary_operator(u: &mut Unstructured<'_>) -> arbitrary::Result<ConditionOperator> {
    Ok(*u.choose(&[
        ConditionOperator::Equals,
        ConditionOperator::NotEquals,
        ConditionOperator::Contains,
        ConditionOperator::GreaterThan,
        ConditionOperator::LessThan,
        ConditionOperator::Truthy,
        ConditionOperator::Falsy,
    ])?)
}

/// Generate a small arbitrary JSON value from fuzzer bytes.
fn arbitrary_value(u: &mut Unstructured<'_>, depth: u8) -> arbitrary::Result<Value> {
    let upper = if depth == 0 { 3 } else { 5 };
    match u.int_in_range(0..=upper)? {
        0 => Ok(Value::Null),
        1 => Ok(Value::Bool(bool::arbitrary(u)?)),
        2 => {
            let n = f64::arbitrary(u)?;
            Ok(serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }
        3 => Ok(Value::String(String::arbitrary(u)?)),
        4 => {
            let len = u.int_in_range(0..=4)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(arbitrary_value(u, depth - 1)?);
            }
            Ok(Value::Array(items))
        }
        _ => {
            let len = u.int_in_range(0..=4)?;
            let mut map = Map::new();
            for _ in 0..len {
                map.insert(String::arbitrary(u)?, arbitrary_value(u, depth - 1)?);
            }
            Ok(Value::Object(map))
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let Ok(field) = String::arbitrary(&mut u) else {
        return;
    };
    let Ok(operator) = arbitrary_operator(&mut u) else {
        return;
    };
    let expected = match bool::arbitrary(&mut u) {
        Ok(true) => match arbitrary_value(&mut u, 2) {
            Ok(v) => Some(v),
            Err(_) => return,
        },
        Ok(false) => None,
        Err(_) => return,
    };
    let Ok(scope) = arbitrary_value(&mut u, 3) else {
        return;
    };
    let Ok(root) = arbitrary_value(&mut u, 3) else {
        return;
    };

    let condition = Condition::new(field, operator, expected);
    let first = evaluate_condition(&condition, &scope, &root);
    assert_eq!(first, evaluate_condition(&condition, &scope, &root));
});
