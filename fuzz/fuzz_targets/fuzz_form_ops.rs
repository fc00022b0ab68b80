#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use formwright::Form;
use libfuzzer_sys::fuzz_target;
use serde_json::{Value, json};

const DEFINITION: &str = r#"
schema:
  type: object
  fields:
    name: { type: string, checks: [{ min_length: 2 }] }
    age: { type: integer, optional: true, checks: [{ min: 0 }] }
    contact: { type: enum, options: [email, phone] }
    contacts:
      type: array
      min_items: 1
      max_items: 3
      item:
        type: object
        fields:
          kind: { type: enum, options: [home, work] }
          phone: { type: string, optional: true }
steps:
  - { id: one, fields: [name, age] }
  - { id: two, fields: [contact, contacts] }
overrides:
  contacts[].phone:
    condition: { field: kind, operator: equals, value: work }
"#;

const PATHS: &[&str] = &[
    "name",
    "age",
    "contact",
    "contacts",
    "contacts[0]",
    "contacts[0].kind",
    "contacts[1].phone",
    "contacts[7].kind",
    "",
    "bad..path",
];

#[derive(Arbitrary, Debug)]
enum Op {
    Set(u8, Input),
    Touch(u8),
    Add,
    Remove(u8),
    Next,
    Previous,
    Submit,
    Reset,
}

#[derive(Arbitrary, Debug)]
enum Input {
    Null,
    Bool(bool),
    Int(i32),
    Text(String),
}

impl Input {
    fn into_value(self) -> Value {
        match self {
            Input::Null => Value::Null,
            Input::Bool(b) => json!(b),
            Input::Int(n) => json!(n),
            Input::Text(s) => json!(s),
        }
    }
}

fn path(index: u8) -> &'static str {
    PATHS[index as usize % PATHS.len()]
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(ops) = Vec::<Op>::arbitrary(&mut u) else {
        return;
    };
    let Ok(definition) = formwright::parse(DEFINITION) else {
        return;
    };
    let mut form = Form::new(definition, json!({}));

    for op in ops {
        let before = form.revision();
        let changed = match op {
            Op::Set(p, input) => form.set_value(path(p), input.into_value()),
            Op::Touch(p) => form.touch(path(p)),
            Op::Add => form.add_item("contacts"),
            Op::Remove(i) => form.remove_item("contacts", i as usize),
            Op::Next => {
                // A refused advance still touches the blocking leaf.
                form.next_step();
                true
            }
            Op::Previous => form.previous_step(),
            Op::Submit => {
                form.submit();
                true
            }
            Op::Reset => {
                form.reset();
                true
            }
        };
        if !changed {
            assert_eq!(form.revision(), before);
        }

        let count = form.item_count("contacts").unwrap_or(0);
        assert!((1..=3).contains(&count));
        assert!(form.current_step() < form.step_count());
    }
});
