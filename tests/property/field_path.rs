use formwright::primitives::{FieldPath, PathSegment};
use proptest::prelude::*;

/// Strategy for well-formed paths: a leading field followed by any mix of
/// field and index segments.
fn arb_path() -> impl Strategy<Value = FieldPath> {
    let segment = prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_]{0,6}".prop_map(PathSegment::Field),
        (0usize..50).prop_map(PathSegment::Index),
    ];
    ("[a-z][a-z0-9]{0,6}", prop::collection::vec(segment, 0..5)).prop_map(|(head, rest)| {
        let mut path = FieldPath::root().field(&head);
        for seg in rest {
            path = match seg {
                PathSegment::Field(name) => path.field(&name),
                PathSegment::Index(i) => path.index(i),
            };
        }
        path
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Display then parse yields the same path
    #[test]
    fn display_parse_roundtrip(path in arb_path()) {
        let text = path.to_string();
        let parsed = FieldPath::parse(&text);
        prop_assert_eq!(parsed.as_ref(), Some(&path), "roundtrip failed for {:?}", text);
    }

    // The template never contains a digit inside brackets
    #[test]
    fn template_erases_indices(path in arb_path()) {
        let template = path.template();
        prop_assert!(!template.contains("[0") && !template.contains("[1"));
        let reparsed_indices = path
            .segments()
            .iter()
            .filter(|s| matches!(s, PathSegment::Index(_)))
            .count();
        prop_assert_eq!(template.matches("[]").count(), reparsed_indices);
    }

    // Every ancestor is a prefix
    #[test]
    fn ancestors_are_prefixes(path in arb_path()) {
        let mut current = path.clone();
        while let Some(parent) = current.parent() {
            prop_assert!(path.starts_with(&parent));
            current = parent;
        }
        prop_assert!(current.is_root());
    }

    // Parsing arbitrary text never panics
    #[test]
    fn parse_never_panics(input in "[a-z0-9\\.\\[\\]]{0,20}") {
        if let Some(path) = FieldPath::parse(&input) {
            prop_assert_eq!(FieldPath::parse(&path.to_string()), Some(path));
        }
    }
}
