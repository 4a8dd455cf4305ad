use proptest::prelude::*;
use srg_types::{ClassName, Descriptor, TypeRef};

fn class_name() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-zA-Z_$][a-zA-Z0-9_$]{0,6}", 1..4).prop_map(|parts| parts.join("/"))
}

fn field_type() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[BCDFIJSZ]",
        class_name().prop_map(|name| format!("L{name};")),
    ];
    (0usize..3, leaf).prop_map(|(depth, leaf)| format!("{}{leaf}", "[".repeat(depth)))
}

proptest! {
    #[test]
    fn field_descriptors_render_back_exactly(desc in field_type()) {
        let parsed = TypeRef::from_descriptor(&desc).unwrap();
        prop_assert_eq!(parsed.descriptor(), desc);
    }

    #[test]
    fn method_descriptors_render_back_exactly(
        params in proptest::collection::vec(field_type(), 0..5),
        ret in prop_oneof![Just("V".to_string()), field_type()],
    ) {
        let desc = format!("({}){ret}", params.concat());
        let parsed = Descriptor::parse(&desc).unwrap();
        prop_assert_eq!(parsed.params.len(), params.len());
        prop_assert_eq!(parsed.to_string(), desc);
    }

    #[test]
    fn identity_rename_is_a_no_op(desc in field_type()) {
        let parsed = TypeRef::from_descriptor(&desc).unwrap();
        prop_assert_eq!(parsed.map_class(ClassName::clone), parsed);
    }
}
