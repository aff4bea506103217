use plugboard::digest::{Digest, EMPTY_STREAM_DIGEST};
use plugboard::error::PlugboardError;
use plugboard::field::{FieldMap, FieldSpec};
use plugboard::value::AnyValue;

fn positive(value: &AnyValue) -> bool {
    value.cast::<i64>().map(|i| i > 0).unwrap_or(false)
}

#[test]
fn change_before_set_type_is_rejected() {
    let mut field = FieldSpec::new();
    match field.change(AnyValue::new(1i64)) {
        Err(PlugboardError::NoType(_)) => {}
        other => panic!("expected NoType, got {other:?}"),
    }
}

#[test]
fn change_enforces_the_declared_type() {
    let mut field = FieldSpec::new();
    field.set_type::<i64>();
    match field.change(AnyValue::new("nope".to_string())) {
        Err(PlugboardError::WrongType { expected, found }) => {
            assert_eq!(expected, "i64");
            assert_eq!(found, "String");
        }
        other => panic!("expected WrongType, got {other:?}"),
    }
    field.change(AnyValue::new(1i64)).expect("matching type binds");
    assert_eq!(*field.value::<i64>().expect("typed read"), 1);
}

#[test]
fn predicates_guard_assignment_with_a_strong_guarantee() {
    let mut field = FieldSpec::new();
    field.set_type::<i64>();
    field
        .add_check(positive, "Value > 0")
        .expect("check on empty field");
    match field.change(AnyValue::new(-1i64)) {
        Err(PlugboardError::Invalid(_)) => {}
        other => panic!("expected Invalid, got {other:?}"),
    }
    field.change(AnyValue::new(5i64)).expect("positive binds");
    // a later failing change leaves the stored value untouched
    assert!(field.change(AnyValue::new(-2i64)).is_err());
    assert_eq!(*field.value::<i64>().expect("still bound"), 5);
}

#[test]
fn a_new_check_must_accept_the_stored_value() {
    let mut field = FieldSpec::new();
    field.set_type::<i64>();
    field.change(AnyValue::new(3i64)).expect("bind 3");
    match field.add_check(|v| v.cast::<i64>().map(|i| i > 10).unwrap_or(false), "Value > 10") {
        Err(PlugboardError::Invalid(_)) => {}
        other => panic!("expected Invalid, got {other:?}"),
    }
    // the rejected predicate was not recorded
    assert_eq!(field.check_descriptions(), vec!["Type == i64".to_string()]);
}

#[test]
fn optional_relaxes_readiness_only() {
    let mut field = FieldSpec::new();
    field.set_type::<i64>();
    assert!(!field.ready(), "required field without value is not ready");
    field.make_optional();
    assert!(field.ready(), "optional field is always ready");
    // probing never raises, even with the wrong type
    assert!(!field.is_valid(&AnyValue::new("text".to_string())));
    assert!(field.is_valid(&AnyValue::new(1i64)));
    // an optional field still type-checks actual assignment
    assert!(field.change(AnyValue::new(1.0f64)).is_err());
}

#[test]
fn check_descriptions_list_the_type_check_first() {
    let mut field = FieldSpec::new();
    field.set_type::<i64>();
    field.add_check(positive, "Value > 0").expect("first check");
    field
        .add_check(|v| v.cast::<i64>().map(|i| i % 2 == 1).unwrap_or(false), "Value is odd")
        .expect("second check");
    assert_eq!(
        field.check_descriptions(),
        vec![
            "Type == i64".to_string(),
            "Value > 0".to_string(),
            "Value is odd".to_string()
        ]
    );
}

#[test]
fn transparent_fields_digest_to_the_zero_sentinel() {
    let mut opaque = FieldSpec::new();
    opaque.set_type::<i64>();
    // before a value is bound, the field digests the empty stream
    assert_eq!(opaque.digest().to_hex(), EMPTY_STREAM_DIGEST);
    opaque.change(AnyValue::new(3i64)).expect("bind 3");

    let mut transparent = opaque.clone();
    transparent.make_transparent();

    assert_eq!(opaque.digest(), AnyValue::new(3i64).digest());
    assert_eq!(transparent.digest(), Digest::ZERO);
    assert_eq!(transparent.digest().to_hex(), "0".repeat(32));
}

#[test]
fn map_lookups_ignore_ascii_case_and_keep_insertion_order() {
    let mut map = FieldMap::new();
    map.entry("Dimension 1").set_type::<f64>();
    map.entry("dimension 2").set_type::<f64>();
    assert_eq!(map.len(), 2);
    assert!(map.at("DIMENSION 1").is_ok());
    assert!(map.contains("Dimension 2"));
    // re-inserting under a different case updates in place
    map.entry("DIMENSION 1").make_optional();
    let keys: Vec<&str> = map.keys().collect();
    assert_eq!(keys, vec!["Dimension 1", "dimension 2"]);
    match map.at("Dimension 3") {
        Err(PlugboardError::NotFound(key)) => assert_eq!(key, "Dimension 3"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn map_equality_compares_keys_and_specs_in_order() {
    let mut a = FieldMap::new();
    a.entry("One").set_type::<i64>();
    let mut b = FieldMap::new();
    b.entry("ONE").set_type::<i64>();
    assert_eq!(a, b, "keys compare case-insensitively");
    b.entry("Two").set_type::<i64>();
    assert_ne!(a, b);
}
