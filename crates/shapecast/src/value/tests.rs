use crate::value::{Timestamp, Value};
use rust_decimal::Decimal;

// ---- helpers -----------------------------------------------------------

fn v_txt(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn from_impls_cover_the_scalar_kinds() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(7u16), Value::Int(7));
    assert_eq!(Value::from(-7i64), Value::Int(-7));
    assert_eq!(Value::from(2.5f32), Value::Float(2.5));
    assert_eq!(Value::from("hi"), v_txt("hi"));
    assert_eq!(Value::from(()), Value::Null);
    assert_eq!(
        Value::from(Decimal::new(125, 2)),
        Value::Decimal(Decimal::new(125, 2))
    );
    assert_eq!(
        Value::from(Timestamp::from_secs(5)),
        Value::Timestamp(Timestamp::from_secs(5))
    );
    assert_eq!(Value::from(vec![1u8, 2, 3]), Value::Bytes(vec![1, 2, 3]));
}

#[test]
fn list_equality_is_ordered() {
    let a = Value::from_slice(&[1i64, 2, 3]);
    let b = Value::from_slice(&[3i64, 2, 1]);

    assert_ne!(a, b);
    assert_eq!(a, Value::from_slice(&[1i64, 2, 3]));
}

#[test]
fn set_equality_is_by_membership() {
    let a = Value::from_set(vec![1i64, 2, 3]);
    let b = Value::from_set(vec![3i64, 1, 2]);

    assert_eq!(a, b);
    assert_ne!(a, Value::from_set(vec![1i64, 2]));
    assert_ne!(a, Value::from_set(vec![1i64, 2, 4]));
}

#[test]
fn map_equality_ignores_entry_order() {
    let a = Value::from_map(vec![("x", 1i64), ("y", 2)]);
    let b = Value::from_map(vec![("y", 2i64), ("x", 1)]);

    assert_eq!(a, b);
    assert_ne!(a, Value::from_map(vec![("x", 1i64), ("y", 3)]));
}

#[test]
fn cross_kind_comparison_is_never_equal() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_ne!(Value::Text("1".into()), Value::Int(1));
    assert_ne!(Value::Null, Value::Bool(false));
    assert_ne!(Value::List(vec![]), Value::Set(vec![]));
}

#[test]
fn identifier_helpers_cover_scalars_and_lists() {
    assert!(Value::Int(7).is_identifier_scalar());
    assert!(v_txt("abc").is_identifier_scalar());
    assert!(!Value::Bool(true).is_identifier_scalar());

    assert!(Value::from_slice(&[1i64, 2]).is_identifier_list());
    assert!(Value::List(vec![]).is_identifier_list());
    assert!(!Value::List(vec![Value::Bool(true)]).is_identifier_list());
    assert!(!Value::Int(7).is_identifier_list());
}

#[test]
fn is_empty_reports_on_collection_kinds_only() {
    assert_eq!(Value::List(vec![]).is_empty(), Some(true));
    assert_eq!(Value::from_slice(&[1i64]).is_empty(), Some(false));
    assert_eq!(v_txt("").is_empty(), Some(true));
    assert_eq!(Value::Null.is_empty(), Some(true));
    assert_eq!(Value::Int(0).is_empty(), None);
}

#[test]
fn container_kind_distinguishes_the_container_family() {
    assert!(Value::Int(1).container_kind().is_none());
    assert!(Value::List(vec![]).container_kind().is_some());
    assert!(Value::Map(vec![]).container_kind().is_some());
    assert_ne!(
        Value::List(vec![]).container_kind(),
        Value::Tuple(vec![]).container_kind()
    );
}
