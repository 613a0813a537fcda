//! Serialization round-trip properties: `deserialize ∘ serialize` is
//! identity for every primitive and container shape, modulo timestamp
//! seconds precision and set membership ordering.

use proptest::prelude::*;
use shapecast::{
    engine::{
        JsonMode,
        json::{value_from_json, value_to_json},
    },
    schema::{Primitive, Shape, registry::Registry},
    value::{Timestamp, Value},
};

fn assert_round_trip(shape: &Shape, value: &Value) {
    let registry = Registry::new();
    let json = value_to_json("field", value, JsonMode::Canonical).expect("serializes");

    // route through text to exercise the full serialized form
    let text = serde_json::to_string(&json).expect("renders");
    let parsed: serde_json::Value = serde_json::from_str(&text).expect("parses");

    let back = value_from_json("field", std::slice::from_ref(shape), &parsed, &registry)
        .expect("deserializes");
    assert_eq!(&back, value);
}

proptest! {
    #[test]
    fn int_round_trips(i in any::<i64>()) {
        assert_round_trip(&Shape::Leaf(Primitive::Int), &Value::Int(i));
    }

    #[test]
    fn float_round_trips(f in -1.0e15f64..1.0e15) {
        assert_round_trip(&Shape::Leaf(Primitive::Float), &Value::Float(f));
    }

    #[test]
    fn bool_round_trips(b in any::<bool>()) {
        assert_round_trip(&Shape::Leaf(Primitive::Bool), &Value::Bool(b));
    }

    #[test]
    fn text_round_trips(s in ".*") {
        assert_round_trip(&Shape::Leaf(Primitive::Text), &Value::Text(s));
    }

    #[test]
    fn bytes_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        assert_round_trip(&Shape::Leaf(Primitive::Bytes), &Value::Bytes(bytes));
    }

    #[test]
    fn timestamp_round_trips_at_seconds_precision(secs in 0i64..4_102_444_800) {
        assert_round_trip(
            &Shape::Leaf(Primitive::Timestamp),
            &Value::Timestamp(Timestamp::from_secs(secs)),
        );
    }

    #[test]
    fn integer_decimals_round_trip(mantissa in -1_000_000i64..1_000_000) {
        assert_round_trip(
            &Shape::Leaf(Primitive::Decimal),
            &Value::Decimal(mantissa.into()),
        );
    }

    #[test]
    fn int_lists_round_trip(items in proptest::collection::vec(any::<i64>(), 0..8)) {
        let value = Value::List(items.into_iter().map(Value::Int).collect());
        assert_round_trip(&Shape::list(Shape::Leaf(Primitive::Int)), &value);
    }

    #[test]
    fn text_sets_round_trip_by_membership(items in proptest::collection::vec(".{0,8}", 0..6)) {
        let value = Value::Set(items.into_iter().map(Value::Text).collect());
        assert_round_trip(&Shape::set(Shape::Leaf(Primitive::Text)), &value);
    }

    #[test]
    fn float_tuples_round_trip(items in proptest::collection::vec(-1.0e9f64..1.0e9, 0..6)) {
        let value = Value::Tuple(items.into_iter().map(Value::Float).collect());
        assert_round_trip(&Shape::tuple(Shape::Leaf(Primitive::Float)), &value);
    }

    #[test]
    fn nested_maps_round_trip(
        entries in proptest::collection::btree_map(
            "[a-z]{1,6}",
            proptest::collection::vec(any::<i64>(), 0..4),
            0..5,
        )
    ) {
        let value = Value::Map(
            entries
                .into_iter()
                .map(|(k, items)| {
                    (
                        Value::Text(k),
                        Value::List(items.into_iter().map(Value::Int).collect()),
                    )
                })
                .collect(),
        );
        assert_round_trip(
            &Shape::map(
                Shape::Leaf(Primitive::Text),
                Shape::list(Shape::Leaf(Primitive::Int)),
            ),
            &value,
        );
    }
}
