use crate::{
    model::Instance,
    schema::{FieldSpec, ModelSchema, Primitive, Shape, registry},
    value::Value,
};
use std::sync::Once;

///
/// Shared fixture models for unit tests.
///
/// Registration runs once per process; every test that touches these
/// models calls `register_fixtures()` first.
///

static REGISTER: Once = Once::new();

pub fn register_fixtures() {
    REGISTER.call_once(|| {
        registry::register(person()).expect("fixture Person registers");
        registry::register(order()).expect("fixture Order registers");
        registry::register(tree_node()).expect("fixture TreeNode registers");
    });
}

// Person: scalar coverage plus a union-typed field and a calculated one.
fn person() -> ModelSchema {
    ModelSchema::new(
        "Person",
        vec![
            FieldSpec::new("id", vec![Shape::Leaf(Primitive::Int)]),
            FieldSpec::new("name", vec![Shape::Leaf(Primitive::Text)]).required(),
            FieldSpec::new(
                "code",
                vec![Shape::Leaf(Primitive::Int), Shape::Leaf(Primitive::Text)],
            ),
            FieldSpec::new("joined_at", vec![Shape::Leaf(Primitive::Timestamp)]),
            FieldSpec::new("tags", vec![Shape::list(Shape::Leaf(Primitive::Text))]),
            FieldSpec::new(
                "tallies",
                vec![Shape::map(
                    Shape::Leaf(Primitive::Text),
                    Shape::list(Shape::Leaf(Primitive::Int)),
                )],
            ),
            FieldSpec::new("display", vec![Shape::Leaf(Primitive::Text)]).calculated(display_name),
            FieldSpec::new("status", vec![Shape::Leaf(Primitive::Text)])
                .default_value("active")
                .choices(vec![Value::Text("active".into()), Value::Text("retired".into())]),
        ],
    )
}

// Order: relationship coverage in both cardinalities.
fn order() -> ModelSchema {
    ModelSchema::new(
        "Order",
        vec![
            FieldSpec::new("id", vec![Shape::Leaf(Primitive::Int)]),
            FieldSpec::new("count", vec![Shape::Leaf(Primitive::Int)]).required(),
            FieldSpec::has_one("owner", "Person"),
            FieldSpec::has_many("widgets", "Person"),
        ],
    )
}

// TreeNode: self-referential, for recursion-budget tests.
fn tree_node() -> ModelSchema {
    ModelSchema::new(
        "TreeNode",
        vec![
            FieldSpec::new("id", vec![Shape::Leaf(Primitive::Int)]),
            FieldSpec::has_one("parent", "TreeNode"),
        ],
    )
}

fn display_name(instance: &Instance) -> Value {
    match instance.get("name") {
        Ok(Value::Text(name)) => Value::Text(format!("<{name}>")),
        _ => Value::Null,
    }
}

/// A saved person with an id, for relationship tests.
pub fn person_with_id(id: i64, name: &str) -> Instance {
    Instance::construct(
        "Person",
        vec![
            ("id".to_string(), Value::Int(id)),
            ("name".to_string(), Value::Text(name.to_string())),
        ],
    )
    .expect("fixture person constructs")
}
