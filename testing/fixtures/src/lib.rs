//! Shared model schemas used by shapecast's integration tests.
//!
//! The fixture world is a small game domain: players join guilds, hold
//! items, and guilds nest under parent guilds (the self-referential
//! case). Registration is idempotent per process.

use shapecast::{
    prelude::*,
    schema::registry,
    value::Value,
};
use std::sync::Once;

static REGISTER: Once = Once::new();

/// Register every fixture model. Safe to call from any test.
pub fn register_all() {
    REGISTER.call_once(|| {
        registry::register(player()).expect("fixture Player registers");
        registry::register(guild()).expect("fixture Guild registers");
        registry::register(item()).expect("fixture Item registers");
        registry::register(ledger()).expect("fixture Ledger registers");
    });
}

fn player() -> ModelSchema {
    ModelSchema::new(
        "Player",
        vec![
            FieldSpec::new("id", vec![Shape::Leaf(Primitive::Int)]),
            FieldSpec::new("name", vec![Shape::Leaf(Primitive::Text)]).required(),
            // a player handle may be numeric or textual
            FieldSpec::new(
                "handle",
                vec![Shape::Leaf(Primitive::Int), Shape::Leaf(Primitive::Text)],
            ),
            FieldSpec::new("joined_at", vec![Shape::Leaf(Primitive::Timestamp)]),
            FieldSpec::new("avatar", vec![Shape::Leaf(Primitive::Bytes)]),
            FieldSpec::new(
                "rank",
                vec![Shape::Leaf(Primitive::Text)],
            )
            .default_value("novice")
            .choices(vec![
                Value::Text("novice".into()),
                Value::Text("veteran".into()),
                Value::Text("elder".into()),
            ]),
            FieldSpec::new("label", vec![Shape::Leaf(Primitive::Text)]).calculated(player_label),
            FieldSpec::has_one("guild", "Guild"),
            FieldSpec::has_many("items", "Item"),
        ],
    )
}

fn guild() -> ModelSchema {
    ModelSchema::new(
        "Guild",
        vec![
            FieldSpec::new("id", vec![Shape::Leaf(Primitive::Int)]),
            FieldSpec::new("name", vec![Shape::Leaf(Primitive::Text)]).required(),
            // per-season score table
            FieldSpec::new(
                "scores",
                vec![Shape::map(
                    Shape::Leaf(Primitive::Text),
                    Shape::list(Shape::Leaf(Primitive::Int)),
                )],
            ),
            FieldSpec::new("motto_words", vec![Shape::set(Shape::Leaf(Primitive::Text))]),
            FieldSpec::has_one("parent", "Guild"),
        ],
    )
}

fn item() -> ModelSchema {
    ModelSchema::new(
        "Item",
        vec![
            FieldSpec::new("id", vec![Shape::Leaf(Primitive::Int)]),
            FieldSpec::new("name", vec![Shape::Leaf(Primitive::Text)]).required(),
            FieldSpec::new("weight", vec![Shape::Leaf(Primitive::Decimal)]),
            FieldSpec::new(
                "dimensions",
                vec![Shape::tuple(Shape::Leaf(Primitive::Float))],
            ),
        ],
    )
}

// Ledger declares an optional reference to a model that is never
// registered; reference resolution drops the field with a warning.
fn ledger() -> ModelSchema {
    ModelSchema::new(
        "Ledger",
        vec![
            FieldSpec::new("id", vec![Shape::Leaf(Primitive::Int)]),
            FieldSpec::new("balance", vec![Shape::Leaf(Primitive::Decimal)]).required(),
            FieldSpec::has_one("auditor", "ExternalAuditor"),
        ],
    )
}

fn player_label(instance: &Instance) -> Value {
    let name = instance.get("name").ok();
    let rank = instance.get("rank").ok();

    match (name, rank) {
        (Some(Value::Text(name)), Some(Value::Text(rank))) => {
            Value::Text(format!("{name} the {rank}"))
        }
        (Some(Value::Text(name)), _) => Value::Text(name),
        _ => Value::Null,
    }
}

/// A saved guild with an id, for relationship scenarios.
pub fn guild_with_id(id: i64, name: &str) -> Instance {
    Instance::construct(
        "Guild",
        vec![
            ("id".to_string(), Value::Int(id)),
            ("name".to_string(), Value::Text(name.to_string())),
        ],
    )
    .expect("fixture guild constructs")
}

/// A saved item with an id, for has-many scenarios.
pub fn item_with_id(id: i64, name: &str) -> Instance {
    Instance::construct(
        "Item",
        vec![
            ("id".to_string(), Value::Int(id)),
            ("name".to_string(), Value::Text(name.to_string())),
        ],
    )
    .expect("fixture item constructs")
}
