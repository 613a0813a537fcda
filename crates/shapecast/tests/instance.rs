//! End-to-end lifecycle tests over the shared fixture models.

use shapecast::{
    foreign::{ForeignCollection, ForeignModel, ForeignValue},
    model::Instance,
    schema::registry,
    service::{Backend, BackendResponse, Params, Service, ServiceError},
    value::{Timestamp, Value},
};
use shapecast_testing_fixtures::{guild_with_id, item_with_id, register_all};

fn player(values: Vec<(&str, Value)>) -> Instance {
    register_all();
    Instance::construct(
        "Player",
        values
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
    .unwrap()
}

#[test]
fn full_lifecycle_round_trips_through_json() {
    let mut original = player(vec![
        ("id", Value::Int(1)),
        ("name", Value::Text("Brynn".into())),
        ("handle", Value::Int(99)),
        ("joined_at", Value::Timestamp(Timestamp::from_secs(1_700_000_000))),
        ("avatar", Value::Bytes(vec![1, 2, 3])),
    ]);
    original.validate(false).unwrap();

    let text = original.to_json().unwrap();
    let mut restored = Instance::from_json("Player", &text).unwrap();
    restored.validate(false).unwrap();

    assert_eq!(restored, original);
}

#[test]
fn defaults_and_calculated_fields_cooperate() {
    let instance = player(vec![("name", Value::Text("Brynn".into()))]);

    assert_eq!(instance.get("rank").unwrap(), Value::Text("novice".into()));
    assert_eq!(
        instance.get("label").unwrap(),
        Value::Text("Brynn the novice".into())
    );
}

#[test]
fn nested_relationship_serializes_canonically_and_raw() {
    let mut instance = player(vec![
        ("id", Value::Int(1)),
        ("name", Value::Text("Brynn".into())),
    ]);
    instance
        .set("guild", Value::Model(Box::new(guild_with_id(5, "North"))))
        .unwrap();
    instance
        .set(
            "items",
            Value::List(vec![
                Value::Model(Box::new(item_with_id(10, "lantern"))),
                Value::Model(Box::new(item_with_id(11, "rope"))),
            ]),
        )
        .unwrap();

    // canonical: nested objects in full
    let canonical = instance.to_json_value(shapecast::engine::JsonMode::Canonical).unwrap();
    assert_eq!(canonical["guild"]["name"], serde_json::json!("North"));

    // raw: flat identifier map keyed by alias
    let raw = instance.to_raw().unwrap();
    assert_eq!(raw.get("guild_id"), Some(&serde_json::json!(5)));
    assert_eq!(raw.get("item_ids"), Some(&serde_json::json!([10, 11])));
}

#[test]
fn identifier_only_payload_round_trips() {
    register_all();

    let instance = Instance::from_json(
        "Player",
        r#"{"name": "Brynn", "guild_id": 5, "item_ids": [10, 11]}"#,
    )
    .unwrap();

    assert_eq!(instance.get("guild_id").unwrap(), Value::Int(5));
    let raw = instance.to_raw().unwrap();
    assert_eq!(raw.get("guild_id"), Some(&serde_json::json!(5)));
    assert_eq!(raw.get("item_ids"), Some(&serde_json::json!([10, 11])));
}

#[test]
fn self_referential_guild_synthesizes_within_budget() {
    register_all();

    let mut guild = Instance::synthesize("Guild", 1).unwrap();
    guild.validate(false).unwrap();

    let Value::Model(parent) = guild.get("parent").unwrap() else {
        panic!("expected nested guild at budget 1");
    };
    assert_eq!(parent.get("parent").unwrap(), Value::Null);
}

#[test]
fn unresolvable_optional_reference_is_dropped_with_a_record() {
    register_all();

    // first use triggers reference resolution
    let instance = Instance::construct(
        "Ledger",
        vec![("balance".to_string(), Value::Decimal(1.into()))],
    )
    .unwrap();
    assert!(instance.schema().field("auditor").is_none());

    let dropped = registry::registry_read()
        .dropped_fields()
        .iter()
        .any(|d| d.model == "Ledger" && d.field == "auditor");
    assert!(dropped);
}

// ---- foreign bridge ----------------------------------------------------

struct ForeignGuild {
    id: i64,
    name: &'static str,
}

impl ForeignModel for ForeignGuild {
    fn foreign_attr(&self, name: &str) -> Option<ForeignValue<'_>> {
        match name {
            "id" => Some(ForeignValue::Scalar(Value::Int(self.id))),
            "name" => Some(ForeignValue::Scalar(Value::Text(self.name.into()))),
            _ => None,
        }
    }
}

struct LazyItems {
    items: Vec<ForeignItem>,
}

struct ForeignItem {
    id: i64,
    name: &'static str,
}

impl ForeignModel for ForeignItem {
    fn foreign_attr(&self, name: &str) -> Option<ForeignValue<'_>> {
        match name {
            "id" => Some(ForeignValue::Scalar(Value::Int(self.id))),
            "name" => Some(ForeignValue::Scalar(Value::Text(self.name.into()))),
            _ => None,
        }
    }
}

impl ForeignCollection for LazyItems {
    fn all(&self) -> Vec<&dyn ForeignModel> {
        self.items.iter().map(|i| i as &dyn ForeignModel).collect()
    }
}

struct ForeignPlayer {
    guild: ForeignGuild,
    items: LazyItems,
}

impl ForeignModel for ForeignPlayer {
    fn foreign_attr(&self, name: &str) -> Option<ForeignValue<'_>> {
        match name {
            "id" => Some(ForeignValue::Scalar(Value::Int(1))),
            "name" => Some(ForeignValue::Scalar(Value::Text("Brynn".into()))),
            "guild" => Some(ForeignValue::One(&self.guild)),
            // lazy collection: materialized through `all` before recursing
            "items" => Some(ForeignValue::Deferred(&self.items)),
            _ => None,
        }
    }
}

#[test]
fn foreign_objects_translate_with_lazy_collections() {
    register_all();

    let foreign = ForeignPlayer {
        guild: ForeignGuild { id: 5, name: "North" },
        items: LazyItems {
            items: vec![
                ForeignItem { id: 10, name: "lantern" },
                ForeignItem { id: 11, name: "rope" },
            ],
        },
    };

    let mut instance = Instance::from_foreign("Player", &foreign).unwrap();
    instance.validate(false).unwrap();

    let Value::Model(guild) = instance.get("guild").unwrap() else {
        panic!("expected nested guild");
    };
    assert_eq!(guild.get("name").unwrap(), Value::Text("North".into()));

    let Value::List(items) = instance.get("items").unwrap() else {
        panic!("expected item list");
    };
    assert_eq!(items.len(), 2);
}

// ---- service layer -----------------------------------------------------

#[derive(Default)]
struct MemoryBackend {
    rows: Vec<serde_json::Value>,
}

impl Backend for MemoryBackend {
    fn find(&mut self, _model: &str, params: &Params) -> Result<BackendResponse, ServiceError> {
        let matches: Vec<serde_json::Value> = self
            .rows
            .iter()
            .filter(|row| {
                params.iter().all(|(name, value)| {
                    let Value::Int(expected) = value else {
                        return false;
                    };
                    row.get(name).and_then(serde_json::Value::as_i64) == Some(*expected)
                })
            })
            .cloned()
            .collect();

        Ok(BackendResponse::Parsed(serde_json::Value::Array(matches)))
    }

    fn create(&mut self, _model: &str, params: &Params) -> Result<BackendResponse, ServiceError> {
        let mut row = serde_json::Map::new();
        for (name, value) in params {
            let rendered = match value {
                Value::Int(i) => serde_json::json!(i),
                Value::Text(s) => serde_json::json!(s),
                _ => return Err(ServiceError::Backend("unsupported param".into())),
            };
            row.insert(name.clone(), rendered);
        }
        let row = serde_json::Value::Object(row);
        self.rows.push(row.clone());

        Ok(BackendResponse::Parsed(row))
    }
}

#[test]
fn service_composes_get_or_create_from_find_and_create() {
    register_all();
    let mut service = Service::new(MemoryBackend::default());

    // miss: created
    let created = service
        .get_or_create(
            "Item",
            vec![
                ("id".to_string(), Value::Int(10)),
                ("name".to_string(), Value::Text("lantern".into())),
            ],
        )
        .unwrap();
    assert_eq!(created.len(), 1);

    // hit: found, not duplicated
    let found = service
        .get_or_create("Item", vec![("id".to_string(), Value::Int(10))])
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("name").unwrap(), Value::Text("lantern".into()));
}

#[test]
fn service_rejects_undeclared_params_and_missing_methods() {
    register_all();
    let mut service = Service::new(MemoryBackend::default());

    // undeclared parameter name
    let err = service
        .find("Item", vec![("bogus".to_string(), Value::Int(1))])
        .unwrap_err();
    assert!(err.to_string().contains("bogus"));

    // MemoryBackend implements no update method
    let err = service
        .update("Item", vec![("id".to_string(), Value::Int(10))])
        .unwrap_err();
    assert!(err.to_string().contains("update"));
}
