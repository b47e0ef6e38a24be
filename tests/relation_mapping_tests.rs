use rowgraph::{
    AliasResolver, DataType, EntityDescriptor, GraphDeserializer, HydrationError, JoinedRow,
    RelationMapping, SchemaRegistry, Value, deserialize_entities,
};

fn setup_registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with_entity(
            EntityDescriptor::new("Person")
                .primary_key("id", DataType::Integer)
                .column("name", DataType::Text)
                .relation_one("livesInTown", "Town"),
        )
        .unwrap()
        .with_entity(
            EntityDescriptor::new("Town")
                .primary_key("id", DataType::Integer)
                .column("name", DataType::Text)
                .relation_one("country", "Country"),
        )
        .unwrap()
        .with_entity(
            EntityDescriptor::new("Country")
                .primary_key("id", DataType::Integer)
                .column("name", DataType::Text),
        )
        .unwrap()
}

fn person_row(id: i64, name: &str, town: Option<(i64, &str)>) -> JoinedRow {
    let row = JoinedRow::new()
        .with("person_id", id)
        .with("person_name", name);

    match town {
        Some((town_id, town_name)) => row.with("town_id", town_id).with("town_name", town_name),
        None => row
            .with("town_id", Value::Null)
            .with("town_name", Value::Null),
    }
}

#[test]
fn test_mapping_parsed_from_json_drives_hydration() {
    let registry = setup_registry();
    let mapping: RelationMapping = serde_json::from_str(
        r#"{
            "alias": "person",
            "relations": {
                "livesInTown": { "alias": "town", "relations": { "country": "country" } }
            }
        }"#,
    )
    .unwrap();

    let rows = [JoinedRow::new()
        .with("person_id", 1i64)
        .with("person_name", "Eva")
        .with("town_id", 10i64)
        .with("town_name", "Berlin")
        .with("country_id", 100i64)
        .with("country_name", "Germany")];

    let people = deserialize_entities(&registry, "Person", &rows, Some(&mapping)).unwrap();

    let town = people[0].borrow().relation_one("livesInTown").unwrap();
    let country = town.borrow().relation_one("country").unwrap();
    assert_eq!(
        country.borrow().field("name"),
        Some(&Value::Text("Germany".into()))
    );
}

#[test]
fn test_leaf_mapping_ignores_relation_columns() {
    let registry = setup_registry();
    let rows = [person_row(1, "Eva", Some((10, "Berlin")))];

    let people = deserialize_entities(
        &registry,
        "Person",
        &rows,
        Some(&RelationMapping::new("person")),
    )
    .unwrap();

    // Town columns were present in the row but not mapped.
    assert!(people[0].borrow().relation("livesInTown").is_none());
}

#[test]
fn test_unknown_property_aborts_the_whole_call() {
    let registry = setup_registry();
    let mapping = RelationMapping::new("person").relation("worksAt", "company");
    let rows = [person_row(1, "Eva", None)];

    let err = deserialize_entities(&registry, "Person", &rows, Some(&mapping)).unwrap_err();
    match err {
        HydrationError::UnknownRelation { entity, relation } => {
            assert_eq!(entity, "Person");
            assert_eq!(relation, "worksAt");
        }
        other => panic!("Expected UnknownRelation, got {:?}", other),
    }
}

#[test]
fn test_mapping_target_must_be_registered() {
    let registry = SchemaRegistry::new()
        .with_entity(
            EntityDescriptor::new("Person")
                .primary_key("id", DataType::Integer)
                .relation_one("livesInTown", "Town"),
        )
        .unwrap();

    let mapping = RelationMapping::new("person").relation("livesInTown", "town");
    let rows = [JoinedRow::new().with("person_id", 1i64)];

    let err = deserialize_entities(&registry, "Person", &rows, Some(&mapping)).unwrap_err();
    assert!(matches!(err, HydrationError::UnknownEntity(name) if name == "Town"));
}

#[test]
fn test_later_null_row_reverts_a_to_one_relation() {
    let registry = setup_registry();
    let mapping = RelationMapping::new("person").relation("livesInTown", "town");

    let rows = [
        person_row(1, "Eva", Some((10, "Berlin"))),
        person_row(1, "Eva", None),
    ];

    let people = deserialize_entities(&registry, "Person", &rows, Some(&mapping)).unwrap();

    assert_eq!(people.len(), 1);
    // The second row asserted no town, and the last row wins.
    assert!(people[0].borrow().relation_one("livesInTown").is_none());
    assert!(people[0].borrow().relation("livesInTown").is_some());
}

#[test]
fn test_reasserting_the_same_town_is_idempotent() {
    let registry = setup_registry();
    let mapping = RelationMapping::new("person").relation("livesInTown", "town");

    let rows = [
        person_row(1, "Eva", Some((10, "Berlin"))),
        person_row(1, "Eva", Some((10, "Berlin"))),
    ];

    let people = deserialize_entities(&registry, "Person", &rows, Some(&mapping)).unwrap();

    let town = people[0].borrow().relation_one("livesInTown").unwrap();
    assert_eq!(
        town.borrow().field("name"),
        Some(&Value::Text("Berlin".into()))
    );
}

#[test]
fn test_custom_alias_separator() {
    let registry = setup_registry();
    let mapping = RelationMapping::new("person").relation("livesInTown", "town");

    let rows = [JoinedRow::new()
        .with("person.id", 1i64)
        .with("person.name", "Eva")
        .with("town.id", 10i64)
        .with("town.name", "Berlin")];

    let deserializer =
        GraphDeserializer::new(&registry).with_alias_resolver(AliasResolver::new('.'));
    let people = deserializer
        .deserialize_many("Person", &rows, Some(&mapping))
        .unwrap();

    assert_eq!(
        people[0].borrow().field("name"),
        Some(&Value::Text("Eva".into()))
    );
    let town = people[0].borrow().relation_one("livesInTown").unwrap();
    assert_eq!(
        town.borrow().field("name"),
        Some(&Value::Text("Berlin".into()))
    );
}
