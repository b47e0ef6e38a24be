use rowgraph::{
    DataType, EntityDescriptor, GraphDeserializer, JoinedRow, RelationMapping, SchemaRegistry,
    Value,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("🚀 rowgraph - joined rows into an entity graph");
    println!("{}", "=".repeat(70));

    // Entity metadata: what a driver-agnostic schema layer would provide
    println!("\n📝 Registering entity descriptors...");
    let registry = SchemaRegistry::new()
        .with_entity(
            EntityDescriptor::new("Person")
                .primary_key("id", DataType::Integer)
                .column("name", DataType::Text)
                .computed_column("foodCount", DataType::Integer)
                .relation_one("livesInTown", "Town")
                .relation_many("favoriteFood", "Food")
                .after_load(|instance| {
                    let count = instance
                        .relation_many("favoriteFood")
                        .map_or(0, |foods| foods.len());
                    instance.set_field("foodCount", count as i64);
                }),
        )?
        .with_entity(
            EntityDescriptor::new("Town")
                .primary_key("id", DataType::Integer)
                .column("name", DataType::Text)
                .relation_one("country", "Country"),
        )?
        .with_entity(
            EntityDescriptor::new("Country")
                .primary_key("id", DataType::Integer)
                .column("name", DataType::Text),
        )?
        .with_entity(
            EntityDescriptor::new("Food")
                .primary_key("id", DataType::Integer)
                .column("name", DataType::Text),
        )?;
    println!("✅ {} entities registered", registry.len());

    // Flat rows as a joined SELECT would return them; the food relation
    // fans Eva out into three rows
    println!("\n📥 Building the joined result set...");
    let rows = vec![
        row(1, "Eva", 10, "Berlin", 100, "Germany", Some((200, "Pizza"))),
        row(1, "Eva", 10, "Berlin", 100, "Germany", Some((201, "Sushi"))),
        row(1, "Eva", 10, "Berlin", 100, "Germany", Some((202, "Currywurst"))),
        row(2, "Peter", 10, "Berlin", 100, "Germany", Some((200, "Pizza"))),
        row(3, "Clara", 11, "Tokyo", 101, "Japan", None),
    ];
    println!("✅ {} rows", rows.len());

    // The mapping tree as it would arrive from configuration
    let mapping: RelationMapping = serde_json::from_value(serde_json::json!({
        "alias": "person",
        "relations": {
            "livesInTown": { "alias": "town", "relations": { "country": "country" } },
            "favoriteFood": "food"
        }
    }))?;

    println!("\n{}", "=".repeat(70));
    println!("📊 Reconstructing the graph");
    println!("{}", "=".repeat(70));

    let deserializer = GraphDeserializer::new(&registry);
    let people = deserializer.deserialize_many("Person", &rows, Some(&mapping))?;

    println!(
        "{} rows collapsed into {} distinct people\n",
        rows.len(),
        people.len()
    );

    for person in &people {
        let person = person.borrow();
        let town = person.relation_one("livesInTown");
        let town_label = town
            .as_ref()
            .map(|t| {
                let t = t.borrow();
                let country = t
                    .relation_one("country")
                    .map(|c| text(c.borrow().field("name")))
                    .unwrap_or_default();
                format!("{} ({})", text(t.field("name")), country)
            })
            .unwrap_or_else(|| "nowhere".to_string());

        let foods: Vec<String> = person
            .relation_many("favoriteFood")
            .map(|foods| {
                foods
                    .iter()
                    .map(|f| text(f.borrow().field("name")))
                    .collect()
            })
            .unwrap_or_default();

        println!(
            "👤 {:<8} lives in {:<16} favorite food [{}] (count: {})",
            text(person.field("name")),
            town_label,
            foods.join(", "),
            text(person.field("foodCount")),
        );
    }

    // Shared identity: Eva and Peter point at one Berlin instance
    println!("\n{}", "=".repeat(70));
    println!("📈 Identity checks");
    println!("{}", "=".repeat(70));
    let eva_town = people[0].borrow().relation_one("livesInTown").unwrap();
    let peter_town = people[1].borrow().relation_one("livesInTown").unwrap();
    println!(
        "Eva's town is Peter's town: {}",
        eva_town.ptr_eq(&peter_town)
    );

    let eva_pizza = people[0].borrow().relation_many("favoriteFood").unwrap()[0].clone();
    let peter_pizza = people[1].borrow().relation_many("favoriteFood").unwrap()[0].clone();
    println!(
        "Eva's pizza is Peter's pizza: {}",
        eva_pizza.ptr_eq(&peter_pizza)
    );

    Ok(())
}

fn row(
    person_id: i64,
    person_name: &str,
    town_id: i64,
    town_name: &str,
    country_id: i64,
    country_name: &str,
    food: Option<(i64, &str)>,
) -> JoinedRow {
    let row = JoinedRow::new()
        .with("person_id", person_id)
        .with("person_name", person_name)
        .with("town_id", town_id)
        .with("town_name", town_name)
        .with("country_id", country_id)
        .with("country_name", country_name);

    match food {
        Some((food_id, food_name)) => row.with("food_id", food_id).with("food_name", food_name),
        None => row
            .with("food_id", Value::Null)
            .with("food_name", Value::Null),
    }
}

fn text(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}
