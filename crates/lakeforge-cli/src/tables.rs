use lakeforge_paimon::spec::{DataField, DataType, Datum, Row, TableSchema};
use lakeforge_paimon::{PaimonError, PaimonResult, TableDefinition};

pub const DEMO_TABLE_NAMES: [&str; 3] = ["test_table", "partitioned_table", "complex_table"];

/// The built-in demo tables, in generation order.
pub fn demo_tables() -> PaimonResult<Vec<TableDefinition>> {
    Ok(vec![users_table()?, orders_table()?, complex_table()?])
}

fn users_table() -> PaimonResult<TableDefinition> {
    let schema = TableSchema::builder()
        .with_column("id", DataType::int())
        .with_column("name", DataType::string())
        .with_column("age", DataType::int())
        .with_primary_keys(["id"])
        .with_comment("users")
        .build()?;
    let user = |id: i32, name: &str, age: i32| -> Row {
        vec![Datum::Int(id), Datum::string(name), Datum::Int(age)]
    };
    Ok(TableDefinition::new("test_table", schema).with_commit(vec![
        user(1, "Alice", 25),
        user(2, "Bob", 30),
        user(3, "Charlie", 35),
    ]))
}

fn date(year: i32, month: u32, day: u32) -> PaimonResult<Datum> {
    Datum::date(year, month, day)
        .ok_or_else(|| PaimonError::invalid(format!("invalid date {year}-{month}-{day}")))
}

fn orders_table() -> PaimonResult<TableDefinition> {
    let schema = TableSchema::builder()
        .with_column("order_id", DataType::bigint())
        .with_column("customer_id", DataType::int())
        .with_column("amount", DataType::double())
        .with_column("order_date", DataType::date())
        .with_primary_keys(["order_id", "order_date"])
        .with_partition_keys(["order_date"])
        .with_option("bucket", "1")
        .build()?;
    let order = |order_id: i64, customer_id: i32, amount: f64, day: u32| -> PaimonResult<Row> {
        Ok(vec![
            Datum::BigInt(order_id),
            Datum::Int(customer_id),
            Datum::Double(amount),
            date(2024, 1, day)?,
        ])
    };
    Ok(TableDefinition::new("partitioned_table", schema)
        .with_commit(vec![
            order(1, 1001, 99.99, 1)?,
            order(2, 1002, 149.5, 1)?,
            order(3, 1001, 12.0, 2)?,
            order(4, 1003, 75.25, 2)?,
        ])
        .with_commit(vec![order(5, 1004, 300.0, 3)?, order(6, 1002, 18.75, 3)?]))
}

fn complex_table() -> PaimonResult<TableDefinition> {
    let schema = TableSchema::builder()
        .with_column("id", DataType::bigint())
        .with_column("tags", DataType::array(DataType::string()))
        .with_column(
            "attributes",
            DataType::map(DataType::string().not_null(), DataType::int()),
        )
        .with_column(
            "address",
            DataType::row(vec![
                DataField::new(4, "city", DataType::string()),
                DataField::new(5, "zip", DataType::string()),
            ]),
        )
        .with_column("score", DataType::double())
        .with_column("active", DataType::boolean())
        .with_primary_keys(["id"])
        .build()?;
    Ok(TableDefinition::new("complex_table", schema).with_commit(vec![
        complex_row(1, &["a", "b"], &[("x", 1)], "Berlin", Some(0.5), true),
        complex_row(2, &[], &[], "Lisbon", None, false),
        complex_row(3, &["c"], &[("y", 2), ("z", 3)], "Oslo", Some(9.75), true),
    ]))
}

fn complex_row(
    id: i64,
    tags: &[&str],
    attributes: &[(&str, i32)],
    city: &str,
    score: Option<f64>,
    active: bool,
) -> Row {
    vec![
        Datum::BigInt(id),
        Datum::Array(tags.iter().map(|t| Datum::string(*t)).collect()),
        Datum::Map(
            attributes
                .iter()
                .map(|(k, v)| (Datum::string(*k), Datum::Int(*v)))
                .collect(),
        ),
        Datum::Row(vec![Datum::string(city), Datum::Null]),
        score.map_or(Datum::Null, Datum::Double),
        Datum::Boolean(active),
    ]
}
