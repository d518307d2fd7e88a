// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared helpers for table generation integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;

use lakeforge_common::config::FileFormat;
use lakeforge_paimon::operations::{CommitOptions, GeneratorOptions, TableDefinition};
use lakeforge_paimon::spec::{DataType, Datum, Row, TableSchema};
use serde_json::Value;

pub fn options() -> GeneratorOptions {
    GeneratorOptions {
        commit: CommitOptions {
            commit_user: "test-user".to_string(),
            commit_identifier: i64::MAX,
        },
        file_format: FileFormat::Orc,
        fail_fast: false,
    }
}

pub fn users_schema() -> TableSchema {
    TableSchema::builder()
        .with_column("id", DataType::int())
        .with_column("name", DataType::string())
        .with_column("age", DataType::int())
        .with_primary_keys(["id"])
        .build()
        .unwrap()
}

pub fn user(id: i32, name: &str, age: i32) -> Row {
    vec![Datum::Int(id), Datum::string(name), Datum::Int(age)]
}

/// `test_table`: three users with ids 1 to 3.
pub fn users_table() -> TableDefinition {
    TableDefinition::new("test_table", users_schema()).with_commit(vec![
        user(1, "Alice", 30),
        user(2, "Bob", 25),
        user(3, "Charlie", 35),
    ])
}

pub fn orders_schema() -> TableSchema {
    TableSchema::builder()
        .with_column("order_id", DataType::bigint())
        .with_column("customer", DataType::string())
        .with_column("amount", DataType::double())
        .with_column("order_date", DataType::date())
        .with_primary_keys(["order_id", "order_date"])
        .with_partition_keys(["order_date"])
        .build()
        .unwrap()
}

pub fn order(id: i64, customer: &str, amount: f64, date: (i32, u32, u32)) -> Row {
    vec![
        Datum::BigInt(id),
        Datum::string(customer),
        Datum::Double(amount),
        Datum::date(date.0, date.1, date.2).unwrap(),
    ]
}

/// Six orders spread over three dates.
pub fn orders() -> Vec<Row> {
    vec![
        order(1, "alice", 10.5, (2024, 1, 1)),
        order(2, "bob", 20.0, (2024, 1, 2)),
        order(3, "carol", 7.25, (2024, 1, 1)),
        order(4, "dave", 99.0, (2024, 1, 3)),
        order(5, "erin", 1.0, (2024, 1, 2)),
        order(6, "frank", 42.0, (2024, 1, 3)),
    ]
}

pub fn read_json(path: &Path) -> Value {
    let bytes = std::fs::read(path).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn read_text(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
