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

//! End-to-end tests of table generation against temporary warehouses.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use common::{options, orders, orders_schema, read_json, read_text, user, users_schema, users_table};
use lakeforge_paimon::operations::{GenerationState, GenerationStep, TableDefinition};
use lakeforge_paimon::spec::{DataType, Datum, TableSchema, DEFAULT_PARTITION_NAME};
use lakeforge_paimon::{verify_table, PaimonError, TableGenerator};
use serde_json::{json, Value};

fn latest_snapshot(table: &Path) -> Value {
    let latest = read_text(&table.join("snapshot").join("LATEST"));
    read_json(&table.join("snapshot").join(format!("snapshot-{latest}")))
}

fn manifest_entries(table: &Path, manifest_list: &str) -> Vec<Value> {
    let list = read_json(&table.join(manifest_list));
    list["entries"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|meta| {
            let manifest = read_json(&table.join(meta["_FILE_NAME"].as_str().unwrap()));
            manifest["entries"].as_array().unwrap().clone()
        })
        .collect()
}

#[test]
fn test_unpartitioned_table_layout() {
    let root = tempfile::tempdir().unwrap();
    let report = TableGenerator::new(root.path(), options())
        .generate(&users_table())
        .unwrap();
    assert_eq!(report.snapshot_ids, vec![1]);
    assert_eq!(report.total_record_count, 3);
    assert_eq!(report.final_state, GenerationState::SchemaWritten);

    let table = root.path().join("test_table");
    for dir in ["bucket-0", "manifest", "snapshot", "schema"] {
        assert!(table.join(dir).is_dir(), "missing {dir}");
    }
    assert_eq!(read_text(&table.join("snapshot").join("EARLIEST")), "1");
    assert_eq!(read_text(&table.join("snapshot").join("LATEST")), "1");
    assert!(table.join("schema").join("schema-0").is_file());

    let snapshot = latest_snapshot(&table);
    assert_eq!(snapshot["id"], json!(1));
    assert_eq!(snapshot["schemaId"], json!(0));
    assert_eq!(snapshot["baseManifestList"], json!(""));
    assert_eq!(snapshot["commitUser"], json!("test-user"));
    assert_eq!(snapshot["commitKind"], json!("APPEND"));
    assert_eq!(snapshot["totalRecordCount"], json!(3));
    assert_eq!(snapshot["deltaRecordCount"], json!(3));
    assert_eq!(snapshot["watermark"], json!(i64::MIN));
    let delta = snapshot["deltaManifestList"].as_str().unwrap();
    assert!(delta.starts_with("manifest/manifest-list-"));
    assert_eq!(
        snapshot["deltaManifestListSize"],
        json!(fs::metadata(table.join(delta)).unwrap().len())
    );

    let entries = manifest_entries(&table, delta);
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry["_KIND"], json!(0));
    assert_eq!(entry["_PARTITION"], json!([]));
    assert_eq!(entry["_BUCKET"], json!(0));
    assert_eq!(entry["_TOTAL_BUCKETS"], json!(1));
    let file = &entry["_FILE"];
    assert_eq!(file["_ROW_COUNT"], json!(3));
    assert_eq!(file["_MIN_KEY"], json!([1]));
    assert_eq!(file["_MAX_KEY"], json!([3]));
    assert_eq!(file["_MIN_SEQUENCE_NUMBER"], json!(1));
    assert_eq!(file["_MAX_SEQUENCE_NUMBER"], json!(3));
    assert_eq!(file["_LEVEL"], json!(0));
    assert_eq!(file["_KEY_STATS"]["colNames"], json!(["id"]));
    assert_eq!(file["_VALUE_STATS"]["colNames"], json!(["id", "name", "age"]));
    assert_eq!(
        file["_VALUE_STATS"]["colStats"][0],
        json!({"min": 1, "max": 3, "nullCount": 0})
    );
    assert_eq!(
        file["_VALUE_STATS"]["colStats"][1],
        json!({"min": "Alice", "max": "Charlie", "nullCount": 0})
    );

    let data_file = file["_FILE_NAME"].as_str().unwrap();
    assert!(data_file.starts_with("bucket-0/data-"));
    assert!(data_file.ends_with("-0.orc"));
    assert_eq!(
        file["_FILE_SIZE"],
        json!(fs::metadata(table.join(data_file)).unwrap().len())
    );
}

#[test]
fn test_table_without_primary_key_has_empty_keys() {
    let root = tempfile::tempdir().unwrap();
    let schema = TableSchema::builder()
        .with_column("id", DataType::int())
        .with_column("name", DataType::string())
        .with_column("age", DataType::int())
        .build()
        .unwrap();
    let table = TableDefinition::new("no_keys", schema)
        .with_commit(vec![user(2, "b", 1), user(1, "a", 2)]);
    TableGenerator::new(root.path(), options())
        .generate(&table)
        .unwrap();

    let table = root.path().join("no_keys");
    let snapshot = latest_snapshot(&table);
    let entries = manifest_entries(&table, snapshot["deltaManifestList"].as_str().unwrap());
    let file = &entries[0]["_FILE"];
    assert_eq!(file["_MIN_KEY"], json!([]));
    assert_eq!(file["_MAX_KEY"], json!([]));
    assert_eq!(file["_KEY_STATS"], json!({"colNames": [], "colStats": []}));
}

#[test]
fn test_partitioned_table_accounts_for_every_row() {
    let root = tempfile::tempdir().unwrap();
    let table = TableDefinition::new("partitioned_table", orders_schema()).with_commit(orders());
    let report = TableGenerator::new(root.path(), options())
        .generate(&table)
        .unwrap();
    assert_eq!(report.data_files, 3);

    let table = root.path().join("partitioned_table");
    let snapshot = latest_snapshot(&table);
    assert_eq!(snapshot["totalRecordCount"], json!(6));
    let delta = snapshot["deltaManifestList"].as_str().unwrap();

    let list = read_json(&table.join(delta));
    let meta = &list["entries"][0];
    assert_eq!(meta["_NUM_ADDED_FILES"], json!(3));
    assert_eq!(meta["_NUM_DELETED_FILES"], json!(0));
    assert_eq!(meta["_MIN_BUCKET"], json!(0));
    assert_eq!(meta["_MAX_BUCKET"], json!(0));
    assert_eq!(
        meta["_PARTITION_STATS"],
        json!({
            "colNames": ["order_date"],
            "colStats": [{"min": "2024-01-01", "max": "2024-01-03", "nullCount": 0}],
            "nullCount": 0
        })
    );

    let entries = manifest_entries(&table, delta);
    let mut rows_per_partition = BTreeMap::new();
    for entry in &entries {
        let date = entry["_PARTITION"][0].as_str().unwrap().to_string();
        let file = &entry["_FILE"];
        let data_file = file["_FILE_NAME"].as_str().unwrap();
        assert!(data_file.starts_with(&format!("order_date={date}/bucket-0/data-")));
        assert!(table.join(data_file).is_file());
        let previous = rows_per_partition.insert(date, file["_ROW_COUNT"].as_i64().unwrap());
        assert!(previous.is_none(), "partition listed twice");
    }
    assert_eq!(
        rows_per_partition,
        BTreeMap::from([
            ("2024-01-01".to_string(), 2),
            ("2024-01-02".to_string(), 2),
            ("2024-01-03".to_string(), 2),
        ])
    );

    // sequence numbers are contiguous across the entries of the manifest
    let mut ranges: Vec<(i64, i64)> = entries
        .iter()
        .map(|e| {
            (
                e["_FILE"]["_MIN_SEQUENCE_NUMBER"].as_i64().unwrap(),
                e["_FILE"]["_MAX_SEQUENCE_NUMBER"].as_i64().unwrap(),
            )
        })
        .collect();
    ranges.sort();
    assert_eq!(ranges, vec![(1, 2), (3, 4), (5, 6)]);
}

#[test]
fn test_null_and_placeholder_partitions_stay_separate() {
    let root = tempfile::tempdir().unwrap();
    let schema = TableSchema::builder()
        .with_column("id", DataType::int())
        .with_column("region", DataType::string())
        .with_partition_keys(["region"])
        .build()
        .unwrap();
    let table = TableDefinition::new("regions", schema).with_commit(vec![
        vec![Datum::Int(1), Datum::Null],
        vec![Datum::Int(2), Datum::string(DEFAULT_PARTITION_NAME)],
    ]);
    let report = TableGenerator::new(root.path(), options())
        .generate(&table)
        .unwrap();
    assert_eq!(report.data_files, 2);

    let table = root.path().join("regions");
    let snapshot = latest_snapshot(&table);
    let entries = manifest_entries(&table, snapshot["deltaManifestList"].as_str().unwrap());
    assert_eq!(entries.len(), 2);

    let null_entry = &entries[0];
    assert_eq!(null_entry["_PARTITION"], json!([null]));
    assert_eq!(null_entry["_FILE"]["_ROW_COUNT"], json!(1));
    assert_eq!(
        null_entry["_FILE"]["_VALUE_STATS"]["colStats"][1],
        json!({"min": null, "max": null, "nullCount": 1})
    );
    let string_entry = &entries[1];
    assert_eq!(string_entry["_PARTITION"], json!([DEFAULT_PARTITION_NAME]));
    assert_eq!(string_entry["_FILE"]["_ROW_COUNT"], json!(1));
    assert_eq!(
        string_entry["_FILE"]["_VALUE_STATS"]["colStats"][1],
        json!({"min": DEFAULT_PARTITION_NAME, "max": DEFAULT_PARTITION_NAME, "nullCount": 0})
    );

    // both files share the placeholder directory under distinct names
    let prefix = format!("region={DEFAULT_PARTITION_NAME}/bucket-0/data-");
    for entry in &entries {
        assert!(entry["_FILE"]["_FILE_NAME"].as_str().unwrap().starts_with(&prefix));
    }
    assert_ne!(
        null_entry["_FILE"]["_FILE_NAME"],
        string_entry["_FILE"]["_FILE_NAME"]
    );
    assert_eq!(verify_table(root.path(), "regions").unwrap().total_record_count, 2);
}

#[test]
fn test_unwritable_warehouse_fails_before_any_table_files() {
    let root = tempfile::tempdir().unwrap();
    let warehouse = root.path().join("warehouse");
    fs::write(&warehouse, b"not a directory").unwrap();

    let err = TableGenerator::new(&warehouse, options())
        .generate(&users_table())
        .unwrap_err();
    assert_eq!(err.step(), Some(GenerationStep::CreateDirectories));
    assert!(matches!(err.root_cause(), PaimonError::Io { .. }));
    assert!(err.to_string().contains("test_table"));
    assert!(warehouse.is_file());
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
}

#[test]
fn test_multiple_commits_advance_pointers_and_sequence_numbers() {
    let root = tempfile::tempdir().unwrap();
    let rows = orders();
    let table = TableDefinition::new("orders", orders_schema())
        .with_commit(rows[..4].to_vec())
        .with_commit(rows[4..].to_vec());
    let report = TableGenerator::new(root.path(), options())
        .generate(&table)
        .unwrap();
    assert_eq!(report.snapshot_ids, vec![1, 2]);
    assert_eq!(report.total_record_count, 6);

    let table = root.path().join("orders");
    assert_eq!(read_text(&table.join("snapshot").join("EARLIEST")), "1");
    assert_eq!(read_text(&table.join("snapshot").join("LATEST")), "2");

    let first = read_json(&table.join("snapshot").join("snapshot-1"));
    let second = latest_snapshot(&table);
    assert_eq!(first["baseManifestList"], json!(""));
    assert_eq!(first["totalRecordCount"], json!(4));
    assert_eq!(second["deltaRecordCount"], json!(2));
    assert_eq!(second["totalRecordCount"], json!(6));

    let base = second["baseManifestList"].as_str().unwrap();
    assert!(!base.is_empty());
    let first_delta = read_json(&table.join(first["deltaManifestList"].as_str().unwrap()));
    let base_list = read_json(&table.join(base));
    assert_eq!(base_list["entries"], first_delta["entries"]);

    let max_first = manifest_entries(&table, first["deltaManifestList"].as_str().unwrap())
        .iter()
        .map(|e| e["_FILE"]["_MAX_SEQUENCE_NUMBER"].as_i64().unwrap())
        .max()
        .unwrap();
    let min_second = manifest_entries(&table, second["deltaManifestList"].as_str().unwrap())
        .iter()
        .map(|e| e["_FILE"]["_MIN_SEQUENCE_NUMBER"].as_i64().unwrap())
        .min()
        .unwrap();
    assert_eq!(max_first, 4);
    assert_eq!(min_second, 5);
}

#[test]
fn test_schema_round_trip() {
    let root = tempfile::tempdir().unwrap();
    TableGenerator::new(root.path(), options())
        .generate(&users_table())
        .unwrap();
    let bytes = fs::read(root.path().join("test_table/schema/schema-0")).unwrap();
    let decoded = TableSchema::from_json_slice(&bytes).unwrap();
    let expected = users_schema();

    let fields: Vec<(i32, String)> = decoded
        .fields
        .iter()
        .map(|f| (f.id, f.name.clone()))
        .collect();
    assert_eq!(
        fields,
        vec![
            (0, "id".to_string()),
            (1, "name".to_string()),
            (2, "age".to_string())
        ]
    );
    assert_eq!(decoded.fields, expected.fields);
    assert_eq!(decoded.primary_keys, vec!["id".to_string()]);
    assert!(decoded.partition_keys.is_empty());
    assert_eq!(decoded.highest_field_id, 2);
}

#[test]
fn test_repeated_runs_use_fresh_file_names() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let generator = |root: &Path| {
        TableGenerator::new(root, options())
            .generate(&users_table())
            .unwrap();
        let table = root.join("test_table");
        let snapshot = latest_snapshot(&table);
        snapshot["deltaManifestList"].as_str().unwrap().to_string()
    };
    assert_ne!(generator(first.path()), generator(second.path()));
}

#[test]
fn test_rerun_does_not_touch_existing_table() {
    let root = tempfile::tempdir().unwrap();
    let generator = TableGenerator::new(root.path(), options());
    generator.generate(&users_table()).unwrap();
    let before = read_text(&root.path().join("test_table/snapshot/snapshot-1"));

    let err = generator.generate(&users_table()).unwrap_err();
    assert_eq!(err.step(), Some(GenerationStep::Validate));
    assert!(matches!(
        err.root_cause(),
        PaimonError::TableAlreadyExists(_)
    ));
    assert_eq!(
        read_text(&root.path().join("test_table/snapshot/snapshot-1")),
        before
    );
    assert!(!root.path().join("test_table/snapshot/snapshot-2").exists());
}

#[test]
fn test_rerun_guard_follows_the_schema_id() {
    let root = tempfile::tempdir().unwrap();
    let schema = TableSchema::builder()
        .with_schema_id(2)
        .with_column("id", DataType::int())
        .build()
        .unwrap();
    let table = TableDefinition::new("evolved", schema).with_commit(vec![vec![Datum::Int(1)]]);

    let schema_dir = root.path().join("evolved/schema");
    fs::create_dir_all(&schema_dir).unwrap();
    fs::write(schema_dir.join("schema-2"), b"{}").unwrap();

    let err = TableGenerator::new(root.path(), options())
        .generate(&table)
        .unwrap_err();
    assert_eq!(err.step(), Some(GenerationStep::Validate));
    assert!(matches!(
        err.root_cause(),
        PaimonError::TableAlreadyExists(_)
    ));
    assert!(!root.path().join("evolved/snapshot").exists());
}
