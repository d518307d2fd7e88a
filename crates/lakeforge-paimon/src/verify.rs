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

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{PaimonError, PaimonResult};
use crate::io::{
    file_size, read_file, schema_file_name, snapshot_file_name, TableDirectories, EARLIEST, LATEST,
    SNAPSHOT_DIR,
};
use crate::operations::read_pointer;
use crate::spec::{FileKind, Manifest, ManifestFileMeta, ManifestList, Snapshot, TableSchema};
use crate::writer::count_payload_rows;

const SNAPSHOT_FILE_PREFIX: &str = "snapshot-";

/// What a successful verification found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,
    pub earliest: i64,
    pub latest: i64,
    pub snapshot_ids: Vec<i64>,
    pub manifests: usize,
    pub data_files: usize,
    /// `totalRecordCount` of the latest snapshot.
    pub total_record_count: i64,
}

fn check(condition: bool, message: impl FnOnce() -> String) -> PaimonResult<()> {
    if condition {
        Ok(())
    } else {
        Err(PaimonError::invariant(message()))
    }
}

/// Reads a table back and checks that every reference resolves and every
/// recorded count and size agrees with what is on disk.
pub fn verify_table(root: &Path, table: &str) -> PaimonResult<TableReport> {
    let dirs = TableDirectories::locate(root, table)?;
    let earliest = read_pointer(&dirs.snapshot, EARLIEST)?
        .ok_or_else(|| PaimonError::invariant(format!("{table}: missing {EARLIEST}")))?;
    let latest = read_pointer(&dirs.snapshot, LATEST)?
        .ok_or_else(|| PaimonError::invariant(format!("{table}: missing {LATEST}")))?;

    let snapshot_ids = list_snapshot_ids(&dirs.snapshot)?;
    check(snapshot_ids.first() == Some(&earliest), || {
        format!("{table}: {EARLIEST} is {earliest} but the lowest snapshot is {snapshot_ids:?}")
    })?;
    check(snapshot_ids.last() == Some(&latest), || {
        format!("{table}: {LATEST} is {latest} but the highest snapshot is {snapshot_ids:?}")
    })?;

    let mut verifier = Verifier {
        table,
        dirs: &dirs,
        schemas: BTreeMap::new(),
        manifests: BTreeSet::new(),
        data_files: BTreeSet::new(),
    };
    let mut total_record_count = 0;
    for id in &snapshot_ids {
        total_record_count = verifier.verify_snapshot(*id)?;
    }
    debug!(
        "{table}: verified {} snapshot(s), {} manifest(s), {} data file(s)",
        snapshot_ids.len(),
        verifier.manifests.len(),
        verifier.data_files.len()
    );
    Ok(TableReport {
        table: table.to_string(),
        earliest,
        latest,
        manifests: verifier.manifests.len(),
        data_files: verifier.data_files.len(),
        snapshot_ids,
        total_record_count,
    })
}

/// Names of all tables (directories with a snapshot directory) in a warehouse.
pub fn list_tables(warehouse: &Path) -> PaimonResult<Vec<String>> {
    let entries = fs::read_dir(warehouse).map_err(|e| PaimonError::io(warehouse, e))?;
    let mut tables = vec![];
    for entry in entries {
        let entry = entry.map_err(|e| PaimonError::io(warehouse, e))?;
        if entry.path().join(SNAPSHOT_DIR).is_dir() {
            tables.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    tables.sort();
    Ok(tables)
}

fn list_snapshot_ids(snapshot_dir: &Path) -> PaimonResult<Vec<i64>> {
    let entries = fs::read_dir(snapshot_dir).map_err(|e| PaimonError::io(snapshot_dir, e))?;
    let mut ids = vec![];
    for entry in entries {
        let entry = entry.map_err(|e| PaimonError::io(snapshot_dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(id) = name
            .strip_prefix(SNAPSHOT_FILE_PREFIX)
            .and_then(|s| s.parse::<i64>().ok())
        {
            ids.push(id);
        }
    }
    ids.sort_unstable();
    Ok(ids)
}

struct Verifier<'a> {
    table: &'a str,
    dirs: &'a TableDirectories,
    schemas: BTreeMap<i64, TableSchema>,
    manifests: BTreeSet<String>,
    data_files: BTreeSet<String>,
}

impl Verifier<'_> {
    /// Returns the total record count of the snapshot.
    fn verify_snapshot(&mut self, id: i64) -> PaimonResult<i64> {
        let table = self.table;
        let path = self.dirs.snapshot.join(snapshot_file_name(id));
        let snapshot = Snapshot::from_json_slice(&read_file(&path)?)?;
        check(snapshot.id == id, || {
            format!("{table}: snapshot-{id} records id {}", snapshot.id)
        })?;
        self.load_schema(snapshot.schema_id)?;

        let delta_rows = self.verify_manifest_list(
            &snapshot.delta_manifest_list,
            Some(snapshot.delta_manifest_list_size),
            snapshot.schema_id,
        )?;
        let base_rows = if snapshot.base_manifest_list.is_empty() {
            0
        } else {
            self.verify_manifest_list(&snapshot.base_manifest_list, None, snapshot.schema_id)?
        };
        check(snapshot.delta_record_count == delta_rows, || {
            format!(
                "{table}: snapshot {id} deltaRecordCount is {} but its delta files hold {delta_rows} rows",
                snapshot.delta_record_count
            )
        })?;
        let total = base_rows + delta_rows;
        check(snapshot.total_record_count == total, || {
            format!(
                "{table}: snapshot {id} totalRecordCount is {} but reachable files hold {total} rows",
                snapshot.total_record_count
            )
        })?;
        Ok(total)
    }

    fn load_schema(&mut self, schema_id: i64) -> PaimonResult<&TableSchema> {
        if !self.schemas.contains_key(&schema_id) {
            let path = self.dirs.schema.join(schema_file_name(schema_id));
            check(path.is_file(), || {
                format!("{}: schema {schema_id} does not exist", self.table)
            })?;
            let schema = TableSchema::from_json_slice(&read_file(&path)?)?;
            check(schema.id == schema_id, || {
                format!("{}: schema-{schema_id} records id {}", self.table, schema.id)
            })?;
            self.schemas.insert(schema_id, schema);
        }
        self.schemas
            .get(&schema_id)
            .ok_or_else(|| PaimonError::invariant(format!("schema {schema_id} not loaded")))
    }

    fn verify_manifest_list(
        &mut self,
        relative: &str,
        recorded_size: Option<i64>,
        schema_id: i64,
    ) -> PaimonResult<i64> {
        let path = self.dirs.resolve(relative);
        let bytes = read_file(&path)?;
        if let Some(size) = recorded_size {
            check(size == bytes.len() as i64, || {
                format!(
                    "{}: {relative} is {} bytes but {size} is recorded",
                    self.table,
                    bytes.len()
                )
            })?;
        }
        let list = ManifestList::from_json_slice(&bytes)?;
        let mut rows = 0;
        for meta in &list.entries {
            rows += self.verify_manifest(meta, schema_id)?;
        }
        Ok(rows)
    }

    /// Returns the net number of rows added by the manifest.
    fn verify_manifest(&mut self, meta: &ManifestFileMeta, schema_id: i64) -> PaimonResult<i64> {
        let table = self.table;
        let path = self.dirs.resolve(&meta.file_name);
        let size = file_size(&path)?;
        check(size == meta.file_size, || {
            format!(
                "{table}: {} is {size} bytes but {} is recorded",
                meta.file_name, meta.file_size
            )
        })?;
        let manifest = Manifest::from_json_slice(&read_file(&path)?)?;
        let added = manifest
            .entries
            .iter()
            .filter(|e| e.kind == FileKind::Add)
            .count() as i64;
        let deleted = manifest.entries.len() as i64 - added;
        check(
            added == meta.num_added_files && deleted == meta.num_deleted_files,
            || format!("{table}: file counts of {} disagree", meta.file_name),
        )?;
        check(meta.schema_id <= schema_id, || {
            format!("{table}: {} uses a newer schema", meta.file_name)
        })?;
        let partition_arity = self.load_schema(meta.schema_id)?.partition_keys.len();

        let mut rows = 0;
        for entry in &manifest.entries {
            let file = &entry.file;
            check(entry.partition.len() == partition_arity, || {
                format!("{table}: {} has a malformed partition", file.file_name)
            })?;
            check(
                (0..entry.total_buckets).contains(&entry.bucket),
                || format!("{table}: {} has bucket {} out of range", file.file_name, entry.bucket),
            )?;
            let data_path = self.dirs.resolve(&file.file_name);
            let bytes = read_file(&data_path)?;
            check(bytes.len() as i64 == file.file_size, || {
                format!(
                    "{table}: {} is {} bytes but {} is recorded",
                    file.file_name,
                    bytes.len(),
                    file.file_size
                )
            })?;
            let payload_rows = count_payload_rows(&bytes)?;
            check(payload_rows == file.row_count, || {
                format!(
                    "{table}: {} holds {payload_rows} rows but {} is recorded",
                    file.file_name, file.row_count
                )
            })?;
            check(
                file.max_sequence_number - file.min_sequence_number + 1 == file.row_count,
                || format!("{table}: {} has a malformed sequence range", file.file_name),
            )?;
            self.data_files.insert(file.file_name.clone());
            match entry.kind {
                FileKind::Add => rows += file.row_count,
                FileKind::Delete => rows -= file.row_count,
            }
        }
        self.manifests.insert(meta.file_name.clone());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_missing_pointer_is_an_invariant_violation() {
        let root = tempfile::tempdir().unwrap();
        TableDirectories::create(root.path(), "t").unwrap();
        assert!(matches!(
            verify_table(root.path(), "t"),
            Err(PaimonError::Invariant(_))
        ));
        assert_eq!(list_tables(root.path()).unwrap(), vec!["t".to_string()]);
    }
}
