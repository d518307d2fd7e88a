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

use std::cmp::Ordering;
use std::path::Path;

use serde_json::Value;

use super::data_file_writer::WrittenDataFile;
use super::SequenceCounter;
use crate::error::PaimonResult;
use crate::io::{write_new_file, PathFactory};
use crate::spec::{
    DataFileMeta, Datum, FileKind, FileSource, Manifest, ManifestEntry, Row, SimpleStats,
    StatsCollector, TableSchema,
};

/// Rows of one (partition, bucket) pair together with the data file holding them.
#[derive(Debug, Clone)]
pub struct DataBatch {
    pub partition: Vec<Datum>,
    pub bucket: i32,
    pub rows: Vec<Row>,
    pub file: WrittenDataFile,
}

/// A manifest on disk, with the typed partition values of its entries.
#[derive(Debug, Clone)]
pub struct WrittenManifest {
    /// Path relative to the table root.
    pub file_name: String,
    pub file_size: i64,
    pub schema_id: i64,
    pub entries: Vec<ManifestEntry>,
    pub partitions: Vec<Vec<Datum>>,
}

pub struct ManifestWriter<'a> {
    schema: &'a TableSchema,
    path_factory: &'a PathFactory,
    total_buckets: i32,
    creation_time: i64,
}

impl<'a> ManifestWriter<'a> {
    pub fn new(schema: &'a TableSchema, path_factory: &'a PathFactory, total_buckets: i32) -> Self {
        Self {
            schema,
            path_factory,
            total_buckets,
            creation_time: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_creation_time(mut self, creation_time: i64) -> Self {
        self.creation_time = creation_time;
        self
    }

    /// Writes one ADD entry per batch into a new manifest file.
    pub fn write(
        &self,
        manifest_dir: &Path,
        batches: &[DataBatch],
        sequence: &mut SequenceCounter,
    ) -> PaimonResult<WrittenManifest> {
        let entries: Vec<ManifestEntry> = batches
            .iter()
            .map(|batch| self.entry(batch, sequence))
            .collect();
        let manifest = Manifest::new(entries);
        let file_name = self.path_factory.manifest_file_name();
        let file_size = write_new_file(&manifest_dir.join(&file_name), &manifest.to_json_bytes()?)?;
        Ok(WrittenManifest {
            file_name: PathFactory::manifest_path(&file_name),
            file_size,
            schema_id: self.schema.id,
            entries: manifest.entries,
            partitions: batches.iter().map(|b| b.partition.clone()).collect(),
        })
    }

    fn entry(&self, batch: &DataBatch, sequence: &mut SequenceCounter) -> ManifestEntry {
        let key_indices = self.schema.primary_key_indices();
        let (min_key, max_key) = key_range(&batch.rows, &key_indices);
        let (min_sequence_number, max_sequence_number) = sequence.reserve(batch.file.row_count);
        let file = DataFileMeta {
            file_name: batch.file.file_name.clone(),
            file_size: batch.file.file_size,
            row_count: batch.file.row_count,
            min_key,
            max_key,
            key_stats: collect_stats(self.schema, &batch.rows, &key_indices),
            value_stats: collect_stats(
                self.schema,
                &batch.rows,
                &(0..self.schema.fields.len()).collect::<Vec<_>>(),
            ),
            min_sequence_number,
            max_sequence_number,
            schema_id: self.schema.id,
            level: 0,
            extra_files: vec![],
            creation_time: Some(self.creation_time),
            delete_row_count: Some(0),
            embedded_file_index: None,
            file_source: Some(FileSource::Append),
            value_stats_cols: None,
            external_path: None,
            first_row_id: None,
            write_cols: None,
        };
        ManifestEntry::new(
            FileKind::Add,
            batch.partition.iter().map(Datum::to_json).collect(),
            batch.bucket,
            self.total_buckets,
            file,
        )
    }
}

fn collect_stats(schema: &TableSchema, rows: &[Row], indices: &[usize]) -> SimpleStats {
    let names = indices
        .iter()
        .map(|&i| schema.fields[i].name.clone())
        .collect();
    let mut collector = StatsCollector::new(names);
    for row in rows {
        collector.update(indices.iter().map(|&i| &row[i]));
    }
    collector.finish()
}

fn compare_keys(a: &Row, b: &Row, indices: &[usize]) -> Ordering {
    indices
        .iter()
        .map(|&i| a[i].compare(&b[i]).unwrap_or(Ordering::Equal))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// The primary key tuples of the smallest and the largest row, or empty
/// tuples for a table without a primary key.
fn key_range(rows: &[Row], indices: &[usize]) -> (Vec<Value>, Vec<Value>) {
    if indices.is_empty() {
        return (vec![], vec![]);
    }
    let project = |row: &Row| -> Vec<Value> { indices.iter().map(|&i| row[i].to_json()).collect() };
    let min = rows.iter().min_by(|a, b| compare_keys(a, b, indices));
    let max = rows.iter().max_by(|a, b| compare_keys(a, b, indices));
    match (min, max) {
        (Some(min), Some(max)) => (project(min), project(max)),
        _ => (vec![], vec![]),
    }
}
