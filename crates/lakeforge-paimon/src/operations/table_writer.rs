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

use log::{debug, trace};

use super::commit::SnapshotCommit;
use super::{GenerationState, GenerationStep};
use crate::error::{PaimonError, PaimonResult};
use crate::io::{PathFactory, TableDirectories};
use crate::spec::{Datum, ManifestFileMeta, Row, Snapshot, SnapshotBuilder, TableSchema};
use crate::writer::{
    manifest_file_meta, DataBatch, DataFileWriter, ManifestListWriter, ManifestWriter,
    SequenceCounter, WrittenManifest, WrittenManifestList,
};

/// Every table is written with a single bucket.
pub const TOTAL_BUCKETS: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOptions {
    pub commit_user: String,
    pub commit_identifier: i64,
}

/// The outcome of one successful commit.
#[derive(Debug, Clone)]
pub struct CommitResult {
    pub snapshot: Snapshot,
    pub data_files: Vec<String>,
    pub manifest: String,
}

/// Appends snapshots to one table.
///
/// The writer owns the state that must be threaded across commits: the next
/// snapshot id, the sequence number counter, the running record count, and
/// the manifests committed so far (which form the base of the next snapshot).
pub struct TableWriter<'a> {
    table: &'a str,
    dirs: &'a TableDirectories,
    schema: &'a TableSchema,
    path_factory: &'a PathFactory,
    options: &'a CommitOptions,
    next_snapshot_id: i64,
    sequence: SequenceCounter,
    total_record_count: i64,
    committed: Vec<ManifestFileMeta>,
    state: GenerationState,
}

impl<'a> TableWriter<'a> {
    pub fn new(
        table: &'a str,
        dirs: &'a TableDirectories,
        schema: &'a TableSchema,
        path_factory: &'a PathFactory,
        options: &'a CommitOptions,
    ) -> Self {
        Self {
            table,
            dirs,
            schema,
            path_factory,
            options,
            next_snapshot_id: 1,
            sequence: SequenceCounter::default(),
            total_record_count: 0,
            committed: vec![],
            state: GenerationState::DirsCreated,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn total_record_count(&self) -> i64 {
        self.total_record_count
    }

    pub fn next_snapshot_id(&self) -> i64 {
        self.next_snapshot_id
    }

    /// Writes the rows as a new APPEND snapshot.
    pub fn commit(&mut self, rows: &[Row]) -> PaimonResult<CommitResult> {
        let batches = self.run(GenerationStep::WriteData, |w| w.write_data(rows))?;
        let manifest = self.run(GenerationStep::WriteManifest, |w| w.write_manifest(&batches))?;
        let (base, delta, meta) = self.run(GenerationStep::WriteManifestList, |w| {
            w.write_manifest_lists(&manifest)
        })?;
        let delta_record_count = batches.iter().map(|b| b.file.row_count).sum::<i64>();
        let snapshot = self.run(GenerationStep::WriteSnapshot, |w| {
            w.write_snapshot(base.as_ref(), &delta, delta_record_count)
        })?;

        self.next_snapshot_id += 1;
        self.total_record_count = snapshot.total_record_count;
        self.committed.push(meta);
        Ok(CommitResult {
            snapshot,
            data_files: batches.into_iter().map(|b| b.file.file_name).collect(),
            manifest: manifest.file_name,
        })
    }

    fn run<T>(
        &mut self,
        step: GenerationStep,
        f: impl FnOnce(&mut Self) -> PaimonResult<T>,
    ) -> PaimonResult<T> {
        let value = f(self).map_err(|e| e.at(self.table, step))?;
        debug!("{}: {} -> {}", self.table, self.state, step.target());
        self.state = step.target();
        Ok(value)
    }

    /// Groups rows by partition (in order of first appearance) and writes
    /// one data file per partition bucket.
    fn write_data(&self, rows: &[Row]) -> PaimonResult<Vec<DataBatch>> {
        if rows.is_empty() {
            return Err(PaimonError::invalid("a commit must contain at least one row"));
        }
        let partition_indices = self.schema.partition_key_indices();
        let mut groups: Vec<(Vec<Datum>, Vec<Row>)> = vec![];
        for row in rows {
            self.schema.validate_row(row)?;
            let partition: Vec<Datum> = partition_indices.iter().map(|&i| row[i].clone()).collect();
            // Distinct tuples may share a directory name (a null and its
            // placeholder string), so they are grouped by value.
            match groups
                .iter_mut()
                .find(|(p, _)| same_partition(p, &partition))
            {
                Some((_, group)) => group.push(row.clone()),
                None => groups.push((partition, vec![row.clone()])),
            }
        }

        let writer = DataFileWriter::new(self.table, self.schema, self.path_factory);
        let mut batches = Vec::with_capacity(groups.len());
        for (partition, rows) in groups {
            let named: Vec<(&str, &Datum)> = self
                .schema
                .partition_keys
                .iter()
                .map(String::as_str)
                .zip(partition.iter())
                .collect();
            let bucket = 0;
            let (relative, dir) = self.dirs.partition_bucket_dir(&named, bucket)?;
            let file = writer.write(&dir, &relative, &rows)?;
            trace!("{}: wrote {} with {} rows", self.table, file.file_name, file.row_count);
            batches.push(DataBatch {
                partition,
                bucket,
                rows,
                file,
            });
        }
        Ok(batches)
    }

    fn write_manifest(&mut self, batches: &[DataBatch]) -> PaimonResult<WrittenManifest> {
        let writer = ManifestWriter::new(self.schema, self.path_factory, TOTAL_BUCKETS);
        writer.write(&self.dirs.manifest, batches, &mut self.sequence)
    }

    /// Writes the base list (all earlier manifests, from the second snapshot
    /// on) and the delta list (this commit's manifest).
    fn write_manifest_lists(
        &self,
        manifest: &WrittenManifest,
    ) -> PaimonResult<(Option<WrittenManifestList>, WrittenManifestList, ManifestFileMeta)> {
        let writer = ManifestListWriter::new(self.path_factory);
        let base = if self.committed.is_empty() {
            None
        } else {
            Some(writer.write(&self.dirs.manifest, self.committed.clone())?)
        };
        let meta = manifest_file_meta(manifest, &self.schema.partition_keys);
        let delta = writer.write(&self.dirs.manifest, vec![meta.clone()])?;
        Ok((base, delta, meta))
    }

    fn write_snapshot(
        &self,
        base: Option<&WrittenManifestList>,
        delta: &WrittenManifestList,
        delta_record_count: i64,
    ) -> PaimonResult<Snapshot> {
        let mut builder =
            SnapshotBuilder::new(self.next_snapshot_id, self.schema.id, &delta.file_name)
                .with_delta_manifest_list_size(delta.file_size)
                .with_commit_user(&self.options.commit_user)
                .with_commit_identifier(self.options.commit_identifier)
                .with_time_millis(chrono::Utc::now().timestamp_millis())
                .with_record_counts(
                    self.total_record_count + delta_record_count,
                    delta_record_count,
                );
        if let Some(base) = base {
            builder = builder.with_base_manifest_list(&base.file_name);
        }
        let snapshot = builder.build();
        SnapshotCommit::new(&self.dirs.snapshot).commit(&snapshot)?;
        Ok(snapshot)
    }
}

fn same_partition(a: &[Datum], b: &[Datum]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x == y || x.compare(y) == Some(Ordering::Equal))
}
