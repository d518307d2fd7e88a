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

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::path_factory::{bucket_dir_name, MANIFEST_DIR, SCHEMA_DIR, SNAPSHOT_DIR};
use crate::error::{PaimonError, PaimonResult};
use crate::spec::Datum;

/// The directory subtree owned by one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDirectories {
    pub table: PathBuf,
    pub bucket: PathBuf,
    pub manifest: PathBuf,
    pub snapshot: PathBuf,
    pub schema: PathBuf,
}

impl TableDirectories {
    /// Derives the table directories without touching the filesystem.
    pub fn locate(root: &Path, table: &str) -> PaimonResult<Self> {
        validate_table_name(table)?;
        let table = root.join(table);
        Ok(Self {
            bucket: table.join(bucket_dir_name(0)),
            manifest: table.join(MANIFEST_DIR),
            snapshot: table.join(SNAPSHOT_DIR),
            schema: table.join(SCHEMA_DIR),
            table,
        })
    }

    /// Creates the table directories if absent. Existing content is left untouched.
    pub fn create(root: &Path, table: &str) -> PaimonResult<Self> {
        let dirs = Self::locate(root, table)?;
        for dir in [&dirs.bucket, &dirs.manifest, &dirs.snapshot, &dirs.schema] {
            fs::create_dir_all(dir).map_err(|e| PaimonError::io(dir, e))?;
        }
        debug!("created table directories under {}", dirs.table.display());
        Ok(dirs)
    }

    /// Creates the bucket directory for a partition and returns its path
    /// relative to the table root along with the absolute path.
    ///
    /// An unpartitioned table uses `bucket-<n>` directly, a partitioned
    /// table nests it below one `key=value` directory per partition key.
    pub fn partition_bucket_dir(
        &self,
        partition: &[(&str, &Datum)],
        bucket: i32,
    ) -> PaimonResult<(String, PathBuf)> {
        let mut segments: Vec<String> = partition
            .iter()
            .map(|(key, value)| format!("{key}={}", value.to_partition_path_value()))
            .collect();
        segments.push(bucket_dir_name(bucket));
        let relative = segments.join("/");
        let path = segments
            .iter()
            .fold(self.table.clone(), |path, segment| path.join(segment));
        fs::create_dir_all(&path).map_err(|e| PaimonError::io(&path, e))?;
        Ok((relative, path))
    }

    /// Resolves a path stored in table metadata, which is relative to the table root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.table.clone(), |path, segment| path.join(segment))
    }
}

pub fn validate_table_name(table: &str) -> PaimonResult<()> {
    if table.is_empty()
        || table == "."
        || table == ".."
        || table.contains(['/', '\\'])
        || table.contains(char::is_control)
    {
        return Err(PaimonError::invalid(format!("invalid table name: {table:?}")));
    }
    Ok(())
}
