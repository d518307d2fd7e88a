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

use std::sync::Arc;

use lakeforge_common::config::FileFormat;

use super::identifier::IdentifierGenerator;

pub const MANIFEST_DIR: &str = "manifest";
pub const SNAPSHOT_DIR: &str = "snapshot";
pub const SCHEMA_DIR: &str = "schema";
pub const BUCKET_DIR_PREFIX: &str = "bucket-";
pub const EARLIEST: &str = "EARLIEST";
pub const LATEST: &str = "LATEST";

const METADATA_EXTENSION: &str = "json";

pub fn bucket_dir_name(bucket: i32) -> String {
    format!("{BUCKET_DIR_PREFIX}{bucket}")
}

pub fn snapshot_file_name(id: i64) -> String {
    format!("snapshot-{id}")
}

pub fn schema_file_name(id: i64) -> String {
    format!("schema-{id}")
}

/// Names the files of one table. Every data and manifest name embeds a fresh token.
#[derive(Clone)]
pub struct PathFactory {
    identifiers: Arc<dyn IdentifierGenerator>,
    format: FileFormat,
}

impl PathFactory {
    pub fn new(identifiers: Arc<dyn IdentifierGenerator>, format: FileFormat) -> Self {
        Self {
            identifiers,
            format,
        }
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn data_file_name(&self, shard: usize) -> String {
        format!(
            "data-{}-{shard}.{}",
            self.identifiers.next_token(),
            self.format.extension()
        )
    }

    pub fn manifest_file_name(&self) -> String {
        format!(
            "manifest-{}-0.{METADATA_EXTENSION}",
            self.identifiers.next_token()
        )
    }

    pub fn manifest_list_file_name(&self) -> String {
        format!(
            "manifest-list-{}-0.{METADATA_EXTENSION}",
            self.identifiers.next_token()
        )
    }

    /// Path of a manifest or manifest list relative to the table root.
    pub fn manifest_path(file_name: &str) -> String {
        format!("{MANIFEST_DIR}/{file_name}")
    }
}

impl std::fmt::Debug for PathFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathFactory")
            .field("format", &self.format)
            .finish()
    }
}
