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

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data_file::DataFileMeta;
use crate::error::{PaimonError, PaimonResult};

/// Kind of a manifest entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoPrimitive, TryFromPrimitive,
)]
#[serde(into = "i8", try_from = "i8")]
#[repr(i8)]
pub enum FileKind {
    Add = 0,
    Delete = 1,
}

/// A manifest entry describes one data file added to or removed from a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "_KIND")]
    pub kind: FileKind,
    /// Partition values in partition key order.
    #[serde(rename = "_PARTITION")]
    pub partition: Vec<Value>,
    #[serde(rename = "_BUCKET")]
    pub bucket: i32,
    #[serde(rename = "_TOTAL_BUCKETS")]
    pub total_buckets: i32,
    #[serde(rename = "_FILE")]
    pub file: DataFileMeta,
}

impl ManifestEntry {
    pub fn new(
        kind: FileKind,
        partition: Vec<Value>,
        bucket: i32,
        total_buckets: i32,
        file: DataFileMeta,
    ) -> Self {
        Self {
            kind,
            partition,
            bucket,
            total_buckets,
            file,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn to_json_bytes(&self) -> PaimonResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| PaimonError::json("manifest", e))
    }

    pub fn from_json_slice(bytes: &[u8]) -> PaimonResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| PaimonError::json("manifest", e))
    }
}
