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

use serde::{Deserialize, Serialize};

use super::stats::PartitionStats;
use crate::error::{PaimonError, PaimonResult};

/// Metadata of one manifest file, as listed in a manifest list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFileMeta {
    /// Path relative to the table root.
    #[serde(rename = "_FILE_NAME")]
    pub file_name: String,
    #[serde(rename = "_FILE_SIZE")]
    pub file_size: i64,
    #[serde(rename = "_NUM_ADDED_FILES")]
    pub num_added_files: i64,
    #[serde(rename = "_NUM_DELETED_FILES")]
    pub num_deleted_files: i64,
    #[serde(rename = "_PARTITION_STATS")]
    pub partition_stats: PartitionStats,
    #[serde(rename = "_SCHEMA_ID")]
    pub schema_id: i64,
    #[serde(rename = "_MIN_BUCKET")]
    pub min_bucket: Option<i32>,
    #[serde(rename = "_MAX_BUCKET")]
    pub max_bucket: Option<i32>,
    #[serde(rename = "_MIN_LEVEL")]
    pub min_level: Option<i32>,
    #[serde(rename = "_MAX_LEVEL")]
    pub max_level: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestList {
    pub entries: Vec<ManifestFileMeta>,
}

impl ManifestList {
    pub fn new(entries: Vec<ManifestFileMeta>) -> Self {
        Self { entries }
    }

    pub fn to_json_bytes(&self) -> PaimonResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| PaimonError::json("manifest list", e))
    }

    pub fn from_json_slice(bytes: &[u8]) -> PaimonResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| PaimonError::json("manifest list", e))
    }
}
