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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PaimonError, PaimonResult};

pub const SNAPSHOT_VERSION: i32 = 3;

/// Watermark of a snapshot that does not track event time.
pub const WATERMARK_UNSET: i64 = i64::MIN;

/// Commit identifier used by batch (non-streaming) writers.
pub const BATCH_COMMIT_IDENTIFIER: i64 = i64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommitKind {
    Append,
    Compact,
    Overwrite,
    Analyze,
}

/// A commit record, serialized as `snapshot/snapshot-<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: i32,
    pub id: i64,
    pub schema_id: i64,
    /// Manifest list of all files committed before this snapshot, or empty.
    pub base_manifest_list: String,
    pub delta_manifest_list: String,
    pub delta_manifest_list_size: i64,
    pub changelog_manifest_list: Option<String>,
    pub index_manifest: Option<String>,
    pub commit_user: String,
    pub commit_identifier: i64,
    pub commit_kind: CommitKind,
    pub time_millis: i64,
    pub log_offsets: BTreeMap<i32, i64>,
    pub total_record_count: i64,
    pub delta_record_count: i64,
    pub watermark: i64,
    pub statistics: Option<String>,
    pub properties: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn to_json_bytes(&self) -> PaimonResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| PaimonError::json("snapshot", e))
    }

    pub fn from_json_slice(bytes: &[u8]) -> PaimonResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| PaimonError::json("snapshot", e))
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new(id: i64, schema_id: i64, delta_manifest_list: impl Into<String>) -> Self {
        Self {
            snapshot: Snapshot {
                version: SNAPSHOT_VERSION,
                id,
                schema_id,
                base_manifest_list: String::new(),
                delta_manifest_list: delta_manifest_list.into(),
                delta_manifest_list_size: 0,
                changelog_manifest_list: None,
                index_manifest: None,
                commit_user: String::new(),
                commit_identifier: BATCH_COMMIT_IDENTIFIER,
                commit_kind: CommitKind::Append,
                time_millis: 0,
                log_offsets: BTreeMap::new(),
                total_record_count: 0,
                delta_record_count: 0,
                watermark: WATERMARK_UNSET,
                statistics: None,
                properties: BTreeMap::new(),
            },
        }
    }

    pub fn with_base_manifest_list(mut self, path: impl Into<String>) -> Self {
        self.snapshot.base_manifest_list = path.into();
        self
    }

    pub fn with_delta_manifest_list_size(mut self, size: i64) -> Self {
        self.snapshot.delta_manifest_list_size = size;
        self
    }

    pub fn with_commit_user(mut self, user: impl Into<String>) -> Self {
        self.snapshot.commit_user = user.into();
        self
    }

    pub fn with_commit_identifier(mut self, identifier: i64) -> Self {
        self.snapshot.commit_identifier = identifier;
        self
    }

    pub fn with_commit_kind(mut self, kind: CommitKind) -> Self {
        self.snapshot.commit_kind = kind;
        self
    }

    pub fn with_time_millis(mut self, time_millis: i64) -> Self {
        self.snapshot.time_millis = time_millis;
        self
    }

    pub fn with_record_counts(mut self, total: i64, delta: i64) -> Self {
        self.snapshot.total_record_count = total;
        self.snapshot.delta_record_count = delta;
        self
    }

    pub fn with_watermark(mut self, watermark: i64) -> Self {
        self.snapshot.watermark = watermark;
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}
