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

use super::stats::SimpleStats;

/// How a data file came into existence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoPrimitive, TryFromPrimitive,
)]
#[serde(into = "i8", try_from = "i8")]
#[repr(i8)]
pub enum FileSource {
    Append = 0,
    Compact = 1,
}

/// Metadata of one data file, stored as the `_FILE` member of a manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFileMeta {
    /// Path relative to the table root.
    #[serde(rename = "_FILE_NAME")]
    pub file_name: String,
    #[serde(rename = "_FILE_SIZE")]
    pub file_size: i64,
    #[serde(rename = "_ROW_COUNT")]
    pub row_count: i64,
    #[serde(rename = "_MIN_KEY")]
    pub min_key: Vec<Value>,
    #[serde(rename = "_MAX_KEY")]
    pub max_key: Vec<Value>,
    #[serde(rename = "_KEY_STATS")]
    pub key_stats: SimpleStats,
    #[serde(rename = "_VALUE_STATS")]
    pub value_stats: SimpleStats,
    #[serde(rename = "_MIN_SEQUENCE_NUMBER")]
    pub min_sequence_number: i64,
    #[serde(rename = "_MAX_SEQUENCE_NUMBER")]
    pub max_sequence_number: i64,
    #[serde(rename = "_SCHEMA_ID")]
    pub schema_id: i64,
    #[serde(rename = "_LEVEL")]
    pub level: i32,
    #[serde(rename = "_EXTRA_FILES")]
    pub extra_files: Vec<String>,
    #[serde(rename = "_CREATION_TIME")]
    pub creation_time: Option<i64>,
    #[serde(rename = "_DELETE_ROW_COUNT")]
    pub delete_row_count: Option<i64>,
    #[serde(rename = "_EMBEDDED_FILE_INDEX")]
    pub embedded_file_index: Option<Vec<u8>>,
    #[serde(rename = "_FILE_SOURCE")]
    pub file_source: Option<FileSource>,
    #[serde(rename = "_VALUE_STATS_COLS")]
    pub value_stats_cols: Option<Vec<String>>,
    #[serde(rename = "_EXTERNAL_PATH")]
    pub external_path: Option<String>,
    #[serde(rename = "_FIRST_ROW_ID")]
    pub first_row_id: Option<i64>,
    #[serde(rename = "_WRITE_COLS")]
    pub write_cols: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_file_source_is_numeric() {
        assert_eq!(serde_json::to_value(FileSource::Append).unwrap(), json!(0));
        assert_eq!(
            serde_json::from_value::<FileSource>(json!(1)).unwrap(),
            FileSource::Compact
        );
        assert!(serde_json::from_value::<FileSource>(json!(7)).is_err());
    }

    #[test]
    fn test_data_file_meta_keys() {
        let meta = DataFileMeta {
            file_name: "bucket-0/data-x-0.orc".to_string(),
            file_size: 10,
            row_count: 1,
            min_key: vec![],
            max_key: vec![],
            key_stats: SimpleStats::default(),
            value_stats: SimpleStats::default(),
            min_sequence_number: 1,
            max_sequence_number: 1,
            schema_id: 0,
            level: 0,
            extra_files: vec![],
            creation_time: Some(0),
            delete_row_count: Some(0),
            embedded_file_index: None,
            file_source: Some(FileSource::Append),
            value_stats_cols: None,
            external_path: None,
            first_row_id: None,
            write_cols: None,
        };
        let value = serde_json::to_value(&meta).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 20);
        assert!(keys.iter().all(|k| k.starts_with('_')));
        assert_eq!(value["_EXTERNAL_PATH"], json!(null));
        assert_eq!(value["_FILE_SOURCE"], json!(0));
    }
}
