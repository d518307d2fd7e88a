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

use std::path::Path;

use super::manifest_writer::WrittenManifest;
use crate::error::PaimonResult;
use crate::io::{write_new_file, PathFactory};
use crate::spec::{FileKind, ManifestFileMeta, ManifestList, StatsCollector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenManifestList {
    /// Path relative to the table root.
    pub file_name: String,
    pub file_size: i64,
}

/// Summarizes a written manifest for inclusion in a manifest list.
pub fn manifest_file_meta(manifest: &WrittenManifest, partition_keys: &[String]) -> ManifestFileMeta {
    let count = |kind: FileKind| {
        manifest
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .count() as i64
    };
    let mut partition_stats = StatsCollector::new(partition_keys.to_vec());
    for partition in &manifest.partitions {
        partition_stats.update(partition);
    }
    let buckets = manifest.entries.iter().map(|e| e.bucket);
    let levels = manifest.entries.iter().map(|e| e.file.level);
    ManifestFileMeta {
        file_name: manifest.file_name.clone(),
        file_size: manifest.file_size,
        num_added_files: count(FileKind::Add),
        num_deleted_files: count(FileKind::Delete),
        partition_stats: partition_stats.finish_partition(),
        schema_id: manifest.schema_id,
        min_bucket: buckets.clone().min(),
        max_bucket: buckets.max(),
        min_level: levels.clone().min(),
        max_level: levels.max(),
    }
}

pub struct ManifestListWriter<'a> {
    path_factory: &'a PathFactory,
}

impl<'a> ManifestListWriter<'a> {
    pub fn new(path_factory: &'a PathFactory) -> Self {
        Self { path_factory }
    }

    pub fn write(
        &self,
        manifest_dir: &Path,
        entries: Vec<ManifestFileMeta>,
    ) -> PaimonResult<WrittenManifestList> {
        let list = ManifestList::new(entries);
        let file_name = self.path_factory.manifest_list_file_name();
        let file_size = write_new_file(&manifest_dir.join(&file_name), &list.to_json_bytes()?)?;
        Ok(WrittenManifestList {
            file_name: PathFactory::manifest_path(&file_name),
            file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use std::sync::Arc;

    use lakeforge_common::config::FileFormat;
    use serde_json::json;

    use super::*;
    use crate::io::{read_file, UuidIdentifierGenerator};
    use crate::spec::{DataFileMeta, Datum, ManifestEntry, SimpleStats};

    fn entry(kind: FileKind, bucket: i32, level: i32) -> ManifestEntry {
        ManifestEntry::new(
            kind,
            vec![],
            bucket,
            2,
            DataFileMeta {
                file_name: "bucket-0/data-x-0.orc".to_string(),
                file_size: 1,
                row_count: 1,
                min_key: vec![],
                max_key: vec![],
                key_stats: SimpleStats::default(),
                value_stats: SimpleStats::default(),
                min_sequence_number: 1,
                max_sequence_number: 1,
                schema_id: 0,
                level,
                extra_files: vec![],
                creation_time: None,
                delete_row_count: None,
                embedded_file_index: None,
                file_source: None,
                value_stats_cols: None,
                external_path: None,
                first_row_id: None,
                write_cols: None,
            },
        )
    }

    #[test]
    fn test_manifest_file_meta_aggregates_entries() {
        let manifest = WrittenManifest {
            file_name: "manifest/manifest-a-0.json".to_string(),
            file_size: 321,
            schema_id: 0,
            entries: vec![
                entry(FileKind::Add, 1, 0),
                entry(FileKind::Add, 0, 2),
                entry(FileKind::Delete, 1, 1),
            ],
            partitions: vec![
                vec![Datum::date(2024, 1, 3).unwrap()],
                vec![Datum::date(2024, 1, 1).unwrap()],
                vec![Datum::Null],
            ],
        };
        let meta = manifest_file_meta(&manifest, &["order_date".to_string()]);
        assert_eq!(meta.num_added_files, 2);
        assert_eq!(meta.num_deleted_files, 1);
        assert_eq!((meta.min_bucket, meta.max_bucket), (Some(0), Some(1)));
        assert_eq!((meta.min_level, meta.max_level), (Some(0), Some(2)));
        assert_eq!(meta.file_size, 321);
        assert_eq!(
            serde_json::to_value(&meta.partition_stats).unwrap(),
            json!({
                "colNames": ["order_date"],
                "colStats": [{"min": "2024-01-01", "max": "2024-01-03", "nullCount": 1}],
                "nullCount": 1
            })
        );
    }

    #[test]
    fn test_write_manifest_list() {
        let dir = tempfile::tempdir().unwrap();
        let factory = PathFactory::new(Arc::new(UuidIdentifierGenerator), FileFormat::Orc);
        let manifest = WrittenManifest {
            file_name: "manifest/manifest-a-0.json".to_string(),
            file_size: 10,
            schema_id: 0,
            entries: vec![entry(FileKind::Add, 0, 0)],
            partitions: vec![vec![]],
        };
        let written = ManifestListWriter::new(&factory)
            .write(dir.path(), vec![manifest_file_meta(&manifest, &[])])
            .unwrap();
        assert!(written.file_name.starts_with("manifest/manifest-list-"));
        let local = written.file_name.trim_start_matches("manifest/");
        let bytes = read_file(&dir.path().join(local)).unwrap();
        assert_eq!(written.file_size, bytes.len() as i64);
        let list = ManifestList::from_json_slice(&bytes).unwrap();
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].file_name, "manifest/manifest-a-0.json");
    }
}
