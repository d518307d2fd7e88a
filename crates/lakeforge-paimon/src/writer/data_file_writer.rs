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

use serde_json::Value;

use crate::error::{PaimonError, PaimonResult};
use crate::io::{write_new_file, PathFactory};
use crate::spec::{Datum, Row, TableSchema};

const HEADER_PREFIX: char = '#';

/// A data file on disk, as reported back to the manifest writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDataFile {
    /// Path relative to the table root.
    pub file_name: String,
    pub file_size: i64,
    pub row_count: i64,
}

/// Writes placeholder data files: a commented header followed by one JSON
/// array per row. The payload is readable for debugging but is not a
/// columnar encoding.
pub struct DataFileWriter<'a> {
    table: &'a str,
    schema: &'a TableSchema,
    path_factory: &'a PathFactory,
}

impl<'a> DataFileWriter<'a> {
    pub fn new(table: &'a str, schema: &'a TableSchema, path_factory: &'a PathFactory) -> Self {
        Self {
            table,
            schema,
            path_factory,
        }
    }

    /// Writes all rows of one bucket into a single shard.
    pub fn write(
        &self,
        bucket_dir: &Path,
        bucket_relative: &str,
        rows: &[Row],
    ) -> PaimonResult<WrittenDataFile> {
        let file_name = self.path_factory.data_file_name(0);
        let bytes = self.encode(rows)?;
        let file_size = write_new_file(&bucket_dir.join(&file_name), &bytes)?;
        Ok(WrittenDataFile {
            file_name: format!("{bucket_relative}/{file_name}"),
            file_size,
            row_count: rows.len() as i64,
        })
    }

    fn encode(&self, rows: &[Row]) -> PaimonResult<Vec<u8>> {
        let to_json = |value: &Value| {
            serde_json::to_string(value).map_err(|e| PaimonError::json("data file", e))
        };
        // Names are written as JSON so that every header stays on one line.
        let table = to_json(&Value::String(self.table.to_string()))?;
        let columns = to_json(&Value::Array(
            self.schema
                .field_names()
                .into_iter()
                .map(Value::String)
                .collect(),
        ))?;
        let format = self.path_factory.format().extension();
        let mut out = [
            format!("{HEADER_PREFIX} placeholder {format} data file"),
            format!("{HEADER_PREFIX} table: {table}"),
            format!("{HEADER_PREFIX} schema: {}", self.schema.id),
            format!("{HEADER_PREFIX} columns: {columns}"),
            format!("{HEADER_PREFIX} rows: {}", rows.len()),
        ]
        .join("\n");
        out.push('\n');
        for row in rows {
            out.push_str(&to_json(&Value::Array(
                row.iter().map(Datum::to_json).collect(),
            ))?);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// Counts the rows of a payload produced by [`DataFileWriter`].
pub fn count_payload_rows(bytes: &[u8]) -> PaimonResult<i64> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| PaimonError::invariant(format!("data file is not UTF-8: {e}")))?;
    Ok(text
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with(HEADER_PREFIX))
        .count() as i64)
}
