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

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::types::{DataField, DataType};
use super::values::Row;
use crate::error::{PaimonError, PaimonResult};

pub const SCHEMA_VERSION: i32 = 3;

/// An immutable table schema, serialized as `schema/schema-<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub version: i32,
    pub id: i64,
    pub fields: Vec<DataField>,
    pub highest_field_id: i32,
    pub partition_keys: Vec<String>,
    pub primary_keys: Vec<String>,
    pub options: BTreeMap<String, String>,
    pub comment: Option<String>,
    pub time_millis: i64,
}

impl TableSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn primary_key_indices(&self) -> Vec<usize> {
        self.key_indices(&self.primary_keys)
    }

    pub fn partition_key_indices(&self) -> Vec<usize> {
        self.key_indices(&self.partition_keys)
    }

    fn key_indices(&self, keys: &[String]) -> Vec<usize> {
        keys.iter().filter_map(|k| self.field_index(k)).collect()
    }

    /// Checks the arity and the value types of a row against the fields.
    pub fn validate_row(&self, row: &Row) -> PaimonResult<()> {
        if row.len() != self.fields.len() {
            return Err(PaimonError::invalid(format!(
                "row has {} values but the schema has {} fields",
                row.len(),
                self.fields.len()
            )));
        }
        for (value, field) in row.iter().zip(&self.fields) {
            if !value.matches(&field.data_type) {
                return Err(PaimonError::invalid(format!(
                    "value {value} does not match field {} of type {}",
                    field.name,
                    field.data_type.type_name()
                )));
            }
        }
        Ok(())
    }

    pub fn to_json_bytes(&self) -> PaimonResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| PaimonError::json("schema", e))
    }

    pub fn from_json_slice(bytes: &[u8]) -> PaimonResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| PaimonError::json("schema", e))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    id: i64,
    fields: Vec<DataField>,
    partition_keys: Vec<String>,
    primary_keys: Vec<String>,
    options: BTreeMap<String, String>,
    comment: Option<String>,
    time_millis: Option<i64>,
}

impl SchemaBuilder {
    pub fn with_schema_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Adds a field with an explicit id.
    pub fn with_field(mut self, field: DataField) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a field whose id is one above every id assigned so far.
    pub fn with_column(self, name: impl Into<String>, data_type: DataType) -> Self {
        let id = highest_field_id(&self.fields).map_or(0, |id| id + 1);
        self.with_field(DataField::new(id, name, data_type))
    }

    pub fn with_primary_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_partition_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_time_millis(mut self, time_millis: i64) -> Self {
        self.time_millis = Some(time_millis);
        self
    }

    pub fn build(self) -> PaimonResult<TableSchema> {
        let Self {
            id,
            mut fields,
            partition_keys,
            primary_keys,
            options,
            comment,
            time_millis,
        } = self;

        if id < 0 {
            return Err(PaimonError::invalid(format!("negative schema id: {id}")));
        }
        if fields.is_empty() {
            return Err(PaimonError::invalid("schema has no fields"));
        }
        let mut names = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(PaimonError::invalid("empty field name"));
            }
            if !names.insert(field.name.as_str()) {
                return Err(PaimonError::invalid(format!(
                    "duplicate field name: {}",
                    field.name
                )));
            }
        }
        let mut ids = HashSet::new();
        for id in all_field_ids(&fields) {
            if id < 0 {
                return Err(PaimonError::invalid(format!("negative field id: {id}")));
            }
            if !ids.insert(id) {
                return Err(PaimonError::invalid(format!("duplicate field id: {id}")));
            }
        }
        check_keys("primary", &primary_keys, &fields)?;
        check_keys("partition", &partition_keys, &fields)?;

        for field in fields.iter_mut() {
            if primary_keys.contains(&field.name) {
                field.data_type = field.data_type.clone().not_null();
            }
        }
        let highest_field_id = highest_field_id(&fields).unwrap_or(0);

        Ok(TableSchema {
            version: SCHEMA_VERSION,
            id,
            fields,
            highest_field_id,
            partition_keys,
            primary_keys,
            options,
            comment,
            time_millis: time_millis.unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        })
    }
}

fn all_field_ids(fields: &[DataField]) -> Vec<i32> {
    let mut ids = vec![];
    for field in fields {
        ids.push(field.id);
        field.data_type.nested_field_ids(&mut ids);
    }
    ids
}

fn highest_field_id(fields: &[DataField]) -> Option<i32> {
    all_field_ids(fields).into_iter().max()
}

fn check_keys(kind: &str, keys: &[String], fields: &[DataField]) -> PaimonResult<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.as_str()) {
            return Err(PaimonError::invalid(format!("duplicate {kind} key: {key}")));
        }
        let field = fields
            .iter()
            .find(|f| &f.name == key)
            .ok_or_else(|| PaimonError::invalid(format!("unknown {kind} key: {key}")))?;
        if field.data_type.as_primitive().is_none() {
            return Err(PaimonError::invalid(format!(
                "{kind} key {key} must have a primitive type"
            )));
        }
    }
    Ok(())
}
