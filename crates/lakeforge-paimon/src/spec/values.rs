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
use std::fmt;

use chrono::{DateTime, NaiveDate};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use super::types::{DataType, PrimitiveType};

/// Directory name used for a null partition value.
pub const DEFAULT_PARTITION_NAME: &str = "__DEFAULT_PARTITION__";

const RFC3986_PART: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A single typed value of a table row.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int(i32),
    BigInt(i64),
    Double(f64),
    String(String),
    /// Days since the Unix epoch.
    Date(i32),
    Array(Vec<Datum>),
    Map(Vec<(Datum, Datum)>),
    Row(Vec<Datum>),
}

/// A table row, positionally aligned with the schema fields.
pub type Row = Vec<Datum>;

impl Datum {
    pub fn string(value: impl Into<String>) -> Self {
        Datum::String(value.into())
    }

    /// Builds a `Date` value from a calendar date.
    pub fn date(year: i32, month: u32, day: u32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
        let days = date.signed_duration_since(epoch).num_days();
        i32::try_from(days).ok().map(Datum::Date)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Returns whether the value can be stored in a column of the given type.
    pub fn matches(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Datum::Null, data_type) => data_type.is_nullable(),
            (Datum::Boolean(_), DataType::Primitive { primitive, .. }) => {
                *primitive == PrimitiveType::Boolean
            }
            (Datum::Int(_), DataType::Primitive { primitive, .. }) => {
                *primitive == PrimitiveType::Int
            }
            (Datum::BigInt(_), DataType::Primitive { primitive, .. }) => {
                *primitive == PrimitiveType::BigInt
            }
            (Datum::Double(_), DataType::Primitive { primitive, .. }) => {
                *primitive == PrimitiveType::Double
            }
            (Datum::String(_), DataType::Primitive { primitive, .. }) => {
                *primitive == PrimitiveType::String
            }
            (Datum::Date(_), DataType::Primitive { primitive, .. }) => {
                *primitive == PrimitiveType::Date
            }
            (Datum::Array(values), DataType::Array { element, .. }) => {
                values.iter().all(|v| v.matches(element))
            }
            (Datum::Map(entries), DataType::Map { key, value, .. }) => entries
                .iter()
                .all(|(k, v)| !k.is_null() && k.matches(key) && v.matches(value)),
            (Datum::Row(values), DataType::Row { fields, .. }) => {
                values.len() == fields.len()
                    && values
                        .iter()
                        .zip(fields)
                        .all(|(v, f)| v.matches(&f.data_type))
            }
            _ => false,
        }
    }

    /// Orders two non-null primitive values of the same type.
    /// Returns `None` for nulls, nested values, or mismatched types.
    pub fn compare(&self, other: &Datum) -> Option<Ordering> {
        match (self, other) {
            (Datum::Boolean(a), Datum::Boolean(b)) => Some(a.cmp(b)),
            (Datum::Int(a), Datum::Int(b)) => Some(a.cmp(b)),
            (Datum::BigInt(a), Datum::BigInt(b)) => Some(a.cmp(b)),
            (Datum::Double(a), Datum::Double(b)) => Some(a.total_cmp(b)),
            (Datum::String(a), Datum::String(b)) => Some(a.cmp(b)),
            (Datum::Date(a), Datum::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// The JSON form used in metadata files and data payloads.
    pub fn to_json(&self) -> Value {
        match self {
            Datum::Null => Value::Null,
            Datum::Boolean(v) => Value::Bool(*v),
            Datum::Int(v) => Value::Number((*v).into()),
            Datum::BigInt(v) => Value::Number((*v).into()),
            Datum::Double(v) => number_from_f64(*v),
            Datum::String(v) => Value::String(v.clone()),
            Datum::Date(days) => Value::String(format_date(*days)),
            Datum::Array(values) => Value::Array(values.iter().map(Datum::to_json).collect()),
            Datum::Map(entries) => Value::Array(
                entries
                    .iter()
                    .map(|(k, v)| Value::Array(vec![k.to_json(), v.to_json()]))
                    .collect(),
            ),
            Datum::Row(values) => Value::Array(values.iter().map(Datum::to_json).collect()),
        }
    }

    /// The escaped form used as the value part of a `key=value` partition directory.
    pub fn to_partition_path_value(&self) -> String {
        if self.is_null() {
            return DEFAULT_PARTITION_NAME.to_string();
        }
        utf8_percent_encode(&self.to_string(), RFC3986_PART).to_string()
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "null"),
            Datum::Boolean(v) => write!(f, "{v}"),
            Datum::Int(v) => write!(f, "{v}"),
            Datum::BigInt(v) => write!(f, "{v}"),
            Datum::Double(v) => write!(f, "{v}"),
            Datum::String(v) => write!(f, "{v}"),
            Datum::Date(days) => write!(f, "{}", format_date(*days)),
            Datum::Array(_) | Datum::Map(_) | Datum::Row(_) => write!(f, "{}", self.to_json()),
        }
    }
}

fn format_date(days: i32) -> String {
    DateTime::from_timestamp(days as i64 * 24 * 3600, 0)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| days.to_string())
}

fn number_from_f64(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}
