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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::values::Datum;

/// Min, max and null count of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub min: Value,
    pub max: Value,
    pub null_count: i64,
}

/// Column statistics as stored in `_KEY_STATS` and `_VALUE_STATS`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleStats {
    pub col_names: Vec<String>,
    pub col_stats: Vec<ColumnStats>,
}

impl SimpleStats {
    pub fn get(&self, name: &str) -> Option<&ColumnStats> {
        self.col_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.col_stats.get(i))
    }
}

/// Partition statistics of a manifest, as stored in `_PARTITION_STATS`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionStats {
    pub col_names: Vec<String>,
    pub col_stats: Vec<ColumnStats>,
    pub null_count: i64,
}

#[derive(Debug, Clone, Default)]
struct ColumnAccumulator {
    min: Option<Datum>,
    max: Option<Datum>,
    null_count: i64,
}

impl ColumnAccumulator {
    fn update(&mut self, value: &Datum) {
        if value.is_null() {
            self.null_count += 1;
            return;
        }
        // NaN and infinities have no JSON number form.
        if matches!(value, Datum::Double(v) if !v.is_finite()) {
            return;
        }
        if self
            .min
            .as_ref()
            .is_none_or(|m| value.compare(m) == Some(Ordering::Less))
        {
            self.min = Some(value.clone());
        }
        if self
            .max
            .as_ref()
            .is_none_or(|m| value.compare(m) == Some(Ordering::Greater))
        {
            self.max = Some(value.clone());
        }
    }

    fn finish(self) -> ColumnStats {
        // Nested values have no order, so they never produce bounds.
        let bound = |d: Option<Datum>| match d {
            Some(d) if d.compare(&d).is_some() => d.to_json(),
            _ => Value::Null,
        };
        ColumnStats {
            min: bound(self.min),
            max: bound(self.max),
            null_count: self.null_count,
        }
    }
}

/// Collects per-column statistics over rows projected to a set of columns.
#[derive(Debug, Clone)]
pub struct StatsCollector {
    names: Vec<String>,
    columns: Vec<ColumnAccumulator>,
}

impl StatsCollector {
    pub fn new(names: Vec<String>) -> Self {
        let columns = vec![ColumnAccumulator::default(); names.len()];
        Self { names, columns }
    }

    /// Adds one row whose values are aligned with the collector's columns.
    pub fn update<'a>(&mut self, values: impl IntoIterator<Item = &'a Datum>) {
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.update(value);
        }
    }

    pub fn total_null_count(&self) -> i64 {
        self.columns.iter().map(|c| c.null_count).sum()
    }

    pub fn finish(self) -> SimpleStats {
        SimpleStats {
            col_names: self.names,
            col_stats: self.columns.into_iter().map(|c| c.finish()).collect(),
        }
    }

    pub fn finish_partition(self) -> PartitionStats {
        let null_count = self.total_null_count();
        let SimpleStats {
            col_names,
            col_stats,
        } = self.finish();
        PartitionStats {
            col_names,
            col_stats,
            null_count,
        }
    }
}
