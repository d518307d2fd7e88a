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

mod data_file_writer;
mod manifest_list_writer;
mod manifest_writer;

pub use data_file_writer::*;
pub use manifest_list_writer::*;
pub use manifest_writer::*;

/// Hands out contiguous sequence number ranges across all manifests of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter {
    next: i64,
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SequenceCounter {
    /// Reserves `count` numbers and returns the inclusive range.
    /// An empty reservation yields `(next, next - 1)` and does not advance.
    pub fn reserve(&mut self, count: i64) -> (i64, i64) {
        let min = self.next;
        self.next += count;
        (min, self.next - 1)
    }

    pub fn peek(&self) -> i64 {
        self.next
    }
}
