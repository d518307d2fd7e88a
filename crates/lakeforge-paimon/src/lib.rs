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

//! Generates Paimon-style tables on a local filesystem: data files,
//! manifests, manifest lists, snapshots, and schemas that reference each
//! other consistently.

pub mod error;
pub mod io;
pub mod operations;
pub mod spec;
pub mod verify;
pub mod writer;

pub use error::{PaimonError, PaimonResult};
pub use operations::{GeneratorOptions, TableDefinition, TableGenerator};
pub use verify::{list_tables, verify_table, TableReport};
