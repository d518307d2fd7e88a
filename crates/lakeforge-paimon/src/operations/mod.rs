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

use std::fmt;

mod commit;
mod generator;
mod table_writer;

pub use commit::*;
pub use generator::*;
pub use table_writer::*;

/// States of the per-table generation state machine, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GenerationState {
    Start,
    DirsCreated,
    DataWritten,
    ManifestWritten,
    ManifestListWritten,
    SnapshotWritten,
    SchemaWritten,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationState::Start => "START",
            GenerationState::DirsCreated => "DIRS_CREATED",
            GenerationState::DataWritten => "DATA_WRITTEN",
            GenerationState::ManifestWritten => "MANIFEST_WRITTEN",
            GenerationState::ManifestListWritten => "MANIFEST_LIST_WRITTEN",
            GenerationState::SnapshotWritten => "SNAPSHOT_WRITTEN",
            GenerationState::SchemaWritten => "SCHEMA_WRITTEN",
        };
        write!(f, "{name}")
    }
}

/// The step that moves the state machine out of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStep {
    Validate,
    CreateDirectories,
    WriteData,
    WriteManifest,
    WriteManifestList,
    WriteSnapshot,
    WriteSchema,
}

impl GenerationStep {
    /// The state reached when the step succeeds.
    pub fn target(self) -> GenerationState {
        match self {
            GenerationStep::Validate => GenerationState::Start,
            GenerationStep::CreateDirectories => GenerationState::DirsCreated,
            GenerationStep::WriteData => GenerationState::DataWritten,
            GenerationStep::WriteManifest => GenerationState::ManifestWritten,
            GenerationStep::WriteManifestList => GenerationState::ManifestListWritten,
            GenerationStep::WriteSnapshot => GenerationState::SnapshotWritten,
            GenerationStep::WriteSchema => GenerationState::SchemaWritten,
        }
    }
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationStep::Validate => "validating the table definition",
            GenerationStep::CreateDirectories => "creating directories",
            GenerationStep::WriteData => "writing data files",
            GenerationStep::WriteManifest => "writing the manifest",
            GenerationStep::WriteManifestList => "writing manifest lists",
            GenerationStep::WriteSnapshot => "writing the snapshot",
            GenerationStep::WriteSchema => "writing the schema",
        };
        write!(f, "{name}")
    }
}
