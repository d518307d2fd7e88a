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

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::operations::GenerationStep;

pub type PaimonResult<T> = Result<T, PaimonError>;

#[derive(Debug, Error)]
pub enum PaimonError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("table already exists: {0}")]
    TableAlreadyExists(PathBuf),
    #[error("invariant violated: {0}")]
    Invariant(String),
    #[error("table {table} failed while {step}: {source}")]
    Generation {
        table: String,
        step: GenerationStep,
        #[source]
        source: Box<PaimonError>,
    },
}

impl PaimonError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PaimonError::InvalidArgument(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        PaimonError::Invariant(message.into())
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PaimonError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        PaimonError::Json {
            context: context.into(),
            source,
        }
    }

    /// Attaches the table name and the failing step of the generation state machine.
    pub fn at(self, table: impl Into<String>, step: GenerationStep) -> Self {
        PaimonError::Generation {
            table: table.into(),
            step,
            source: Box::new(self),
        }
    }

    /// The failing step, if the error was raised by the table generator.
    pub fn step(&self) -> Option<GenerationStep> {
        match self {
            PaimonError::Generation { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The innermost error, with generation context removed.
    pub fn root_cause(&self) -> &PaimonError {
        match self {
            PaimonError::Generation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
