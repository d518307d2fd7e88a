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
use std::sync::Arc;

use lakeforge_common::config::{AppConfig, FileFormat};
use log::{debug, error, info};

use super::table_writer::{CommitOptions, TableWriter};
use super::{GenerationState, GenerationStep};
use crate::error::{PaimonError, PaimonResult};
use crate::io::{
    schema_file_name, validate_table_name, write_new_file, IdentifierGenerator, PathFactory,
    TableDirectories, UuidIdentifierGenerator, LATEST,
};
use crate::spec::{Row, TableSchema};

/// A table to generate: its schema and the rows of each commit, in commit order.
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub name: String,
    pub schema: TableSchema,
    pub commits: Vec<Vec<Row>>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, schema: TableSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            commits: vec![],
        }
    }

    pub fn with_commit(mut self, rows: Vec<Row>) -> Self {
        self.commits.push(rows);
        self
    }

    fn validate(&self) -> PaimonResult<()> {
        validate_table_name(&self.name)?;
        if self.commits.is_empty() {
            return Err(PaimonError::invalid("no commits to write"));
        }
        for rows in &self.commits {
            if rows.is_empty() {
                return Err(PaimonError::invalid("a commit must contain at least one row"));
            }
            for row in rows {
                self.schema.validate_row(row)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub commit: CommitOptions,
    pub file_format: FileFormat,
    pub fail_fast: bool,
}

impl From<&AppConfig> for GeneratorOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            commit: CommitOptions {
                commit_user: config.commit.user.clone(),
                commit_identifier: config.commit.identifier,
            },
            file_format: config.write.file_format,
            fail_fast: config.generator.fail_fast,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub table: String,
    pub path: PathBuf,
    pub snapshot_ids: Vec<i64>,
    pub data_files: usize,
    pub total_record_count: i64,
    pub final_state: GenerationState,
}

/// The outcome of generating several tables.
#[derive(Debug, Default)]
pub struct GenerationSummary {
    pub reports: Vec<GenerationReport>,
    pub failures: Vec<PaimonError>,
    /// Tables not attempted because an earlier table failed in fail-fast mode.
    pub skipped: Vec<String>,
}

impl GenerationSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }
}

/// Builds tables under a warehouse root.
pub struct TableGenerator {
    warehouse: PathBuf,
    options: GeneratorOptions,
    identifiers: Arc<dyn IdentifierGenerator>,
}

impl TableGenerator {
    pub fn new(warehouse: impl Into<PathBuf>, options: GeneratorOptions) -> Self {
        Self {
            warehouse: warehouse.into(),
            options,
            identifiers: Arc::new(UuidIdentifierGenerator),
        }
    }

    pub fn with_identifier_generator(mut self, identifiers: Arc<dyn IdentifierGenerator>) -> Self {
        self.identifiers = identifiers;
        self
    }

    pub fn warehouse(&self) -> &Path {
        &self.warehouse
    }

    /// Generates one table. Files written before a failure are left in place.
    pub fn generate(&self, table: &TableDefinition) -> PaimonResult<GenerationReport> {
        let name = table.name.as_str();
        let at = |step: GenerationStep| move |e: PaimonError| e.at(name, step);

        table.validate().map_err(at(GenerationStep::Validate))?;
        self.check_absent(name, table.schema.id).map_err(at(GenerationStep::Validate))?;
        debug!("{name}: generating under {}", self.warehouse.display());

        let dirs = TableDirectories::create(&self.warehouse, name)
            .map_err(at(GenerationStep::CreateDirectories))?;
        debug!(
            "{name}: {} -> {}",
            GenerationState::Start,
            GenerationState::DirsCreated
        );

        let path_factory = PathFactory::new(self.identifiers.clone(), self.options.file_format);
        let mut writer = TableWriter::new(
            name,
            &dirs,
            &table.schema,
            &path_factory,
            &self.options.commit,
        );
        let mut snapshot_ids = vec![];
        let mut data_files = 0;
        for rows in &table.commits {
            let result = writer.commit(rows)?;
            snapshot_ids.push(result.snapshot.id);
            data_files += result.data_files.len();
        }

        let schema_path = dirs.schema.join(schema_file_name(table.schema.id));
        table
            .schema
            .to_json_bytes()
            .and_then(|bytes| write_new_file(&schema_path, &bytes))
            .map_err(at(GenerationStep::WriteSchema))?;
        debug!(
            "{name}: {} -> {}",
            writer.state(),
            GenerationState::SchemaWritten
        );

        info!(
            "generated table {name} with {} snapshot(s) and {} record(s)",
            snapshot_ids.len(),
            writer.total_record_count()
        );
        Ok(GenerationReport {
            table: name.to_string(),
            path: dirs.table.clone(),
            snapshot_ids,
            data_files,
            total_record_count: writer.total_record_count(),
            final_state: GenerationState::SchemaWritten,
        })
    }

    /// Generates tables one after another. Depending on `fail_fast`, a
    /// failing table either stops the run or is recorded and skipped.
    pub fn generate_all(&self, tables: &[TableDefinition]) -> GenerationSummary {
        let mut summary = GenerationSummary::default();
        for (i, table) in tables.iter().enumerate() {
            match self.generate(table) {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    error!("{e}");
                    summary.failures.push(e);
                    if self.options.fail_fast {
                        summary.skipped = tables[i + 1..].iter().map(|t| t.name.clone()).collect();
                        break;
                    }
                }
            }
        }
        summary
    }

    fn check_absent(&self, table: &str, schema_id: i64) -> PaimonResult<()> {
        let dirs = TableDirectories::locate(&self.warehouse, table)?;
        if dirs.snapshot.join(LATEST).exists()
            || dirs.schema.join(schema_file_name(schema_id)).exists()
        {
            return Err(PaimonError::TableAlreadyExists(dirs.table));
        }
        Ok(())
    }
}
