use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lakeforge_common::config::AppConfig;
use lakeforge_paimon::{list_tables, verify_table, GeneratorOptions, TableGenerator};
use lakeforge_telemetry::{init_telemetry, shutdown_telemetry};
use log::{error, info, warn};

use crate::tables::{demo_tables, DEMO_TABLE_NAMES};

#[derive(Parser)]
#[command(version, name = "lakeforge")]
#[command(about = "Generate and verify Paimon-style tables on a local filesystem")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the built-in demo tables
    Generate {
        /// Warehouse root, overriding `warehouse.path`
        #[arg(long)]
        warehouse: Option<PathBuf>,
        /// Generate only the named table (repeatable)
        #[arg(long = "table", value_name = "NAME")]
        tables: Vec<String>,
        /// Stop at the first table that fails
        #[arg(long)]
        fail_fast: bool,
    },
    /// Check every table of a warehouse for consistency
    Verify {
        /// Warehouse root, overriding `warehouse.path`
        #[arg(long)]
        warehouse: Option<PathBuf>,
    },
    /// List the built-in demo tables
    List,
}

pub fn main(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_from(args);
    let config = AppConfig::load()?;
    init_telemetry(&config.telemetry)?;
    let result = run(cli.command, config);
    shutdown_telemetry();
    result
}

fn run(command: Command, mut config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Generate {
            warehouse,
            tables,
            fail_fast,
        } => {
            if let Some(warehouse) = warehouse {
                config.warehouse.path = warehouse;
            }
            config.generator.fail_fast |= fail_fast;
            generate(&config, &tables)
        }
        Command::Verify { warehouse } => {
            let warehouse = warehouse.unwrap_or(config.warehouse.path);
            verify(&warehouse)
        }
        Command::List => {
            for name in DEMO_TABLE_NAMES {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn generate(config: &AppConfig, names: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut tables = demo_tables()?;
    if !names.is_empty() {
        if let Some(unknown) = names
            .iter()
            .find(|n| !DEMO_TABLE_NAMES.contains(&n.as_str()))
        {
            return Err(format!("unknown table: {unknown}").into());
        }
        tables.retain(|t| names.contains(&t.name));
    }

    let generator = TableGenerator::new(&config.warehouse.path, GeneratorOptions::from(config));
    info!(
        "generating {} table(s) under {}",
        tables.len(),
        generator.warehouse().display()
    );
    let summary = generator.generate_all(&tables);
    for report in &summary.reports {
        println!(
            "{}: {} snapshot(s), {} record(s) at {}",
            report.table,
            report.snapshot_ids.len(),
            report.total_record_count,
            report.path.display()
        );
    }
    for name in &summary.skipped {
        warn!("skipped table {name}");
    }
    if summary.is_success() {
        Ok(())
    } else {
        Err(format!(
            "{} table(s) failed, {} skipped",
            summary.failures.len(),
            summary.skipped.len()
        )
        .into())
    }
}

fn verify(warehouse: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let tables = list_tables(warehouse)?;
    let mut failures = 0;
    for table in &tables {
        match verify_table(warehouse, table) {
            Ok(report) => println!(
                "{table}: ok ({} snapshot(s), {} manifest(s), {} data file(s), {} record(s))",
                report.snapshot_ids.len(),
                report.manifests,
                report.data_files,
                report.total_record_count
            ),
            Err(e) => {
                error!("{table}: {e}");
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(format!("{failures} of {} table(s) failed verification", tables.len()).into());
    }
    Ok(())
}
