use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

const DEFAULT_CONFIG: &str = include_str!("default.toml");

/// The environment variable prefix for configuration overrides.
/// A double underscore separates nested keys, e.g. `LAKEFORGE__WAREHOUSE__PATH`.
pub const CONFIG_ENV_PREFIX: &str = "LAKEFORGE__";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub warehouse: WarehouseConfig,
    pub commit: CommitConfig,
    pub write: WriteConfig,
    pub generator: GeneratorConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> CommonResult<Self> {
        Self::from_figment(
            Figment::from(Toml::string(DEFAULT_CONFIG)).admerge(
                Env::prefixed(CONFIG_ENV_PREFIX).map(|p| p.as_str().replace("__", ".").into()),
            ),
        )
    }

    /// Loads the configuration with the embedded defaults only,
    /// ignoring the process environment.
    pub fn load_defaults() -> CommonResult<Self> {
        Self::from_figment(Figment::from(Toml::string(DEFAULT_CONFIG)))
    }

    fn from_figment(figment: Figment) -> CommonResult<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| CommonError::InvalidArgument(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CommonResult<()> {
        if self.warehouse.path.as_os_str().is_empty() {
            return Err(CommonError::missing("warehouse.path"));
        }
        if self.commit.user.trim().is_empty() {
            return Err(CommonError::missing("commit.user"));
        }
        if self.commit.identifier < 0 {
            return Err(CommonError::invalid(format!(
                "commit.identifier must not be negative: {}",
                self.commit.identifier
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    pub user: String,
    pub identifier: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteConfig {
    pub file_format: FileFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Orc,
    Parquet,
    Avro,
}

impl FileFormat {
    /// The file name suffix used for data files of this format.
    pub const fn extension(self) -> &'static str {
        match self {
            FileFormat::Orc => "orc",
            FileFormat::Parquet => "parquet",
            FileFormat::Avro => "avro",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Abort the whole run on the first table that fails to generate.
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// The log filter used when `RUST_LOG` is not set.
    pub log_level: String,
}
