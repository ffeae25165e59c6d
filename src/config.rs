use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration structure for the shopfloor stations.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ShopfloorConfig {
    /// MES gateway connection settings
    pub mes: MesConfig,
    /// Edgefold station parameters
    pub edgefold: EdgefoldConfig,
    /// Pack station parameters
    pub pack: PackConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MesConfig {
    /// Base URL of the MES REST gateway
    pub base_url: String,
    /// API key (can be set via env var)
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgefoldConfig {
    /// Workcenter key of the edgefold cell
    pub workcenter_key: String,
    /// Operation a substrate must be at to be edgefolded
    pub ready_operation: String,
    /// Operation marking a substrate as already edgefolded
    pub completed_operation: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PackConfig {
    /// Workcenter key of the pack cell
    pub workcenter_key: String,
    /// Operation a container must be at to be packed
    pub source_operation: String,
    /// Location a packed container is moved to
    pub pack_destination: String,
    /// Location an unloaded container is returned to
    pub return_destination: String,
    /// Station name stamped on printed pack labels
    pub label_station: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter (overridden by RUST_LOG)
    pub log_level: String,
    /// Emit JSON-structured logs instead of plain text
    pub json_logs: bool,
}

impl Default for MesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: None, // Read from env var when unset
            timeout_seconds: 30,
        }
    }
}

impl Default for EdgefoldConfig {
    fn default() -> Self {
        Self {
            workcenter_key: "74883".to_string(),
            ready_operation: "Waterjet".to_string(),
            completed_operation: "Edgefold".to_string(),
        }
    }
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            workcenter_key: "74895".to_string(),
            source_operation: "Assembly".to_string(),
            pack_destination: "Pack-Rivian".to_string(),
            return_destination: "RIVIAN".to_string(),
            label_station: "Pack-Rivian".to_string(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl MesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ShopfloorConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (shopfloor.toml)
    /// 3. Environment variables (prefixed with SHOPFLOOR_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("shopfloor.toml").exists() {
            builder = builder.add_source(File::with_name("shopfloor"));
        }

        builder = builder.add_source(
            Environment::with_prefix("SHOPFLOOR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut shopfloor_config: ShopfloorConfig = config.try_deserialize()?;

        // The API key usually comes from the environment rather than a
        // checked-in file.
        if shopfloor_config.mes.api_key.is_none() {
            if let Ok(key) = std::env::var("MES_API_KEY") {
                shopfloor_config.mes.api_key = Some(key);
            }
        }

        Ok(shopfloor_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
