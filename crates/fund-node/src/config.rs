//! Node configuration.
//!
//! Handles loading and validation of node configuration from
//! config files and command-line arguments.

use fund_keeper::{Position, RiskParams};
use fund_ledger::FundConfig;
use fund_types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node name
    pub name: String,
    /// Treasury parameters
    pub fund: FundSection,
    /// HTTP API configuration
    pub api: ApiConfig,
    /// Liquidation keeper configuration
    pub keeper: KeeperConfig,
    /// Metrics configuration
    pub metrics: MetricsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "fund-node".to_string(),
            fund: FundSection::default(),
            api: ApiConfig::default(),
            keeper: KeeperConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from file.
    /// Path is validated to prevent directory traversal attacks.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        reject_traversal(path)?;

        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: NodeConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// Save configuration to file.
    /// Path is validated to prevent directory traversal attacks.
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        reject_traversal(path)?;

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.fund
            .fund_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("[fund] {}", e))?;

        if self.fund.share_name.trim().is_empty() || self.fund.share_symbol.trim().is_empty() {
            anyhow::bail!("[fund] share token name and symbol are required");
        }

        if self.api.addr.port() == 0 {
            anyhow::bail!("API port cannot be 0");
        }

        if self.keeper.interval_secs == 0 {
            anyhow::bail!("Keeper interval cannot be 0");
        }
        if self.keeper.liquidation_ratio == 0 {
            anyhow::bail!("Liquidation ratio cannot be 0");
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => anyhow::bail!("Unknown log format '{}' (expected pretty or json)", other),
        }

        Ok(())
    }
}

fn reject_traversal(path: &Path) -> anyhow::Result<()> {
    if path.to_string_lossy().contains("..") {
        anyhow::bail!("Invalid path: directory traversal detected");
    }
    Ok(())
}

/// Treasury parameters, fixed once the node has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundSection {
    /// The fund's own address
    pub address: Address,
    /// Admin, also the deployer of the share token
    pub admin: Address,
    /// Smallest accepted first deposit
    pub min_deposit: U256,
    /// Quorum in percent
    pub quorum_percent: u8,
    /// Share token name
    pub share_name: String,
    /// Share token symbol
    pub share_symbol: String,
}

impl FundSection {
    pub fn fund_config(&self) -> FundConfig {
        FundConfig {
            address: self.address,
            admin: self.admin,
            min_deposit: self.min_deposit,
            quorum_percent: self.quorum_percent,
        }
    }
}

impl Default for FundSection {
    fn default() -> Self {
        Self {
            address: Address::derive(b"fund"),
            admin: Address::derive(b"admin"),
            min_deposit: U256::from(100_000_000_000_000_000u128), // 0.1 ether
            quorum_percent: 75,
            share_name: "Fund Share".to_string(),
            share_symbol: "FSH".to_string(),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen address
    pub addr: SocketAddr,
    /// Enable CORS
    pub cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors: true,
        }
    }
}

/// Liquidation keeper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// Run the keeper alongside the API in `serve`
    pub enabled: bool,
    /// Seconds between passes
    pub interval_secs: u64,
    /// Collateral over debt value, in percent
    pub liquidation_ratio: u16,
    /// Stability fee, in percent
    pub stability_fee: u8,
    /// Price of one unit of debt, in wei
    pub usd_in_wei: U256,
    /// Positions seeded into the in-memory ledger
    #[serde(default)]
    pub positions: Vec<Position>,
}

impl KeeperConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn risk_params(&self) -> RiskParams {
        RiskParams {
            liquidation_ratio: self.liquidation_ratio,
            stability_fee: self.stability_fee,
            usd_in_wei: self.usd_in_wei,
        }
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 30,
            liquidation_ratio: 150,
            stability_fee: 2,
            usd_in_wei: U256::from(500_000_000_000_000u128),
            positions: Vec::new(),
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Expose `/metrics` on the API router
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log to file
    pub log_file: Option<std::path::PathBuf>,
    /// Log format (json|pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
            format: "pretty".to_string(),
        }
    }
}
