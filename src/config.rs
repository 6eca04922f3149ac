use crate::error::ConfigError;
use anyhow::{Context, Result};
use clap::Parser;
use multiminer_core::{CoinConfiguration, DeviceConfiguration, NetworkDevice};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;


#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "multiminer.toml")]
    pub config: String,

    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Log level
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the fleet snapshot as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip the market data refresh
    #[arg(long)]
    pub no_market: bool,

    /// Show details for a single device, e.g. "NET:10.0.0.5"
    #[arg(long)]
    pub inspect: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub coins: Vec<CoinConfiguration>,
    #[serde(default)]
    pub devices: Vec<DeviceConfiguration>,
    #[serde(default)]
    pub network_devices: Vec<NetworkDevice>,
    #[serde(default)]
    pub market: MarketConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub pretty_logs: bool,
    /// 详情视图显示工作效用而不是效用
    #[serde(default)]
    pub show_work_utility: bool,
}

/// 行情数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// 请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            pretty_logs: true,
            show_work_utility: false,
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    "http://www.coinwarz.com/v1/api/profitability/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string(),
            }
            .into());
        }

        let config_content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_content)
            .map_err(|e| ConfigError::ParseError { error: e.to_string() })
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // 验证日志配置
        if !LOG_LEVELS.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(invalid("general.log_level", format!(
                "'{}' is not one of {:?}",
                self.general.log_level, LOG_LEVELS
            )));
        }

        // 验证币种配置
        let mut symbols = HashSet::new();
        for coin_config in &self.coins {
            let symbol = coin_config.coin.symbol.trim();
            if symbol.is_empty() {
                return Err(invalid("coins.coin.symbol", "Coin symbol cannot be empty"));
            }
            if !symbols.insert(symbol.to_uppercase()) {
                return Err(invalid("coins.coin.symbol", format!("Duplicate coin symbol '{}'", symbol)));
            }
        }

        // 验证网络设备配置
        let mut addresses = HashSet::new();
        for network_device in &self.network_devices {
            let address = network_device.address.trim();
            if address.is_empty() {
                return Err(invalid("network_devices.address", "Network device address cannot be empty"));
            }
            if !addresses.insert(address) {
                return Err(invalid(
                    "network_devices.address",
                    format!("Duplicate network device '{}'", address),
                ));
            }
        }

        // 验证行情配置
        url::Url::parse(&self.market.api_url).map_err(|e| {
            invalid("market.api_url", format!("'{}' is not a valid URL: {}", self.market.api_url, e))
        })?;

        if self.market.timeout_secs == 0 || self.market.timeout_secs > 120 {
            return Err(invalid(
                "market.timeout_secs",
                format!("{} is out of range (1-120)", self.market.timeout_secs),
            ));
        }

        if self.market.enabled && self.market.api_key.trim().is_empty() {
            return Err(invalid("market.api_key", "API key is required when market data is enabled"));
        }

        Ok(())
    }

    /// 检查配置是否有效
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn invalid<S: Into<String>>(field: &str, reason: S) -> anyhow::Error {
    ConfigError::ValidationError {
        field: field.to_string(),
        reason: reason.into(),
    }
    .into()
}
