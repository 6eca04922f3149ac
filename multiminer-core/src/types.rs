//! 输入数据类型定义
//!
//! 这些类型都是外部协作方已经解码好的数据：设备枚举结果、用户配置、
//! 后端遥测和行情数据。本库不做任何线路格式或文件格式的解析。

use crate::device::{DeviceIdentity, DeviceKind, TelemetryBlock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 币种信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoCoin {
    /// 币种代码，例如 "BTC"
    pub symbol: String,
    /// 显示名称
    pub name: String,
    #[serde(default)]
    pub algorithm: String,
    /// 交易所
    #[serde(default)]
    pub exchange: String,
}

impl CryptoCoin {
    pub fn new<S: Into<String>>(symbol: S, name: S, algorithm: S) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            algorithm: algorithm.into(),
            exchange: String::new(),
        }
    }

    /// 设置交易所
    pub fn with_exchange<S: Into<String>>(mut self, exchange: S) -> Self {
        self.exchange = exchange.into();
        self
    }

    /// 币种代码比较（不区分大小写）
    pub fn matches_symbol(&self, symbol: &str) -> bool {
        self.symbol.eq_ignore_ascii_case(symbol)
    }
}

/// 币种配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinConfiguration {
    pub coin: CryptoCoin,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl CoinConfiguration {
    pub fn new(coin: CryptoCoin, enabled: bool) -> Self {
        Self { coin, enabled }
    }
}

/// 单个设备的用户配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfiguration {
    #[serde(flatten)]
    pub identity: DeviceIdentity,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 配置的币种代码，空字符串等同于未配置
    #[serde(default)]
    pub coin_symbol: Option<String>,
}

impl DeviceConfiguration {
    pub fn new(identity: DeviceIdentity, enabled: bool, coin_symbol: Option<&str>) -> Self {
        Self {
            identity,
            enabled,
            coin_symbol: coin_symbol.map(str::to_string),
        }
    }

    /// 有效的币种代码
    pub fn configured_symbol(&self) -> Option<&str> {
        self.coin_symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// 本地枚举出的设备描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub kind: DeviceKind,
    /// 枚举序号
    pub index: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub path: String,
    /// 能力标记，例如 "opencl"、"cuda"
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl DeviceDescriptor {
    pub fn new(kind: DeviceKind, index: u32) -> Self {
        Self {
            kind,
            index,
            name: String::new(),
            driver: String::new(),
            path: String::new(),
            capabilities: Vec::new(),
        }
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::local(self.kind, self.index)
    }
}

/// 配置的网络矿机
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDevice {
    /// 地址，例如 "10.0.0.5" 或 "10.0.0.5:4028"
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl NetworkDevice {
    pub fn new<S: Into<String>>(address: S) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::network(self.address.clone())
    }
}

/// 后端上报的单条设备遥测
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryResponse {
    /// 后端设备序号
    pub index: u32,
    /// 后端给出的名称，不会写入记录
    #[serde(default)]
    pub name: String,
    /// 后端给出的类型标签，不会写入记录
    #[serde(default)]
    pub kind: String,
    /// 后端的启用状态，不会写入记录
    #[serde(default)]
    pub enabled: bool,
    pub average_hashrate: f64,
    pub current_hashrate: f64,
    pub accepted_shares: u64,
    pub rejected_shares: u64,
    pub hardware_errors: u64,
    pub utility: f64,
    pub work_utility: f64,
    pub rejected_shares_percent: f64,
    pub hardware_errors_percent: f64,
    pub temperature: f64,
    pub fan_percent: f64,
    #[serde(default)]
    pub intensity: String,
    #[serde(default)]
    pub pool_index: Option<u32>,
}

impl TelemetryResponse {
    /// 提取遥测字段，负值按零处理
    pub fn telemetry(&self) -> TelemetryBlock {
        TelemetryBlock {
            average_hashrate: non_negative(self.average_hashrate),
            current_hashrate: non_negative(self.current_hashrate),
            accepted_shares: self.accepted_shares,
            rejected_shares: self.rejected_shares,
            hardware_errors: self.hardware_errors,
            utility: non_negative(self.utility),
            work_utility: non_negative(self.work_utility),
            rejected_shares_percent: non_negative(self.rejected_shares_percent),
            hardware_errors_percent: non_negative(self.hardware_errors_percent),
            temperature: non_negative(self.temperature),
            fan_percent: non_negative(self.fan_percent),
            intensity: self.intensity.clone(),
        }
    }
}

/// 矿池状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolStatusResponse {
    /// 矿池序号
    pub index: u32,
    pub url: String,
    pub last_share_difficulty: f64,
    #[serde(default)]
    pub last_share_time: Option<DateTime<Utc>>,
    pub best_share: f64,
    pub pool_stale_percent: f64,
}

/// 设备详情，用于解析代理 worker 名称
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDetailsResponse {
    /// 后端名称标签，代理 worker 为 "PXY"
    pub name: String,
    pub index: u32,
    pub device_path: String,
}

impl DeviceDetailsResponse {
    /// 是否为代理 worker
    pub fn is_proxy_worker(&self) -> bool {
        self.name == DeviceKind::Proxy.tag()
    }
}

/// 行情数据条目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketData {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub exchange: String,
    /// 全网难度
    pub difficulty: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub profitability: f64,
    #[serde(default)]
    pub average_profitability: f64,
    #[serde(default)]
    pub reward: f64,
}

fn default_true() -> bool {
    true
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
