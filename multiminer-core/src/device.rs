//! 设备身份与设备记录定义

use crate::error::CoreError;
use crate::types::CryptoCoin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// CPU 计算单元
    #[serde(rename = "CPU", alias = "cpu")]
    Cpu,
    /// GPU 计算单元
    #[serde(rename = "GPU", alias = "gpu")]
    Gpu,
    /// USB ASIC
    #[serde(rename = "USB", alias = "usb")]
    Usb,
    /// Stratum 代理聚合设备
    #[serde(rename = "PXY", alias = "pxy", alias = "proxy")]
    Proxy,
    /// 网络矿机
    #[serde(rename = "NET", alias = "net", alias = "network")]
    Network,
}

impl DeviceKind {
    /// 是否会把多个 worker 汇总到同一条记录
    pub fn aggregates_workers(&self) -> bool {
        matches!(self, DeviceKind::Proxy | DeviceKind::Network)
    }

    /// 后端使用的简写标签
    pub fn tag(&self) -> &'static str {
        match self {
            DeviceKind::Cpu => "CPU",
            DeviceKind::Gpu => "GPU",
            DeviceKind::Usb => "USB",
            DeviceKind::Proxy => "PXY",
            DeviceKind::Network => "NET",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DeviceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CPU" => Ok(DeviceKind::Cpu),
            "GPU" => Ok(DeviceKind::Gpu),
            "USB" => Ok(DeviceKind::Usb),
            "PXY" | "PROXY" => Ok(DeviceKind::Proxy),
            "NET" | "NETWORK" => Ok(DeviceKind::Network),
            _ => Err(CoreError::invalid_kind(s)),
        }
    }
}

/// 设备类型内部的区分键
///
/// 本地设备使用枚举序号，网络设备使用配置的地址
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceKey {
    Index(u32),
    Path(String),
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKey::Index(index) => write!(f, "{}", index),
            DeviceKey::Path(path) => f.write_str(path),
        }
    }
}

/// 设备身份
///
/// 跨数据源匹配的唯一依据，结构相等即视为同一设备。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub kind: DeviceKind,
    pub key: DeviceKey,
}

impl DeviceIdentity {
    /// 本地枚举设备
    pub fn local(kind: DeviceKind, index: u32) -> Self {
        Self {
            kind,
            key: DeviceKey::Index(index),
        }
    }

    /// 网络矿机
    pub fn network<S: Into<String>>(address: S) -> Self {
        Self {
            kind: DeviceKind::Network,
            key: DeviceKey::Path(address.into()),
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// 解析 `KIND:KEY` 形式，例如 `GPU:0`、`NET:10.0.0.5:4028`
impl FromStr for DeviceIdentity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, key) = s
            .split_once(':')
            .ok_or_else(|| CoreError::invalid_identity(s))?;
        let kind: DeviceKind = kind.parse()?;

        if key.is_empty() {
            return Err(CoreError::invalid_identity(s));
        }

        let key = match kind {
            DeviceKind::Network => DeviceKey::Path(key.to_string()),
            _ => match key.parse::<u32>() {
                Ok(index) => DeviceKey::Index(index),
                Err(_) => DeviceKey::Path(key.to_string()),
            },
        };

        Ok(Self { kind, key })
    }
}

/// 遥测数据块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryBlock {
    /// 平均算力 (H/s)
    pub average_hashrate: f64,
    /// 当前算力 (H/s)
    pub current_hashrate: f64,
    pub accepted_shares: u64,
    pub rejected_shares: u64,
    pub hardware_errors: u64,
    pub utility: f64,
    pub work_utility: f64,
    /// 拒绝份额百分比
    pub rejected_shares_percent: f64,
    /// 硬件错误百分比
    pub hardware_errors_percent: f64,
    /// 温度 (°C)
    pub temperature: f64,
    pub fan_percent: f64,
    /// 强度设置，后端原样上报
    pub intensity: String,
}

impl TelemetryBlock {
    /// 累加另一份遥测的汇总字段
    ///
    /// 只累加份额、算力、效用和两个百分比字段。温度、风扇和强度不做汇总。
    /// 计数器在 `u64::MAX` 处饱和。
    pub fn accumulate(&mut self, other: &TelemetryBlock) {
        self.average_hashrate += other.average_hashrate;
        self.current_hashrate += other.current_hashrate;
        self.accepted_shares = self.accepted_shares.saturating_add(other.accepted_shares);
        self.rejected_shares = self.rejected_shares.saturating_add(other.rejected_shares);
        self.hardware_errors = self.hardware_errors.saturating_add(other.hardware_errors);
        self.utility += other.utility;
        self.work_utility += other.work_utility;
        self.rejected_shares_percent += other.rejected_shares_percent;
        self.hardware_errors_percent += other.hardware_errors_percent;
    }

    /// 是否为零状态
    pub fn is_zero(&self) -> bool {
        *self == TelemetryBlock::default()
    }
}

/// 矿池状态块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolBlock {
    /// 当前使用的矿池序号，`None` 表示未在挖矿
    pub pool_index: Option<u32>,
    pub url: String,
    pub last_share_difficulty: f64,
    pub last_share_time: Option<DateTime<Utc>>,
    pub best_share: f64,
    pub pool_stale_percent: f64,
}

impl PoolBlock {
    /// 清空矿池连接字段，保留矿池序号
    pub fn reset_connection(&mut self) {
        self.url.clear();
        self.last_share_difficulty = 0.0;
        self.last_share_time = None;
        self.best_share = 0.0;
        self.pool_stale_percent = 0.0;
    }
}

/// 行情数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    /// 全网难度
    pub difficulty: f64,
    pub price: f64,
    pub profitability: f64,
    pub average_profitability: f64,
    pub reward: f64,
}

/// 已分配的币种
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedCoin {
    /// 本地配置的币种信息，名称和交易所以此为准
    pub coin: CryptoCoin,
    /// 外部行情覆盖的数据
    pub market: MarketStats,
}

impl AssignedCoin {
    pub fn new(coin: CryptoCoin) -> Self {
        Self {
            coin,
            market: MarketStats::default(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.coin.symbol
    }
}

/// 代理或网络设备下的单个 worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    /// 后端上报的设备序号
    pub index: u32,
    /// 解析出的 worker 名称
    pub worker_name: Option<String>,
    pub telemetry: TelemetryBlock,
}

/// 设备记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub identity: DeviceIdentity,
    /// 显示名称
    pub name: String,
    pub driver: String,
    /// 设备路径
    pub path: String,
    /// 是否出现在当前枚举结果中
    pub visible: bool,
    /// 用户开关
    pub enabled: bool,
    pub coin: Option<AssignedCoin>,
    pub telemetry: TelemetryBlock,
    pub pool: PoolBlock,
    /// 仅代理和网络设备会有 worker
    pub workers: Vec<WorkerRecord>,
}

impl DeviceRecord {
    /// 创建新的设备记录，遥测和矿池状态为零
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            name: String::new(),
            driver: String::new(),
            path: String::new(),
            visible: false,
            enabled: true,
            coin: None,
            telemetry: TelemetryBlock::default(),
            pool: PoolBlock::default(),
            workers: Vec::new(),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        self.identity.kind
    }

    /// 当前分配的币种代码
    pub fn coin_symbol(&self) -> Option<&str> {
        self.coin.as_ref().map(|c| c.symbol())
    }

    /// 清除遥测、矿池状态和 worker，身份和配置保持不变
    pub fn clear_telemetry(&mut self) {
        self.telemetry = TelemetryBlock::default();
        self.pool = PoolBlock::default();
        self.workers.clear();
    }
}
