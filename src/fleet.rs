//! 设备群管理器
//!
//! 在注册表外面包一层 `tokio::sync::RwLock`，让轮询任务和展示层可以并发访问。
//! 一个轮询周期的所有更新在同一个写锁内按固定顺序完成，读者只会看到
//! 完整周期前或完整周期后的状态。

use crate::config::Config;
use crate::error::FleetError;
use crate::market::MarketDataSource;
use multiminer_core::{
    CoinConfiguration, CoinMarketData, DeviceConfiguration, DeviceDescriptor, DeviceDetailsResponse,
    DeviceIdentity, DeviceRecord, DeviceRegistry, NetworkDevice, PoolStatusResponse, ReconcileStats,
    TelemetryResponse,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// 周期开始前需要清除遥测的范围
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClearScope {
    /// 不清除
    #[default]
    None,
    /// 本地设备和代理
    LocalDevices,
    /// 网络矿机
    NetworkDevices,
    /// 全部
    All,
}

/// 设备群的持久配置
#[derive(Debug, Clone, Default)]
pub struct FleetConfiguration {
    pub coins: Vec<CoinConfiguration>,
    pub devices: Vec<DeviceConfiguration>,
}

impl From<&Config> for FleetConfiguration {
    fn from(config: &Config) -> Self {
        Self {
            coins: config.coins.clone(),
            devices: config.devices.clone(),
        }
    }
}

/// 一个轮询周期收集到的全部输入
#[derive(Debug, Clone, Default)]
pub struct PollCycle {
    /// 本地枚举结果，`None` 按空列表处理
    pub local_devices: Option<Vec<DeviceDescriptor>>,
    /// 网络设备列表，`None` 时保留已有的网络矿机
    pub network_devices: Option<Vec<NetworkDevice>>,
    pub clear: ClearScope,
    /// 按到达顺序排列的遥测
    pub telemetry: Vec<(DeviceIdentity, TelemetryResponse)>,
    /// 按币种代码分组的矿池状态
    pub pool_status: Vec<(String, Vec<PoolStatusResponse>)>,
    /// 按币种代码分组的设备详情
    pub device_details: Vec<(String, Vec<DeviceDetailsResponse>)>,
    /// 新的行情数据，`None` 时使用最近一次缓存的数据
    pub market_data: Option<Vec<CoinMarketData>>,
}

/// 周期处理结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub reconcile: ReconcileStats,
    pub cleared: usize,
    pub telemetry_applied: usize,
    /// 找不到对应记录的遥测数
    pub telemetry_skipped: usize,
    pub pool_records: usize,
    pub workers_named: usize,
    pub market_records: usize,
}

/// 设备群管理器
#[derive(Clone)]
pub struct FleetManager {
    /// 设备注册表
    registry: Arc<RwLock<DeviceRegistry>>,
    /// 币种和设备配置
    configuration: Arc<RwLock<FleetConfiguration>>,
    /// 最近一次的行情数据
    market_data: Arc<RwLock<Vec<CoinMarketData>>>,
}

impl FleetManager {
    /// 创建新的管理器
    pub fn new(configuration: FleetConfiguration) -> Self {
        Self {
            registry: Arc::new(RwLock::new(DeviceRegistry::new())),
            configuration: Arc::new(RwLock::new(configuration)),
            market_data: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// 替换配置，下一个周期生效
    pub async fn update_configuration(&self, configuration: FleetConfiguration) {
        *self.configuration.write().await = configuration;
        debug!("设备群配置已更新");
    }

    /// 处理一个完整的轮询周期
    ///
    /// 顺序：设备合并、币种配置、设备配置、清除、遥测、矿池状态、
    /// worker 名称、行情数据。
    pub async fn apply_cycle(&self, cycle: PollCycle) -> CycleSummary {
        let configuration = self.configuration.read().await.clone();

        let market_data = match cycle.market_data {
            Some(market_data) => {
                *self.market_data.write().await = market_data.clone();
                market_data
            }
            None => self.market_data.read().await.clone(),
        };

        let mut summary = CycleSummary::default();
        let mut registry = self.registry.write().await;

        summary.reconcile = registry.reconcile(
            cycle.local_devices.as_deref(),
            cycle.network_devices.as_deref(),
        );

        registry.apply_coin_configurations(&configuration.coins);
        registry.apply_device_configurations(&configuration.devices, &configuration.coins);

        summary.cleared = match cycle.clear {
            ClearScope::None => 0,
            ClearScope::LocalDevices => registry.clear_local_devices(),
            ClearScope::NetworkDevices => registry.clear_network_devices(),
            ClearScope::All => registry.clear_where(|_| true),
        };

        for (identity, response) in &cycle.telemetry {
            match registry.apply_telemetry(identity, response) {
                Some(_) => summary.telemetry_applied += 1,
                None => {
                    trace!("遥测对应的设备不存在: {}", identity);
                    summary.telemetry_skipped += 1;
                }
            }
        }

        for (symbol, pool_status) in &cycle.pool_status {
            summary.pool_records += registry.apply_pool_status(symbol, pool_status);
        }

        for (symbol, details) in &cycle.device_details {
            summary.workers_named += registry.apply_device_details(symbol, details);
        }

        summary.market_records = registry.apply_market_data_all(&market_data);

        crate::fleet_info!(
            "周期完成: {} 台设备, 遥测 {} 条, 矿池 {} 台, 行情 {} 台",
            summary.reconcile.total,
            summary.telemetry_applied,
            summary.pool_records,
            summary.market_records
        );

        summary
    }

    /// 应用单条遥测，返回更新后的记录副本
    pub async fn apply_telemetry(
        &self,
        identity: &DeviceIdentity,
        response: &TelemetryResponse,
    ) -> Option<DeviceRecord> {
        let mut registry = self.registry.write().await;
        let record = registry.apply_telemetry(identity, response).cloned();
        if record.is_some() {
            crate::device_debug!(identity, "遥测已更新");
        }
        record
    }

    /// 从行情数据源拉取并叠加到设备
    ///
    /// 拉取在锁外完成；失败时注册表保持不变。返回受影响的记录数。
    pub async fn refresh_market_data(&self, source: &dyn MarketDataSource) -> Result<usize, FleetError> {
        let market_data = match source.fetch_coin_information().await {
            Ok(market_data) => market_data,
            Err(e) => {
                crate::market_warn!("从 {} 获取行情失败: {}", source.api_name(), e);
                return Err(e.into());
            }
        };

        crate::market_info!("💱 从 {} 获取到 {} 个币种的行情", source.api_name(), market_data.len());

        *self.market_data.write().await = market_data.clone();
        let affected = self.registry.write().await.apply_market_data_all(&market_data);
        Ok(affected)
    }

    /// 按顺序复制所有记录
    pub async fn snapshot(&self) -> Vec<DeviceRecord> {
        self.registry.read().await.snapshot()
    }

    /// 查询单个设备
    pub async fn get(&self, identity: &DeviceIdentity) -> Option<DeviceRecord> {
        self.registry.read().await.get(identity).cloned()
    }

    /// 当前设备数
    pub async fn device_count(&self) -> usize {
        self.registry.read().await.len()
    }
}
