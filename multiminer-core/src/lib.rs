//! MultiMiner Core - 设备注册表与遥测合并
//!
//! 这个库维护矿机设备的内存模型，并把三个独立到达的数据源合并进去：
//! 设备枚举结果、用户配置和后端遥测。
//!
//! 每个轮询周期的处理顺序：
//! 设备合并 → 币种分配 → 清除（按需） → 遥测聚合 → 矿池状态 → worker 名称 → 行情数据。
//!
//! 所有操作都是同步的纯内存操作，不做任何 I/O。并发访问由调用方负责。

pub mod device;
pub mod error;
pub mod overlay;
pub mod registry;
pub mod telemetry;
pub mod types;

// 重新导出常用类型
pub use device::{
    AssignedCoin, DeviceIdentity, DeviceKey, DeviceKind, DeviceRecord, MarketStats, PoolBlock,
    TelemetryBlock, WorkerRecord,
};
pub use error::CoreError;
pub use overlay::DEFAULT_COIN_SYMBOL;
pub use registry::{DeviceRegistry, ReconcileStats};
pub use types::{
    CoinConfiguration, CoinMarketData, CryptoCoin, DeviceConfiguration, DeviceDescriptor,
    DeviceDetailsResponse, NetworkDevice, PoolStatusResponse, TelemetryResponse,
};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
