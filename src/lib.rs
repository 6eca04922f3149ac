//! MultiMiner-RS - 矿机设备群监控
//!
//! 维护一个由本地设备、代理和网络矿机组成的设备群模型，并把设备枚举、
//! 用户配置、后端遥测、矿池状态和行情数据合并到同一份记录中。
//!
//! 数据模型和所有合并逻辑在 `multiminer-core` 中，这个 crate 负责：
//! - 配置文件和命令行参数
//! - 日志系统
//! - 行情数据源（CoinWarz）
//! - 带读写锁的设备群管理器
//! - 设备详情视图和快照导出

pub mod config;
pub mod error;
pub mod fleet;
pub mod logging;
pub mod market;
pub mod report;
pub mod utils;

pub use config::Config;
pub use error::FleetError;
pub use fleet::{ClearScope, CycleSummary, FleetConfiguration, FleetManager, PollCycle};
pub use market::{CoinWarzClient, MarketDataSource};
pub use report::DeviceDetails;

/// 程序版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 程序名称
pub const NAME: &str = "multiminer-rs";
