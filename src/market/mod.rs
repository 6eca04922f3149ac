//! 行情数据源
//!
//! 从远程收益率接口拉取币种难度和价格。拉取在注册表锁之外完成，
//! 结果经过过滤后再交给注册表叠加。

pub mod coinwarz;

use crate::error::MarketError;
use async_trait::async_trait;
use multiminer_core::CoinMarketData;

pub use coinwarz::{parse_profitability_feed, CoinWarzClient};

/// 行情数据源特征
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 数据源名称
    fn api_name(&self) -> String;

    /// 拉取所有难度有效的币种行情
    async fn fetch_coin_information(&self) -> Result<Vec<CoinMarketData>, MarketError>;
}
