//! CoinWarz 收益率接口客户端

use super::MarketDataSource;
use crate::config::MarketConfig;
use crate::error::MarketError;
use async_trait::async_trait;
use multiminer_core::CoinMarketData;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const INFO_URL: &str = "http://www.coinwarz.com/cryptocurrency";

/// 接口返回的外层结构
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FeedEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Vec<FeedCoin>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FeedCoin {
    coin_name: String,
    coin_tag: String,
    #[serde(default)]
    algorithm: Option<String>,
    #[serde(default)]
    difficulty: Option<f64>,
    #[serde(default)]
    block_reward: Option<f64>,
    #[serde(default)]
    profit_ratio: Option<f64>,
    #[serde(default)]
    avg_profit_ratio: Option<f64>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    exchange_rate: Option<f64>,
}

impl From<FeedCoin> for CoinMarketData {
    fn from(coin: FeedCoin) -> Self {
        Self {
            symbol: coin.coin_tag,
            name: coin.coin_name,
            algorithm: coin.algorithm.unwrap_or_default(),
            exchange: coin.exchange.unwrap_or_default(),
            difficulty: coin.difficulty.unwrap_or_default(),
            price: coin.exchange_rate.unwrap_or_default(),
            profitability: coin.profit_ratio.unwrap_or_default(),
            average_profitability: coin.avg_profit_ratio.unwrap_or_default(),
            reward: coin.block_reward.unwrap_or_default(),
        }
    }
}

/// 解析收益率接口的响应
///
/// 接口报告失败时返回 `MarketError::FeedFailure`，难度不大于零的币种会被丢弃。
pub fn parse_profitability_feed(body: &str) -> Result<Vec<CoinMarketData>, MarketError> {
    let envelope: FeedEnvelope = serde_json::from_str(body)?;

    if !envelope.success {
        return Err(MarketError::feed_failure(
            envelope.message.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    let coins: Vec<CoinMarketData> = envelope
        .data
        .unwrap_or_default()
        .into_iter()
        .map(CoinMarketData::from)
        .filter(|coin| {
            let valid = coin.difficulty > 0.0;
            if !valid {
                trace!("丢弃难度无效的币种: {}", coin.symbol);
            }
            valid
        })
        .collect();

    Ok(coins)
}

/// CoinWarz 客户端
pub struct CoinWarzClient {
    client: reqwest::Client,
    api_url: Url,
}

impl CoinWarzClient {
    /// 根据配置创建客户端
    pub fn new(config: &MarketConfig) -> Result<Self, MarketError> {
        let mut api_url = Url::parse(&config.api_url).map_err(|e| MarketError::InvalidUrl {
            url: config.api_url.clone(),
            error: e.to_string(),
        })?;
        api_url
            .query_pairs_mut()
            .append_pair("apikey", &config.api_key)
            .append_pair("algo", "all");

        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(user_agent) = config.user_agent.as_deref().filter(|ua| !ua.is_empty()) {
            builder = builder.user_agent(user_agent.to_string());
        }

        Ok(Self {
            client: builder.build()?,
            api_url,
        })
    }

    /// 完整的请求地址（含 API key）
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// 面向用户的信息页面
    pub fn info_url(&self) -> &'static str {
        INFO_URL
    }
}

#[async_trait]
impl MarketDataSource for CoinWarzClient {
    fn api_name(&self) -> String {
        "CoinWarz.com".to_string()
    }

    async fn fetch_coin_information(&self) -> Result<Vec<CoinMarketData>, MarketError> {
        debug!("请求行情数据: {}{}", self.api_url.origin().ascii_serialization(), self.api_url.path());

        let body = self
            .client
            .get(self.api_url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let coins = parse_profitability_feed(&body)?;
        debug!("收到 {} 个有效币种", coins.len());
        Ok(coins)
    }
}
