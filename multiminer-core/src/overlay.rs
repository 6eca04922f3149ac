//! 配置与外部数据覆盖
//!
//! 币种分配、矿池状态、代理 worker 名称和行情数据都按币种代码叠加到
//! 设备记录上。找不到匹配项时静默跳过，各数据源的到达顺序不做保证。

use crate::device::{AssignedCoin, DeviceKind, DeviceRecord, MarketStats};
use crate::registry::DeviceRegistry;
use crate::types::{
    CoinConfiguration, CoinMarketData, CryptoCoin, DeviceConfiguration, DeviceDetailsResponse,
    PoolStatusResponse,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace, warn};

/// 未配置设备的默认币种
pub const DEFAULT_COIN_SYMBOL: &str = "BTC";

impl DeviceRegistry {
    /// 记录当前启用的币种
    pub fn apply_coin_configurations(&mut self, coin_configurations: &[CoinConfiguration]) {
        self.configured_coins = coin_configurations
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.coin.clone())
            .collect();
        debug!("已启用币种: {}", self.configured_coins.len());
    }

    /// 根据设备配置设置启用状态和币种
    ///
    /// 有配置的设备使用配置的启用状态，配置了币种代码时在启用的币种中
    /// 查找（不区分大小写），找不到则保留原有分配。没有配置的设备默认启用，
    /// 并在 BTC 已启用时分配 BTC。
    pub fn apply_device_configurations(
        &mut self,
        device_configurations: &[DeviceConfiguration],
        coin_configurations: &[CoinConfiguration],
    ) {
        let mut by_identity = HashMap::new();
        for configuration in device_configurations {
            if by_identity
                .insert(&configuration.identity, configuration)
                .is_some()
            {
                warn!("设备 {} 存在重复配置，使用最后一条", configuration.identity);
            }
        }

        for record in self.iter_mut() {
            match by_identity.get(&record.identity) {
                Some(configuration) => {
                    record.enabled = configuration.enabled;
                    if let Some(symbol) = configuration.configured_symbol() {
                        match find_enabled_coin(coin_configurations, symbol) {
                            Some(coin) => assign_coin(record, coin),
                            None => debug!(
                                "设备 {} 配置的币种 {} 未启用，保留原有分配",
                                record.identity, symbol
                            ),
                        }
                    }
                }
                None => {
                    record.enabled = true;
                    if let Some(coin) = find_enabled_coin(coin_configurations, DEFAULT_COIN_SYMBOL) {
                        assign_coin(record, coin);
                    }
                }
            }
        }
    }

    /// 把矿池状态叠加到分配了该币种的所有设备
    ///
    /// 按记录当前的矿池序号查找状态；找不到时（设备未挖矿、崩溃或没有数据）
    /// 清空矿池连接字段。返回受影响的记录数。
    pub fn apply_pool_status(&mut self, coin_symbol: &str, pool_status: &[PoolStatusResponse]) -> usize {
        let mut affected = 0;

        for record in self
            .iter_mut()
            .filter(|r| r.coin_symbol() == Some(coin_symbol))
        {
            let status = record
                .pool
                .pool_index
                .and_then(|index| pool_status.iter().find(|p| p.index == index));

            match status {
                Some(status) => {
                    record.pool.url = status.url.clone();
                    record.pool.last_share_difficulty = status.last_share_difficulty;
                    record.pool.last_share_time = status.last_share_time;
                    record.pool.best_share = status.best_share;
                    record.pool.pool_stale_percent = status.pool_stale_percent;
                }
                None => {
                    trace!("设备 {} 没有对应的矿池状态", record.identity);
                    record.pool.reset_connection();
                }
            }
            affected += 1;
        }

        affected
    }

    /// 根据设备详情设置代理 worker 的名称
    ///
    /// 只处理分配了该币种的代理设备，返回命名成功的 worker 数。
    pub fn apply_device_details(&mut self, coin_symbol: &str, details: &[DeviceDetailsResponse]) -> usize {
        let mut proxies = self.iter_mut().filter(|r| {
            r.kind() == DeviceKind::Proxy && r.coin_symbol() == Some(coin_symbol)
        });

        let proxy = match proxies.next() {
            Some(proxy) => proxy,
            None => return 0,
        };
        if proxies.next().is_some() {
            warn!("币种 {} 对应多个代理设备，只处理第一个", coin_symbol);
        }

        let mut named = 0;
        for detail in details.iter().filter(|d| d.is_proxy_worker()) {
            if let Some(worker) = proxy.workers.iter_mut().find(|w| w.index == detail.index) {
                worker.worker_name = Some(detail.device_path.clone());
                named += 1;
            }
        }

        named
    }

    /// 把行情数据叠加到分配了该币种的所有设备
    ///
    /// 只覆盖难度等行情字段，币种名称和交易所以本地配置为准。
    /// 币种代码区分大小写。返回受影响的记录数。
    pub fn apply_market_data(&mut self, coin_symbol: &str, market_data: &[CoinMarketData]) -> usize {
        let entry = match market_data.iter().find(|m| m.symbol == coin_symbol) {
            Some(entry) => entry,
            None => {
                trace!("行情数据中没有币种 {}", coin_symbol);
                return 0;
            }
        };

        let stats = MarketStats {
            difficulty: entry.difficulty,
            price: entry.price,
            profitability: entry.profitability,
            average_profitability: entry.average_profitability,
            reward: entry.reward,
        };

        let mut affected = 0;
        for assigned in self
            .iter_mut()
            .filter_map(|r| r.coin.as_mut())
            .filter(|c| c.symbol() == coin_symbol)
        {
            assigned.market = stats.clone();
            affected += 1;
        }

        affected
    }

    /// 对所有已分配的币种批量叠加行情数据
    pub fn apply_market_data_all(&mut self, market_data: &[CoinMarketData]) -> usize {
        let symbols: BTreeSet<String> = self
            .iter()
            .filter_map(|r| r.coin_symbol())
            .map(str::to_string)
            .collect();

        symbols
            .iter()
            .map(|symbol| self.apply_market_data(symbol, market_data))
            .sum()
    }
}

fn find_enabled_coin<'a>(coin_configurations: &'a [CoinConfiguration], symbol: &str) -> Option<&'a CryptoCoin> {
    coin_configurations
        .iter()
        .filter(|c| c.enabled)
        .map(|c| &c.coin)
        .find(|coin| coin.matches_symbol(symbol))
}

/// 分配币种，币种代码不变时保留已有的行情数据
fn assign_coin(record: &mut DeviceRecord, coin: &CryptoCoin) {
    if let Some(assigned) = record.coin.as_mut() {
        if assigned.coin.symbol == coin.symbol {
            assigned.coin = coin.clone();
            return;
        }
    }
    record.coin = Some(AssignedCoin::new(coin.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceIdentity, PoolBlock};
    use crate::types::{DeviceDescriptor, NetworkDevice, TelemetryResponse};
    use chrono::{TimeZone, Utc};

    fn coins() -> Vec<CoinConfiguration> {
        vec![
            CoinConfiguration::new(CryptoCoin::new("BTC", "Bitcoin", "SHA-256").with_exchange("Bitstamp"), true),
            CoinConfiguration::new(CryptoCoin::new("LTC", "Litecoin", "Scrypt").with_exchange("BTC-e"), true),
            CoinConfiguration::new(CryptoCoin::new("DOGE", "Dogecoin", "Scrypt"), false),
        ]
    }

    fn registry() -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        registry.reconcile(
            Some(&[
                DeviceDescriptor::new(DeviceKind::Gpu, 0),
                DeviceDescriptor::new(DeviceKind::Proxy, 0),
            ]),
            Some(&[NetworkDevice::new("10.0.0.5")]),
        );
        registry
    }

    fn gpu0() -> DeviceIdentity {
        DeviceIdentity::local(DeviceKind::Gpu, 0)
    }

    fn proxy0() -> DeviceIdentity {
        DeviceIdentity::local(DeviceKind::Proxy, 0)
    }

    fn rig() -> DeviceIdentity {
        DeviceIdentity::network("10.0.0.5")
    }

    #[test]
    fn test_coin_configurations_keep_enabled_only() {
        let mut registry = registry();
        registry.apply_coin_configurations(&coins());

        let symbols: Vec<&str> = registry.configured_coins().iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "LTC"]);
    }

    #[test]
    fn test_default_assignment_is_btc() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());

        for record in registry.iter() {
            assert!(record.enabled);
            assert_eq!(record.coin_symbol(), Some("BTC"));
        }
    }

    #[test]
    fn test_default_assignment_without_btc_leaves_unassigned() {
        let mut registry = registry();
        let coins: Vec<_> = coins().into_iter().filter(|c| c.coin.symbol != "BTC").collect();

        registry.apply_device_configurations(&[], &coins);

        assert!(registry.iter().all(|r| r.coin.is_none() && r.enabled));
    }

    #[test]
    fn test_configured_symbol_is_case_insensitive() {
        let mut registry = registry();
        let configs = vec![DeviceConfiguration::new(rig(), false, Some("ltc"))];

        registry.apply_device_configurations(&configs, &coins());

        let record = registry.get(&rig()).unwrap();
        assert!(!record.enabled);
        assert_eq!(record.coin_symbol(), Some("LTC"));
        assert_eq!(record.coin.as_ref().unwrap().coin.name, "Litecoin");
    }

    #[test]
    fn test_unresolved_symbol_keeps_prior_assignment() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());

        // DOGE 未启用
        let configs = vec![DeviceConfiguration::new(gpu0(), true, Some("DOGE"))];
        registry.apply_device_configurations(&configs, &coins());

        assert_eq!(registry.get(&gpu0()).unwrap().coin_symbol(), Some("BTC"));
    }

    #[test]
    fn test_blank_symbol_keeps_assignment_but_applies_enabled() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());

        let configs = vec![DeviceConfiguration::new(gpu0(), false, Some(""))];
        registry.apply_device_configurations(&configs, &coins());

        let record = registry.get(&gpu0()).unwrap();
        assert!(!record.enabled);
        assert_eq!(record.coin_symbol(), Some("BTC"));
    }

    #[test]
    fn test_reassigning_same_symbol_keeps_market_stats() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());
        registry.apply_market_data(
            "BTC",
            &[CoinMarketData {
                symbol: "BTC".to_string(),
                difficulty: 1000.0,
                ..Default::default()
            }],
        );

        registry.apply_device_configurations(&[], &coins());
        assert_eq!(registry.get(&gpu0()).unwrap().coin.as_ref().unwrap().market.difficulty, 1000.0);

        let configs = vec![DeviceConfiguration::new(gpu0(), true, Some("LTC"))];
        registry.apply_device_configurations(&configs, &coins());
        assert_eq!(registry.get(&gpu0()).unwrap().coin.as_ref().unwrap().market.difficulty, 0.0);
    }

    #[test]
    fn test_pool_status_overwrites_matching_index() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());
        registry.apply_telemetry(
            &gpu0(),
            &TelemetryResponse {
                pool_index: Some(1),
                ..Default::default()
            },
        );

        let share_time = Utc.with_ymd_and_hms(2014, 1, 2, 3, 4, 5).unwrap();
        let status = vec![
            PoolStatusResponse {
                index: 0,
                url: "stratum+tcp://a:3333".to_string(),
                ..Default::default()
            },
            PoolStatusResponse {
                index: 1,
                url: "stratum+tcp://b:3333".to_string(),
                last_share_difficulty: 64.0,
                last_share_time: Some(share_time),
                best_share: 5000.0,
                pool_stale_percent: 0.5,
            },
        ];

        // 三台设备都分配了 BTC
        assert_eq!(registry.apply_pool_status("BTC", &status), 3);

        let pool = &registry.get(&gpu0()).unwrap().pool;
        assert_eq!(pool.pool_index, Some(1));
        assert_eq!(pool.url, "stratum+tcp://b:3333");
        assert_eq!(pool.last_share_difficulty, 64.0);
        assert_eq!(pool.last_share_time, Some(share_time));
        assert_eq!(pool.best_share, 5000.0);
        assert_eq!(pool.pool_stale_percent, 0.5);

        // 没有矿池序号的设备被清空
        assert_eq!(registry.get(&rig()).unwrap().pool, PoolBlock::default());
    }

    #[test]
    fn test_pool_status_resets_when_index_missing() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());
        {
            let pool = &mut registry.get_mut(&gpu0()).unwrap().pool;
            pool.pool_index = Some(2);
            pool.url = "stratum+tcp://old:3333".to_string();
            pool.last_share_difficulty = 32.0;
            pool.last_share_time = Some(Utc::now());
            pool.best_share = 10.0;
            pool.pool_stale_percent = 3.0;
        }

        let status = vec![PoolStatusResponse {
            index: 0,
            url: "stratum+tcp://a:3333".to_string(),
            ..Default::default()
        }];
        registry.apply_pool_status("BTC", &status);

        let pool = &registry.get(&gpu0()).unwrap().pool;
        assert_eq!(pool.pool_index, Some(2));
        assert!(pool.url.is_empty());
        assert_eq!(pool.last_share_difficulty, 0.0);
        assert_eq!(pool.last_share_time, None);
        assert_eq!(pool.best_share, 0.0);
        assert_eq!(pool.pool_stale_percent, 0.0);
    }

    #[test]
    fn test_pool_status_ignores_other_coins() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());
        registry.get_mut(&gpu0()).unwrap().pool.url = "keep".to_string();

        assert_eq!(registry.apply_pool_status("LTC", &[]), 0);
        assert_eq!(registry.get(&gpu0()).unwrap().pool.url, "keep");
    }

    #[test]
    fn test_device_details_name_proxy_workers() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());
        for index in [0, 1] {
            registry.apply_telemetry(
                &proxy0(),
                &TelemetryResponse {
                    index,
                    average_hashrate: 10.0,
                    ..Default::default()
                },
            );
        }

        let details = vec![
            DeviceDetailsResponse {
                name: "PXY".to_string(),
                index: 1,
                device_path: "rig-b".to_string(),
            },
            DeviceDetailsResponse {
                name: "GPU".to_string(),
                index: 0,
                device_path: "/dev/gpu0".to_string(),
            },
            DeviceDetailsResponse {
                name: "PXY".to_string(),
                index: 9,
                device_path: "missing".to_string(),
            },
        ];

        assert_eq!(registry.apply_device_details("BTC", &details), 1);

        let workers = &registry.get(&proxy0()).unwrap().workers;
        assert_eq!(workers[0].worker_name, None);
        assert_eq!(workers[1].worker_name.as_deref(), Some("rig-b"));
    }

    #[test]
    fn test_device_details_without_proxy_is_noop() {
        let mut registry = registry();
        let details = vec![DeviceDetailsResponse {
            name: "PXY".to_string(),
            index: 0,
            device_path: "rig-a".to_string(),
        }];

        // 没有分配币种
        assert_eq!(registry.apply_device_details("BTC", &details), 0);
    }

    #[test]
    fn test_market_data_keeps_local_name_and_exchange() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());

        let market = vec![CoinMarketData {
            symbol: "BTC".to_string(),
            name: "Bitcoin (feed)".to_string(),
            exchange: "Mt. Gox".to_string(),
            difficulty: 1_180_923_195.26,
            price: 1.0,
            profitability: 100.0,
            ..Default::default()
        }];

        assert_eq!(registry.apply_market_data("BTC", &market), 3);

        let assigned = registry.get(&gpu0()).unwrap().coin.clone().unwrap();
        assert_eq!(assigned.coin.name, "Bitcoin");
        assert_eq!(assigned.coin.exchange, "Bitstamp");
        assert_eq!(assigned.market.difficulty, 1_180_923_195.26);
        assert_eq!(assigned.market.profitability, 100.0);
    }

    #[test]
    fn test_market_data_symbol_is_case_sensitive() {
        let mut registry = registry();
        registry.apply_device_configurations(&[], &coins());

        let market = vec![CoinMarketData {
            symbol: "btc".to_string(),
            difficulty: 5.0,
            ..Default::default()
        }];

        assert_eq!(registry.apply_market_data("BTC", &market), 0);
        assert_eq!(registry.apply_market_data("btc", &market), 0);
    }

    #[test]
    fn test_market_data_all_covers_each_symbol() {
        let mut registry = registry();
        let configs = vec![DeviceConfiguration::new(rig(), true, Some("LTC"))];
        registry.apply_device_configurations(&configs, &coins());

        let market = vec![
            CoinMarketData {
                symbol: "BTC".to_string(),
                difficulty: 10.0,
                ..Default::default()
            },
            CoinMarketData {
                symbol: "LTC".to_string(),
                difficulty: 20.0,
                ..Default::default()
            },
        ];

        assert_eq!(registry.apply_market_data_all(&market), 3);
        assert_eq!(registry.get(&rig()).unwrap().coin.as_ref().unwrap().market.difficulty, 20.0);
        assert_eq!(registry.get(&gpu0()).unwrap().coin.as_ref().unwrap().market.difficulty, 10.0);
    }
}
