//! 设备详情视图与快照导出

use crate::error::FleetError;
use crate::utils::{
    blank_if_zero, fan_text, format_hashrate, hardware_error_percent_text, temperature_text,
};
use multiminer_core::{DeviceKind, DeviceRecord, WorkerRecord};
use serde::Serialize;
use std::fmt;

/// 单个 worker 的展示行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerRow {
    pub index: u32,
    /// 未解析出名称时为空
    pub name: String,
    pub average_hashrate: String,
    pub current_hashrate: String,
    /// 为零时为空
    pub accepted_shares: String,
    pub rejected_shares: u64,
    pub hardware_errors_percent: String,
}

impl From<&WorkerRecord> for WorkerRow {
    fn from(worker: &WorkerRecord) -> Self {
        Self {
            index: worker.index,
            name: worker.worker_name.clone().unwrap_or_default(),
            average_hashrate: format_hashrate(worker.telemetry.average_hashrate),
            current_hashrate: format_hashrate(worker.telemetry.current_hashrate),
            accepted_shares: blank_if_zero(worker.telemetry.accepted_shares),
            rejected_shares: worker.telemetry.rejected_shares,
            hardware_errors_percent: hardware_error_percent_text(worker.telemetry.hardware_errors_percent),
        }
    }
}

/// 设备详情
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDetails {
    pub identity: String,
    pub kind: DeviceKind,
    pub name: String,
    pub driver: String,
    pub path: String,
    pub enabled: bool,
    pub average_hashrate: String,
    pub current_hashrate: String,
    pub accepted_shares: u64,
    pub rejected_shares: u64,
    pub hardware_errors: u64,
    /// "Utility" 或 "Work Utility"
    pub utility_label: &'static str,
    pub utility: String,
    pub temperature: String,
    pub fan: String,
    /// 未分配币种时为空
    pub coin_symbol: String,
    pub coin_name: String,
    pub pool_url: String,
    pub workers: Vec<WorkerRow>,
    /// 只有带 worker 的代理设备显示 worker 列表
    pub workers_visible: bool,
}

impl DeviceDetails {
    /// 从设备记录生成详情
    pub fn from_record(record: &DeviceRecord, show_work_utility: bool) -> Self {
        let telemetry = &record.telemetry;
        let (utility_label, utility) = if show_work_utility {
            ("Work Utility", telemetry.work_utility)
        } else {
            ("Utility", telemetry.utility)
        };

        let (coin_symbol, coin_name) = match &record.coin {
            Some(assigned) => (assigned.coin.symbol.clone(), assigned.coin.name.clone()),
            None => (String::new(), String::new()),
        };

        Self {
            identity: record.identity.to_string(),
            kind: record.kind(),
            name: record.name.clone(),
            driver: record.driver.clone(),
            path: record.path.clone(),
            enabled: record.enabled,
            average_hashrate: format_hashrate(telemetry.average_hashrate),
            current_hashrate: format_hashrate(telemetry.current_hashrate),
            accepted_shares: telemetry.accepted_shares,
            rejected_shares: telemetry.rejected_shares,
            hardware_errors: telemetry.hardware_errors,
            utility_label,
            utility: format!("{:.2}", utility),
            temperature: temperature_text(telemetry.temperature),
            fan: fan_text(telemetry.fan_percent),
            coin_symbol,
            coin_name,
            pool_url: record.pool.url.clone(),
            workers: record.workers.iter().map(WorkerRow::from).collect(),
            workers_visible: record.kind() == DeviceKind::Proxy && !record.workers.is_empty(),
        }
    }
}

impl fmt::Display for DeviceDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.identity, self.name)?;
        writeln!(f, "  Enabled:   {}", if self.enabled { "yes" } else { "no" })?;
        writeln!(f, "  Coin:      {} {}", self.coin_symbol, self.coin_name)?;
        writeln!(f, "  Hashrate:  {} (avg) / {} (current)", self.average_hashrate, self.current_hashrate)?;
        writeln!(
            f,
            "  Shares:    {} accepted, {} rejected, {} errors",
            self.accepted_shares, self.rejected_shares, self.hardware_errors
        )?;
        writeln!(f, "  {}: {}", self.utility_label, self.utility)?;
        if !self.temperature.is_empty() || !self.fan.is_empty() {
            writeln!(f, "  Sensors:   {} {}", self.temperature, self.fan)?;
        }
        if !self.pool_url.is_empty() {
            writeln!(f, "  Pool:      {}", self.pool_url)?;
        }

        if self.workers_visible {
            writeln!(f, "  Workers ({}):", item_count_label(self.workers.len()))?;
            for worker in &self.workers {
                writeln!(
                    f,
                    "    #{:<3} {:<20} {:>14} {:>8} {:>6}",
                    worker.index,
                    worker.name,
                    worker.average_hashrate,
                    worker.accepted_shares,
                    worker.hardware_errors_percent
                )?;
            }
        }

        Ok(())
    }
}

/// 数量标签，例如 "1 item"、"3 items"，数量不大于 1 时不加复数
pub fn item_count_label(count: usize) -> String {
    if count > 1 {
        format!("{} items", count)
    } else {
        format!("{} item", count)
    }
}

/// 把快照导出为格式化的 JSON
pub fn export_snapshot_json(records: &[DeviceRecord]) -> Result<String, FleetError> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiminer_core::{AssignedCoin, CryptoCoin, DeviceIdentity, TelemetryBlock};

    fn proxy_with_workers() -> DeviceRecord {
        let mut record = DeviceRecord::new(DeviceIdentity::local(DeviceKind::Proxy, 0));
        record.name = "Stratum proxy".to_string();
        record.workers = vec![
            WorkerRecord {
                index: 0,
                worker_name: Some("rig-a".to_string()),
                telemetry: TelemetryBlock {
                    average_hashrate: 100.0,
                    accepted_shares: 0,
                    hardware_errors_percent: 0.04,
                    ..Default::default()
                },
            },
            WorkerRecord {
                index: 1,
                worker_name: None,
                telemetry: TelemetryBlock {
                    average_hashrate: 150.0,
                    accepted_shares: 7,
                    hardware_errors_percent: 1.25,
                    ..Default::default()
                },
            },
        ];
        record
    }

    #[test]
    fn test_details_unconfigured_device() {
        let mut record = DeviceRecord::new(DeviceIdentity::local(DeviceKind::Gpu, 0));
        record.telemetry.utility = 1.234;
        record.telemetry.work_utility = 9.5;

        let details = DeviceDetails::from_record(&record, false);
        assert_eq!(details.identity, "GPU:0");
        assert_eq!(details.coin_symbol, "");
        assert_eq!(details.coin_name, "");
        assert_eq!(details.temperature, "");
        assert_eq!(details.fan, "");
        assert_eq!(details.utility_label, "Utility");
        assert_eq!(details.utility, "1.23");
        assert!(!details.workers_visible);

        let details = DeviceDetails::from_record(&record, true);
        assert_eq!(details.utility_label, "Work Utility");
        assert_eq!(details.utility, "9.50");
    }

    #[test]
    fn test_details_sensors_and_coin() {
        let mut record = DeviceRecord::new(DeviceIdentity::local(DeviceKind::Gpu, 1));
        record.telemetry.temperature = 72.0;
        record.telemetry.fan_percent = 55.0;
        record.coin = Some(AssignedCoin::new(CryptoCoin::new("LTC", "Litecoin", "Scrypt")));

        let details = DeviceDetails::from_record(&record, false);
        assert_eq!(details.temperature, "72°");
        assert_eq!(details.fan, "55%");
        assert_eq!(details.coin_symbol, "LTC");
        assert_eq!(details.coin_name, "Litecoin");
    }

    #[test]
    fn test_proxy_worker_rows() {
        let details = DeviceDetails::from_record(&proxy_with_workers(), false);
        assert!(details.workers_visible);
        assert_eq!(details.workers.len(), 2);

        assert_eq!(details.workers[0].name, "rig-a");
        assert_eq!(details.workers[0].accepted_shares, "");
        assert_eq!(details.workers[0].hardware_errors_percent, "");

        assert_eq!(details.workers[1].name, "");
        assert_eq!(details.workers[1].accepted_shares, "7");
        assert_eq!(details.workers[1].hardware_errors_percent, "1.3%");
        assert_eq!(details.workers[1].average_hashrate, "150.0 H/s");

        let text = details.to_string();
        assert!(text.contains("Workers (2 items)"));
        assert!(text.contains("rig-a"));
    }

    #[test]
    fn test_network_workers_hidden() {
        let mut record = proxy_with_workers();
        record.identity = DeviceIdentity::network("10.0.0.5");

        let details = DeviceDetails::from_record(&record, false);
        assert_eq!(details.workers.len(), 2);
        assert!(!details.workers_visible);
    }

    #[test]
    fn test_item_count_label() {
        assert_eq!(item_count_label(0), "0 item");
        assert_eq!(item_count_label(1), "1 item");
        assert_eq!(item_count_label(12), "12 items");
    }

    #[test]
    fn test_export_snapshot_json() {
        let records = vec![proxy_with_workers()];
        let json = export_snapshot_json(&records).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "Stratum proxy");
        assert_eq!(value[0]["workers"][0]["worker_name"], "rig-a");
        assert!(json.contains('\n'));
    }
}
