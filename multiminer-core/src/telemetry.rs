//! 遥测聚合
//!
//! 代理和网络矿机会在一次轮询中收到多条遥测（每个 worker 一条），这些遥测
//! 累加到同一条记录上，并各自生成一个 worker 子记录。其他设备直接覆盖。
//! 累加状态从上一次清除开始计算，单次调用之间不会重置。

use crate::device::{DeviceIdentity, DeviceRecord, WorkerRecord};
use crate::registry::DeviceRegistry;
use crate::types::TelemetryResponse;
use tracing::{debug, trace};

impl DeviceRegistry {
    /// 把一条遥测应用到对应的设备记录
    ///
    /// 记录不存在时不做任何事并返回 `None`，遥测不会创建新记录。
    pub fn apply_telemetry(
        &mut self,
        identity: &DeviceIdentity,
        response: &TelemetryResponse,
    ) -> Option<&DeviceRecord> {
        let record = match self.get_mut(identity) {
            Some(record) => record,
            None => {
                debug!("收到未知设备的遥测，已忽略: {}", identity);
                return None;
            }
        };

        let telemetry = response.telemetry();
        record.pool.pool_index = response.pool_index;

        if record.kind().aggregates_workers() {
            record.telemetry.accumulate(&telemetry);
            record.workers.push(WorkerRecord {
                index: response.index,
                worker_name: None,
                telemetry,
            });
            trace!(
                "设备 {} 累加 worker {}，当前共 {} 个 worker",
                identity,
                response.index,
                record.workers.len()
            );
        } else {
            record.telemetry = telemetry;
            trace!("设备 {} 遥测已更新", identity);
        }

        Some(&*record)
    }
}
