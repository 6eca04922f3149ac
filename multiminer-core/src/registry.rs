//! 设备注册表
//!
//! 按插入顺序保存设备记录，并用身份索引做 O(1) 查找。枚举结果和网络设备
//! 配置在这里合并，遥测清理也在这里完成。

use crate::device::{DeviceIdentity, DeviceKind, DeviceRecord};
use crate::types::{CryptoCoin, DeviceDescriptor, NetworkDevice};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// 设备注册表
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    /// 有序的设备记录
    records: Vec<DeviceRecord>,
    /// 身份到下标的索引
    index: HashMap<DeviceIdentity, usize>,
    /// 当前启用的币种，按配置顺序
    pub(crate) configured_coins: Vec<CryptoCoin>,
}

/// 一次合并的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub added: usize,
    pub removed: usize,
    pub total: usize,
}

impl DeviceRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, identity: &DeviceIdentity) -> bool {
        self.index.contains_key(identity)
    }

    /// 根据身份获取记录
    pub fn get(&self, identity: &DeviceIdentity) -> Option<&DeviceRecord> {
        self.index.get(identity).map(|&pos| &self.records[pos])
    }

    pub(crate) fn get_mut(&mut self, identity: &DeviceIdentity) -> Option<&mut DeviceRecord> {
        match self.index.get(identity) {
            Some(&pos) => Some(&mut self.records[pos]),
            None => None,
        }
    }

    /// 有序的记录视图
    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut DeviceRecord> {
        self.records.iter_mut()
    }

    /// 生成当前记录的快照
    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        self.records.clone()
    }

    /// 当前启用的币种
    pub fn configured_coins(&self) -> &[CryptoCoin] {
        &self.configured_coins
    }

    fn push(&mut self, record: DeviceRecord) -> usize {
        let pos = self.records.len();
        self.index.insert(record.identity.clone(), pos);
        self.records.push(record);
        pos
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.identity.clone(), pos))
            .collect();
    }

    /// 合并本地枚举结果和网络设备配置
    ///
    /// 本地设备总是标记为可见；网络设备只在首次出现时以不可见状态加入。
    /// 合并后，身份不在对应来源列表中的记录会被移除：网络矿机对照网络设备
    /// 列表，其他类型对照本地枚举列表。网络设备列表缺失（`None`）时不移除
    /// 任何网络矿机；本地列表缺失按空列表处理。
    pub fn reconcile(
        &mut self,
        local_devices: Option<&[DeviceDescriptor]>,
        network_devices: Option<&[NetworkDevice]>,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let local_devices = local_devices.unwrap_or_default();

        for descriptor in local_devices {
            if descriptor.kind == DeviceKind::Network {
                warn!("本地枚举结果中出现网络矿机 {}，已忽略", descriptor.identity());
                continue;
            }

            let identity = descriptor.identity();
            let pos = match self.index.get(&identity).copied() {
                Some(pos) => pos,
                None => {
                    debug!("新增本地设备: {}", identity);
                    stats.added += 1;
                    self.push(DeviceRecord::new(identity))
                }
            };

            let record = &mut self.records[pos];
            record.name = descriptor.name.clone();
            record.driver = descriptor.driver.clone();
            record.path = descriptor.path.clone();
            record.visible = true;
        }

        for network_device in network_devices.unwrap_or_default() {
            let identity = network_device.identity();
            if self.contains(&identity) {
                continue;
            }

            debug!("新增网络设备: {}", identity);
            let mut record = DeviceRecord::new(identity);
            record.name = network_device
                .name
                .clone()
                .unwrap_or_else(|| network_device.address.clone());
            record.path = network_device.address.clone();
            record.visible = false;
            self.push(record);
            stats.added += 1;
        }

        let local_ids: HashSet<DeviceIdentity> =
            local_devices.iter().map(DeviceDescriptor::identity).collect();
        let network_ids: Option<HashSet<DeviceIdentity>> = network_devices
            .map(|devices| devices.iter().map(NetworkDevice::identity).collect());

        let before = self.records.len();
        self.records.retain(|record| {
            let found = match record.kind() {
                DeviceKind::Network => network_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&record.identity)),
                _ => local_ids.contains(&record.identity),
            };
            if !found {
                debug!("移除过期设备: {}", record.identity);
            }
            found
        });
        stats.removed = before - self.records.len();

        if stats.removed > 0 {
            self.rebuild_index();
        }

        stats.total = self.records.len();
        if stats.added > 0 || stats.removed > 0 {
            info!(
                "设备合并完成: 新增 {}, 移除 {}, 共 {} 台",
                stats.added, stats.removed, stats.total
            );
        }

        stats
    }

    /// 清除满足条件的记录的遥测、矿池状态和 worker
    pub fn clear_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&DeviceRecord) -> bool,
    {
        let mut cleared = 0;
        for record in self.records.iter_mut().filter(|r| predicate(r)) {
            record.clear_telemetry();
            cleared += 1;
        }
        debug!("已清除 {} 台设备的遥测数据", cleared);
        cleared
    }

    /// 清除所有非网络矿机的遥测
    pub fn clear_local_devices(&mut self) -> usize {
        self.clear_where(|r| r.kind() != DeviceKind::Network)
    }

    /// 清除所有网络矿机的遥测
    pub fn clear_network_devices(&mut self) -> usize {
        self.clear_where(|r| r.kind() == DeviceKind::Network)
    }
}
