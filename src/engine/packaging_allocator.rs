// ==========================================
// DCP 追踪系统 - 包装分配引擎
// ==========================================
// 职责: 卡片数量 → 确定性的包装方案
// 输入: 非 VIP 卡数 + 分公司 / 质检 VIP 记录
// 输出: PackagingUnit 序列 + PackagingLineRecord 明细
// 红线: 纯函数，无 I/O，无内部计数器/时间戳
// ==========================================

use crate::domain::lot::LotGroup;
use crate::domain::packaging::{PackagingLineRecord, PackagingUnit};
use crate::domain::quality::{VipCardRecord, VipTotals};
use tracing::instrument;

/// 信封上限：剩余量 ≤ 该值时改用信封
pub const ENVELOPE_THRESHOLD: u64 = 150;

/// 默认包裹容量
pub const DEFAULT_CRATE_CAPACITY: u32 = 500;

/// 塞内加尔包裹容量
pub const SENEGAL_CRATE_CAPACITY: u32 = 249;

/// 操作员未填写备注时的默认值
pub const DEFAULT_REMARK: &str = "RAS";

// ==========================================
// PackagingAllocator - 包装分配引擎
// ==========================================
#[derive(Debug, Default)]
pub struct PackagingAllocator {
    // 无状态引擎
}

impl PackagingAllocator {
    pub fn new() -> Self {
        Self {}
    }

    /// 分公司包裹容量
    ///
    /// 仅当分公司名（大小写不敏感）等于 "sénégal" 时为 249，其余为 500
    pub fn crate_capacity(subsidiary: &str) -> u32 {
        if subsidiary.to_lowercase() == "sénégal" {
            SENEGAL_CRATE_CAPACITY
        } else {
            DEFAULT_CRATE_CAPACITY
        }
    }

    /// 统计 VIP 卡数与 VIP 包数
    ///
    /// # 规则
    /// - gold: 卡种名包含 "gold"（大小写不敏感）
    /// - infinite: 卡种名包含 "infinite"（大小写不敏感）
    /// - vip_pack_count = vip_total（1:1，不合并）
    ///
    /// 调用方负责先按批次归属过滤记录
    pub fn compute_vip_totals(&self, vip_records: &[VipCardRecord]) -> VipTotals {
        let gold_count: u64 = vip_records
            .iter()
            .filter(|r| r.is_gold())
            .map(|r| u64::from(r.quantity))
            .sum();
        let infinite_count: u64 = vip_records
            .iter()
            .filter(|r| r.is_infinite())
            .map(|r| u64::from(r.quantity))
            .sum();
        let vip_total = gold_count + infinite_count;

        VipTotals {
            gold_count,
            infinite_count,
            vip_total,
            vip_pack_count: vip_total,
        }
    }

    /// 贪心分配包装单元
    ///
    /// # 规则
    /// 1) 剩余量 ≤ 150: 发出一个信封装下全部剩余
    /// 2) 否则发出一个包裹，装 min(容量, 剩余量)
    ///
    /// 先判断信封阈值再判断包裹，因此剩余恰好 150 时也用信封。
    /// 数量为 0 时返回空序列（不是一个空信封）。
    ///
    /// # 不变量
    /// 所有单元 card_count 之和 == total_quantity
    #[instrument(skip(self))]
    pub fn allocate_packaging(&self, total_quantity: u64, subsidiary: &str) -> Vec<PackagingUnit> {
        let capacity = u64::from(Self::crate_capacity(subsidiary));
        let mut units = Vec::new();
        let mut remaining = total_quantity;

        while remaining > 0 {
            if remaining <= ENVELOPE_THRESHOLD {
                // remaining ≤ 150，转换无损
                units.push(PackagingUnit::envelope(remaining as u32));
                remaining = 0;
            } else {
                let packed = capacity.min(remaining);
                units.push(PackagingUnit::crate_of(packed as u32));
                remaining -= packed;
            }
        }

        tracing::debug!(units = units.len(), capacity, "包装分配完成");
        units
    }

    /// 生成包装明细行
    ///
    /// - 每个单元一行，备注按下标对齐；缺失或空白备注取 "RAS"
    /// - VIP 合计在同组每一行重复
    /// - 批次名按分组顺序以 ", " 连接
    pub fn build_packaging_lines(
        &self,
        lot_group: &LotGroup,
        vip_totals: &VipTotals,
        packaging_units: &[PackagingUnit],
        subsidiary: &str,
        remarks: &[String],
    ) -> Vec<PackagingLineRecord> {
        let lot_names_joined = lot_group.joined_lot_names();

        packaging_units
            .iter()
            .enumerate()
            .map(|(idx, unit)| PackagingLineRecord {
                lot_names_joined: lot_names_joined.clone(),
                lot_type: lot_group.lot_type.clone(),
                subsidiary: subsidiary.to_string(),
                card_count: unit.card_count,
                vip_card_count: vip_totals.vip_total,
                vip_pack_count: vip_totals.vip_pack_count,
                packaging_kind: unit.packaging_kind,
                remark: remarks
                    .get(idx)
                    .map(|r| r.trim())
                    .filter(|r| !r.is_empty())
                    .unwrap_or(DEFAULT_REMARK)
                    .to_string(),
            })
            .collect()
    }
}
