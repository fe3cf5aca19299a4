// ==========================================
// DCP 追踪系统 - 包装领域模型
// ==========================================
// 对齐: conditionnement 表
// ==========================================

use crate::domain::lot::LotGroup;
use crate::domain::quality::VipTotals;
use crate::domain::types::PackagingKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// PackagingUnit - 包装单元（分配引擎输出）
// ==========================================
// 约束: card_count > 0; Crate ≤ 分公司容量; Envelope ≤ 150
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingUnit {
    pub packaging_kind: PackagingKind,
    pub card_count: u32,
}

impl PackagingUnit {
    pub fn envelope(card_count: u32) -> Self {
        Self {
            packaging_kind: PackagingKind::Envelope,
            card_count,
        }
    }

    pub fn crate_of(card_count: u32) -> Self {
        Self {
            packaging_kind: PackagingKind::Crate,
            card_count,
        }
    }
}

// ==========================================
// PackagingLineRecord - 包装明细行（每个单元一行）
// ==========================================
// 同组每行重复相同的 VIP 合计（沿用现有报表口径）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingLineRecord {
    pub lot_names_joined: String,
    pub lot_type: String,
    pub subsidiary: String,
    pub card_count: u32,
    pub vip_card_count: u64,
    pub vip_pack_count: u64,
    pub packaging_kind: PackagingKind,
    pub remark: String,
}

// ==========================================
// PackagingPlan - 某日某分公司的包装方案
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingGroupPlan {
    pub group: LotGroup,
    pub vip_totals: VipTotals,
    pub non_vip_quantity: u64,
    pub lines: Vec<PackagingLineRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingPlan {
    pub packaging_date: NaiveDate,
    pub subsidiary: String,
    pub groups: Vec<PackagingGroupPlan>,
}

impl PackagingPlan {
    pub fn line_count(&self) -> usize {
        self.groups.iter().map(|g| g.lines.len()).sum()
    }

    /// 只修改备注（操作员唯一可编辑字段）
    ///
    /// # 返回
    /// - true: 修改成功
    /// - false: 行号越界
    pub fn set_remark(&mut self, group_idx: usize, line_idx: usize, remark: &str) -> bool {
        match self
            .groups
            .get_mut(group_idx)
            .and_then(|g| g.lines.get_mut(line_idx))
        {
            Some(line) => {
                line.remark = remark.to_string();
                true
            }
            None => false,
        }
    }
}

// ==========================================
// PackagingRecord - 已落库的包装记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingRecord {
    pub id: i64,
    pub lot_names_joined: String,
    pub lot_type: String,
    pub subsidiary: String,
    pub packaging_kind: PackagingKind,
    pub card_count: u32,
    pub vip_card_count: u64,
    pub vip_pack_count: u64,
    pub packaging_date: NaiveDate,
    pub unit_seq: u32, // 组内单元序号（从 1 开始），参与唯一键
    pub operator: String,
    pub remark: String,
}

/// 包装台账筛选
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackagingFilter {
    pub packaged_from: Option<NaiveDate>,
    pub packaged_to: Option<NaiveDate>,
    pub subsidiaries: Vec<String>,
    pub lot_types: Vec<String>,
    pub kinds: Vec<PackagingKind>,
    pub operators: Vec<String>,
}

impl PackagingFilter {
    pub fn matches(&self, record: &PackagingRecord) -> bool {
        let date = record.packaging_date;
        self.packaged_from.map_or(true, |from| date >= from)
            && self.packaged_to.map_or(true, |to| date <= to)
            && (self.subsidiaries.is_empty() || self.subsidiaries.contains(&record.subsidiary))
            && (self.lot_types.is_empty() || self.lot_types.contains(&record.lot_type))
            && (self.kinds.is_empty() || self.kinds.contains(&record.packaging_kind))
            && (self.operators.is_empty() || self.operators.contains(&record.operator))
    }
}

/// 保存结果：重复记录跳过但不视为失败
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveReport {
    pub inserted: usize,
    pub duplicates: Vec<String>,
    pub vip_only_groups: Vec<String>, // 全部为 VIP 卡、没有包装行的批次类型
}
