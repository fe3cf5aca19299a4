// ==========================================
// DCP 追踪系统 - 质检领域模型
// ==========================================
// 对齐: controle_qualite 表
// ==========================================

use crate::domain::types::TestResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// QualityControl - 质检记录（每批次每卡种一条）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityControl {
    pub id: i64,
    pub lot_id: i64,
    pub card_type: String,
    pub quantity: u32,         // 该卡种数量
    pub quantity_to_test: u32, // 抽检数量
    pub control_date: NaiveDate,
    pub remark: String,
    pub result: TestResult,
}

/// 单个卡种的录入项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardTypeEntry {
    pub card_type: String,
    pub quantity: u32,
}

/// 质检列表行（关联批次名与分公司）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityControlRow {
    pub control: QualityControl,
    pub lot_name: String,
    pub subsidiary: String,
}

/// 质检列表筛选
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityControlFilter {
    pub controlled_from: Option<NaiveDate>,
    pub controlled_to: Option<NaiveDate>,
    pub lot_names: Vec<String>,
    pub subsidiaries: Vec<String>,
    pub results: Vec<TestResult>,
}

impl QualityControlFilter {
    pub fn matches(&self, row: &QualityControlRow) -> bool {
        let date = row.control.control_date;
        self.controlled_from.map_or(true, |from| date >= from)
            && self.controlled_to.map_or(true, |to| date <= to)
            && (self.lot_names.is_empty() || self.lot_names.contains(&row.lot_name))
            && (self.subsidiaries.is_empty() || self.subsidiaries.contains(&row.subsidiary))
            && (self.results.is_empty() || self.results.contains(&row.control.result))
    }
}

// ==========================================
// VipCardRecord / VipTotals - VIP 卡统计
// ==========================================

/// VIP 统计输入（来自质检记录的卡种与数量）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipCardRecord {
    pub card_type: String,
    pub quantity: u32,
}

impl VipCardRecord {
    pub fn is_gold(&self) -> bool {
        self.card_type.to_lowercase().contains("gold")
    }

    pub fn is_infinite(&self) -> bool {
        self.card_type.to_lowercase().contains("infinite")
    }

    pub fn is_vip(&self) -> bool {
        self.is_gold() || self.is_infinite()
    }
}

impl From<&QualityControl> for VipCardRecord {
    fn from(control: &QualityControl) -> Self {
        Self {
            card_type: control.card_type.clone(),
            quantity: control.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipTotals {
    pub gold_count: u64,
    pub infinite_count: u64,
    pub vip_total: u64,
    pub vip_pack_count: u64, // 1 张 VIP 卡 = 1 个包
}

/// 质检汇总指标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub total_tested: u64,
    pub success_count: usize,
    pub failure_count: usize,
}
