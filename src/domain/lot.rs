// ==========================================
// DCP 追踪系统 - 生产批次领域模型
// ==========================================
// 对齐: lots 表
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Lot - 生产批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: i64,
    pub lot_name: String,            // 批次名（唯一）
    pub lot_type: String,            // 批次类型（Ordinaire / Émission instantanée / ...）
    pub quantity: u32,               // 卡片总数 (≥1)
    pub production_date: NaiveDate,  // 生产日期
    pub registration_date: NaiveDate, // 登记日期
    pub subsidiary: String,          // 分公司（国家）
    pub pin_printing: bool,          // 是否打印 PIN
    pub pin_count: u32,              // PIN 数量（未打印时为 0）
    pub cards_to_test: u32,          // 应抽检卡数
}

// ==========================================
// LotDraft - 新建/修改批次的输入
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotDraft {
    pub lot_name: String,
    pub lot_type: String,
    pub quantity: u32,
    pub production_date: NaiveDate,
    pub registration_date: NaiveDate,
    pub subsidiary: String,
    pub pin_printing: bool,
    pub pin_count: u32,
}

// ==========================================
// LotMember / LotGroup - 包装分组输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotMember {
    pub lot_id: i64,
    pub lot_name: String,
    pub quantity: u32,
}

/// 同一分公司、同一日期、同一批次类型的批次集合
///
/// 约束: member_lots 非空（由分组方保证）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotGroup {
    pub lot_type: String,
    pub member_lots: Vec<LotMember>,
}

impl LotGroup {
    /// 组内卡片总数
    pub fn total_quantity(&self) -> u64 {
        self.member_lots.iter().map(|m| u64::from(m.quantity)).sum()
    }

    pub fn lot_ids(&self) -> Vec<i64> {
        self.member_lots.iter().map(|m| m.lot_id).collect()
    }

    /// 组内批次名，按分组顺序以 ", " 连接
    pub fn joined_lot_names(&self) -> String {
        self.member_lots
            .iter()
            .map(|m| m.lot_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<&Lot> for LotMember {
    fn from(lot: &Lot) -> Self {
        Self {
            lot_id: lot.id,
            lot_name: lot.lot_name.clone(),
            quantity: lot.quantity,
        }
    }
}

// ==========================================
// LotFilter - 批次列表筛选
// ==========================================
// 空列表表示不过滤
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotFilter {
    pub registered_from: Option<NaiveDate>,
    pub registered_to: Option<NaiveDate>,
    pub subsidiaries: Vec<String>,
    pub lot_types: Vec<String>,
}

impl LotFilter {
    pub fn matches(&self, lot: &Lot) -> bool {
        if let Some(from) = self.registered_from {
            if lot.registration_date < from {
                return false;
            }
        }
        if let Some(to) = self.registered_to {
            if lot.registration_date > to {
                return false;
            }
        }
        (self.subsidiaries.is_empty() || self.subsidiaries.contains(&lot.subsidiary))
            && (self.lot_types.is_empty() || self.lot_types.contains(&lot.lot_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, name: &str, quantity: u32) -> LotMember {
        LotMember {
            lot_id: id,
            lot_name: name.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_group_totals_and_names() {
        let group = LotGroup {
            lot_type: "Ordinaire".to_string(),
            member_lots: vec![member(3, "ML-003", 120), member(1, "ML-001", 80)],
        };
        assert_eq!(group.total_quantity(), 200);
        assert_eq!(group.lot_ids(), vec![3, 1]);
        assert_eq!(group.joined_lot_names(), "ML-003, ML-001");
    }
}
