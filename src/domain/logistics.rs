// ==========================================
// DCP 追踪系统 - 物流领域模型
// ==========================================
// 对齐: agences_livraison / livreurs / references_expedition / expedition 表
// ==========================================

use crate::domain::types::ShipmentStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 快递公司（按国家）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAgency {
    pub id: i64,
    pub country: String,
    pub agency: String,
}

/// 快递员
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Courier {
    pub id: i64,
    pub agency: String,
    pub last_name: String,
    pub first_name: String,
    pub contact: String,
}

impl Courier {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierDraft {
    pub agency: String,
    pub last_name: String,
    pub first_name: String,
    pub contact: String,
}

// ==========================================
// Shipment - 发运记录（每批次至多一条）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: i64,
    pub lot_id: i64,
    pub country: String,
    pub status: ShipmentStatus,
    pub waybill: String,   // 运单号 (bordereau)
    pub reference: String, // 发运参考号
    pub agency: String,
    pub courier_id: Option<i64>,
    pub shipment_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentDraft {
    pub lot_id: i64,
    pub country: String,
    pub status: ShipmentStatus,
    pub waybill: String,
    pub reference: String,
    pub agency: String,
    pub courier_id: i64,
    pub shipment_date: NaiveDate,
}

/// 发运列表行（关联批次名与快递员姓名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRow {
    pub shipment: Shipment,
    pub lot_name: String,
    pub courier_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentFilter {
    pub countries: Vec<String>,
    pub statuses: Vec<ShipmentStatus>,
    pub agencies: Vec<String>,
    pub lot_names: Vec<String>,
    pub courier_names: Vec<String>,
    pub waybills: Vec<String>,
}

impl ShipmentFilter {
    pub fn matches(&self, row: &ShipmentRow) -> bool {
        let s = &row.shipment;
        (self.countries.is_empty() || self.countries.contains(&s.country))
            && (self.statuses.is_empty() || self.statuses.contains(&s.status))
            && (self.agencies.is_empty() || self.agencies.contains(&s.agency))
            && (self.lot_names.is_empty() || self.lot_names.contains(&row.lot_name))
            && (self.courier_names.is_empty() || self.courier_names.contains(&row.courier_name))
            && (self.waybills.is_empty() || self.waybills.contains(&s.waybill))
    }
}

/// 发运准备信息（按日期 + 国家）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentPreparation {
    pub candidate_lots: Vec<(i64, String)>,
    pub reference: String,
    pub agency: String,
    pub couriers: Vec<Courier>,
}
