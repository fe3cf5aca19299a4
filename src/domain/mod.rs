// ==========================================
// DCP 追踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod logistics;
pub mod lot;
pub mod packaging;
pub mod quality;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use logistics::{
    Courier, CourierDraft, DeliveryAgency, Shipment, ShipmentDraft, ShipmentFilter,
    ShipmentPreparation, ShipmentRow,
};
pub use lot::{Lot, LotDraft, LotFilter, LotGroup, LotMember};
pub use packaging::{
    PackagingFilter, PackagingGroupPlan, PackagingLineRecord, PackagingPlan, PackagingRecord,
    PackagingUnit, SaveReport,
};
pub use quality::{
    CardTypeEntry, QualityControl, QualityControlFilter, QualityControlRow, QualitySummary,
    VipCardRecord, VipTotals,
};
pub use types::{PackagingKind, ShipmentStatus, TestResult};
