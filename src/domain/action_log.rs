// ==========================================
// DCP 追踪系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,         // uuid v4
    pub action_type: String,       // 存储为字符串，见 ActionType
    pub action_ts: NaiveDateTime,  // 操作时间戳
    pub actor: String,             // 操作人
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl ActionLog {
    /// 以当前本地时间构造日志
    pub fn now(
        action_type: ActionType,
        actor: &str,
        payload_json: Option<JsonValue>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.to_string(),
            payload_json,
            detail: Some(detail.into()),
        }
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    RegisterLot,
    UpdateLot,
    DeleteLot,
    RecordQualityControl,
    UpdateQualityControl,
    DeleteQualityControl,
    SavePackaging,
    UpdatePackaging,
    DeletePackaging,
    ClearPackaging,
    UpsertAgency,
    DeleteAgency,
    UpsertCourier,
    DeleteCourier,
    SetShipmentReference,
    CreateShipment,
    UpdateShipmentStatus,
    DeleteShipment,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::RegisterLot => "REGISTER_LOT",
            ActionType::UpdateLot => "UPDATE_LOT",
            ActionType::DeleteLot => "DELETE_LOT",
            ActionType::RecordQualityControl => "RECORD_QUALITY_CONTROL",
            ActionType::UpdateQualityControl => "UPDATE_QUALITY_CONTROL",
            ActionType::DeleteQualityControl => "DELETE_QUALITY_CONTROL",
            ActionType::SavePackaging => "SAVE_PACKAGING",
            ActionType::UpdatePackaging => "UPDATE_PACKAGING",
            ActionType::DeletePackaging => "DELETE_PACKAGING",
            ActionType::ClearPackaging => "CLEAR_PACKAGING",
            ActionType::UpsertAgency => "UPSERT_AGENCY",
            ActionType::DeleteAgency => "DELETE_AGENCY",
            ActionType::UpsertCourier => "UPSERT_COURIER",
            ActionType::DeleteCourier => "DELETE_COURIER",
            ActionType::SetShipmentReference => "SET_SHIPMENT_REFERENCE",
            ActionType::CreateShipment => "CREATE_SHIPMENT",
            ActionType::UpdateShipmentStatus => "UPDATE_SHIPMENT_STATUS",
            ActionType::DeleteShipment => "DELETE_SHIPMENT",
        };
        write!(f, "{}", s)
    }
}
