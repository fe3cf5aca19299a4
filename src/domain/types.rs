// ==========================================
// DCP 追踪系统 - 领域类型定义
// ==========================================
// 数据库存储值沿用业务现场的法语取值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 包装类型 (Packaging Kind)
// ==========================================
// 存储值: "Enveloppe" / "Paquet"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackagingKind {
    Envelope, // 信封（≤150 张）
    Crate,    // 包裹（≤分公司容量）
}

impl PackagingKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PackagingKind::Envelope => "Enveloppe",
            PackagingKind::Crate => "Paquet",
        }
    }

    /// 从存储值解析，未知值返回 None
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Enveloppe" => Some(PackagingKind::Envelope),
            "Paquet" => Some(PackagingKind::Crate),
            _ => None,
        }
    }
}

impl fmt::Display for PackagingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 质检结果 (Test Result)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestResult {
    Success, // Réussite
    Failure, // Échec
}

impl TestResult {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TestResult::Success => "Réussite",
            TestResult::Failure => "Échec",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Réussite" => Some(TestResult::Success),
            "Échec" => Some(TestResult::Failure),
            _ => None,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 发运状态 (Shipment Status)
// ==========================================
// 顺序: Pending < InTransit < Shipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Pending,   // En attente
    InTransit, // En cours d'expédition
    Shipped,   // Expédié
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 3] = [
        ShipmentStatus::Pending,
        ShipmentStatus::InTransit,
        ShipmentStatus::Shipped,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "En attente",
            ShipmentStatus::InTransit => "En cours d'expédition",
            ShipmentStatus::Shipped => "Expédié",
        }
    }

    /// 解析存储值（大小写不敏感，兼容历史数据中的小写 "expédié"）
    pub fn from_db_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.to_db_str().to_lowercase() == lower)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packaging_kind_db_values() {
        assert_eq!(PackagingKind::Crate.to_db_str(), "Paquet");
        assert_eq!(PackagingKind::from_db_str("Enveloppe"), Some(PackagingKind::Envelope));
        assert_eq!(PackagingKind::from_db_str("Carton"), None);
    }

    #[test]
    fn test_shipment_status_case_insensitive() {
        assert_eq!(ShipmentStatus::from_db_str("expédié"), Some(ShipmentStatus::Shipped));
        assert_eq!(
            ShipmentStatus::from_db_str("En cours d'expédition"),
            Some(ShipmentStatus::InTransit)
        );
        assert_eq!(ShipmentStatus::from_db_str("Perdu"), None);
    }

    #[test]
    fn test_test_result_round_values() {
        assert_eq!(TestResult::from_db_str("Échec"), Some(TestResult::Failure));
        assert_eq!(TestResult::Success.to_string(), "Réussite");
    }
}
