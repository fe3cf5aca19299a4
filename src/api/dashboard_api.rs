// ==========================================
// DCP 追踪系统 - 概览 API
// ==========================================
// 职责: 批次、质检、物流的汇总数字，以及操作日志查询
// 说明: 只提供数字，不做图表
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReferenceConfigReader;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::types::{ShipmentStatus, TestResult};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::agency_repo::AgencyRepository;
use crate::repository::lot_repo::LotRepository;
use crate::repository::quality_repo::QualityRepository;
use crate::repository::shipment_repo::ShipmentRepository;

/// 质检抽样指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingOverview {
    pub registered_cards: u64, // 质检记录中的卡片总数
    pub tested_cards: u64,     // 抽检卡片总数
    pub tested_percentage: f64, // 保留两位小数；无卡片时为 0
    pub all_passed: bool,      // 全部为 Réussite（无记录时为 true）
}

/// 已发运数（按快递公司 + 国家）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippedCount {
    pub agency: String,
    pub country: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub total_lots: i64,
    pub quantity_by_lot_type: Vec<(String, u64)>,
    pub sampling: SamplingOverview,
    pub agency_count: i64,
    pub shipped_by_agency: Vec<ShippedCount>,
}

// ==========================================
// DashboardApi - 概览 API
// ==========================================
pub struct DashboardApi {
    lot_repo: Arc<LotRepository>,
    quality_repo: Arc<QualityRepository>,
    agency_repo: Arc<AgencyRepository>,
    shipment_repo: Arc<ShipmentRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<dyn ReferenceConfigReader>,
}

impl DashboardApi {
    pub fn new(
        lot_repo: Arc<LotRepository>,
        quality_repo: Arc<QualityRepository>,
        agency_repo: Arc<AgencyRepository>,
        shipment_repo: Arc<ShipmentRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<dyn ReferenceConfigReader>,
    ) -> Self {
        Self {
            lot_repo,
            quality_repo,
            agency_repo,
            shipment_repo,
            action_log_repo,
            config,
        }
    }

    pub async fn overview(&self) -> ApiResult<DashboardOverview> {
        let lots = self.lot_repo.list_all()?;

        let mut quantity_by_lot_type: Vec<(String, u64)> = self
            .config
            .get_lot_types()
            .await?
            .into_iter()
            .map(|t| (t, 0))
            .collect();
        for lot in &lots {
            match quantity_by_lot_type
                .iter_mut()
                .find(|(t, _)| *t == lot.lot_type)
            {
                Some((_, qty)) => *qty += u64::from(lot.quantity),
                None => quantity_by_lot_type.push((lot.lot_type.clone(), u64::from(lot.quantity))),
            }
        }

        let shipped_by_agency = self
            .shipment_repo
            .count_by_agency_and_country(ShipmentStatus::Shipped)?
            .into_iter()
            .map(|(agency, country, count)| ShippedCount {
                agency,
                country,
                count,
            })
            .collect();

        Ok(DashboardOverview {
            total_lots: lots.len() as i64,
            quantity_by_lot_type,
            sampling: self.sampling_overview()?,
            agency_count: self.agency_repo.count_distinct_names()?,
            shipped_by_agency,
        })
    }

    /// 质检抽样指标
    pub fn sampling_overview(&self) -> ApiResult<SamplingOverview> {
        let controls = self.quality_repo.list_with_lots()?;

        let registered_cards: u64 = controls.iter().map(|(c, _, _)| u64::from(c.quantity)).sum();
        let tested_cards: u64 = controls
            .iter()
            .map(|(c, _, _)| u64::from(c.quantity_to_test))
            .sum();
        let all_passed = controls
            .iter()
            .all(|(c, _, _)| c.result == TestResult::Success);

        Ok(SamplingOverview {
            registered_cards,
            tested_cards,
            tested_percentage: percentage(tested_cards, registered_cards),
            all_passed,
        })
    }

    // ==========================================
    // 操作日志查询
    // ==========================================

    pub fn list_recent_actions(&self, limit: i64) -> ApiResult<Vec<ActionLog>> {
        if limit <= 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(self.action_log_repo.list_recent(limit)?)
    }

    pub fn list_actions_by_type(&self, action_type: ActionType) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.list_by_type(&action_type.to_string())?)
    }
}

/// 百分比，保留两位小数；分母为 0 时为 0
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(10, 10), 100.0);
    }
}
