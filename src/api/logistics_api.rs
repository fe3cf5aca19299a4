// ==========================================
// DCP 追踪系统 - 物流 API
// ==========================================
// 职责: 快递公司、快递员、发运参考号、发运记录
// 红线: 每个批次至多一条发运记录；发运必须指定批次与快递员
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReferenceConfigReader;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::logistics::{
    Courier, CourierDraft, DeliveryAgency, ShipmentDraft, ShipmentFilter, ShipmentPreparation,
    ShipmentRow,
};
use crate::domain::types::ShipmentStatus;
use crate::i18n;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::agency_repo::AgencyRepository;
use crate::repository::courier_repo::CourierRepository;
use crate::repository::error::RepositoryError;
use crate::repository::lot_repo::LotRepository;
use crate::repository::shipment_repo::ShipmentRepository;

pub struct LogisticsApi {
    agency_repo: Arc<AgencyRepository>,
    courier_repo: Arc<CourierRepository>,
    shipment_repo: Arc<ShipmentRepository>,
    lot_repo: Arc<LotRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<dyn ReferenceConfigReader>,
}

impl LogisticsApi {
    pub fn new(
        agency_repo: Arc<AgencyRepository>,
        courier_repo: Arc<CourierRepository>,
        shipment_repo: Arc<ShipmentRepository>,
        lot_repo: Arc<LotRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<dyn ReferenceConfigReader>,
    ) -> Self {
        Self {
            agency_repo,
            courier_repo,
            shipment_repo,
            lot_repo,
            action_log_repo,
            config,
        }
    }

    // ==========================================
    // 快递公司
    // ==========================================

    /// 新增快递公司
    ///
    /// # 返回
    /// - Err(DuplicateRecord): 同一国家下名称已存在
    pub async fn add_agency(&self, country: &str, agency: &str, operator: &str) -> ApiResult<i64> {
        let agency = agency.trim();
        if agency.is_empty() {
            return Err(ApiError::InvalidInput("快递公司名称不能为空".to_string()));
        }
        self.ensure_known_country(country).await?;

        let id = self.agency_repo.insert(country, agency).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(_) => ApiError::DuplicateRecord(format!(
                "快递公司已存在: {} / {}",
                country, agency
            )),
            other => other.into(),
        })?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::UpsertAgency,
            operator,
            Some(json!({ "agency_id": id, "country": country, "agency": agency })),
            format!("新增快递公司: {} / {}", country, agency),
        ))?;
        Ok(id)
    }

    /// 重命名快递公司（按 国家 + 原名称 定位）
    pub fn rename_agency(
        &self,
        country: &str,
        old_name: &str,
        new_name: &str,
        operator: &str,
    ) -> ApiResult<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ApiError::InvalidInput("快递公司名称不能为空".to_string()));
        }
        self.agency_repo.rename(country, old_name, new_name)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::UpsertAgency,
            operator,
            Some(json!({ "country": country, "old_name": old_name, "new_name": new_name })),
            format!("重命名快递公司: {} / {} -> {}", country, old_name, new_name),
        ))?;
        Ok(())
    }

    pub fn delete_agency(&self, id: i64, operator: &str) -> ApiResult<()> {
        self.agency_repo.delete(id)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::DeleteAgency,
            operator,
            Some(json!({ "agency_id": id })),
            format!("删除快递公司: id={}", id),
        ))?;
        Ok(())
    }

    pub fn list_agencies(&self) -> ApiResult<Vec<DeliveryAgency>> {
        Ok(self.agency_repo.list_all()?)
    }

    pub fn first_agency_of(&self, country: &str) -> ApiResult<Option<String>> {
        Ok(self.agency_repo.first_agency_of(country)?)
    }

    // ==========================================
    // 快递员
    // ==========================================

    /// 新增快递员（所属快递公司必须已登记）
    pub fn add_courier(&self, draft: &CourierDraft, operator: &str) -> ApiResult<i64> {
        self.validate_courier(draft)?;

        let id = self.courier_repo.insert(draft).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(_) => ApiError::DuplicateRecord(format!(
                "快递员 {} {} 已存在于 {}",
                draft.last_name, draft.first_name, draft.agency
            )),
            other => other.into(),
        })?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::UpsertCourier,
            operator,
            Some(json!({ "courier_id": id, "agency": draft.agency })),
            format!("新增快递员: {} {}", draft.last_name, draft.first_name),
        ))?;
        Ok(id)
    }

    pub fn update_courier(&self, id: i64, draft: &CourierDraft, operator: &str) -> ApiResult<()> {
        self.validate_courier(draft)?;
        self.courier_repo.update(id, draft)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::UpsertCourier,
            operator,
            Some(json!({ "courier_id": id, "agency": draft.agency })),
            format!("修改快递员: {} {}", draft.last_name, draft.first_name),
        ))?;
        Ok(())
    }

    pub fn delete_courier(&self, id: i64, operator: &str) -> ApiResult<()> {
        self.courier_repo.delete(id)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::DeleteCourier,
            operator,
            Some(json!({ "courier_id": id })),
            format!("删除快递员: id={}", id),
        ))?;
        Ok(())
    }

    pub fn list_couriers(&self) -> ApiResult<Vec<Courier>> {
        Ok(self.courier_repo.list_all()?)
    }

    pub fn list_couriers_by_agency(&self, agency: &str) -> ApiResult<Vec<Courier>> {
        Ok(self.courier_repo.list_by_agency(agency)?)
    }

    // ==========================================
    // 发运参考号
    // ==========================================

    /// 设置国家的发运参考号（覆盖）
    pub async fn set_shipment_reference(
        &self,
        country: &str,
        reference: &str,
        operator: &str,
    ) -> ApiResult<()> {
        self.ensure_known_country(country).await?;
        if reference.trim().is_empty() {
            return Err(ApiError::InvalidInput("发运参考号不能为空".to_string()));
        }
        self.shipment_repo.upsert_reference(country, reference.trim())?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::SetShipmentReference,
            operator,
            Some(json!({ "country": country, "reference": reference.trim() })),
            format!("设置发运参考号: {}", country),
        ))?;
        Ok(())
    }

    /// 国家的发运参考号；未配置时返回占位文字
    pub fn shipment_reference(&self, country: &str) -> ApiResult<String> {
        Ok(self
            .shipment_repo
            .find_reference(country)?
            .unwrap_or_else(|| i18n::t("shipment.reference_unavailable")))
    }

    // ==========================================
    // 发运记录
    // ==========================================

    /// 发运准备：当日该国家的批次、参考号、快递公司及其快递员
    #[instrument(skip(self))]
    pub fn prepare_shipment(&self, date: NaiveDate, country: &str) -> ApiResult<ShipmentPreparation> {
        let candidate_lots = self
            .lot_repo
            .find_by_date_and_subsidiary(date, country)?
            .into_iter()
            .map(|lot| (lot.id, lot.lot_name))
            .collect();

        let reference = self.shipment_reference(country)?;

        let (agency, couriers) = match self.agency_repo.first_agency_of(country)? {
            Some(agency) => {
                let couriers = self.courier_repo.list_by_agency(&agency)?;
                (agency, couriers)
            }
            None => (i18n::t("shipment.agency_undefined"), Vec::new()),
        };

        Ok(ShipmentPreparation {
            candidate_lots,
            reference,
            agency,
            couriers,
        })
    }

    /// 登记发运
    ///
    /// # 返回
    /// - Err(NotFound): 批次或快递员不存在
    /// - Err(DuplicateRecord): 该批次已登记发运
    #[instrument(skip(self, draft), fields(lot_id = draft.lot_id))]
    pub fn create_shipment(&self, draft: &ShipmentDraft, operator: &str) -> ApiResult<i64> {
        let lot = self
            .lot_repo
            .find_by_id(draft.lot_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Lot(id={})不存在", draft.lot_id)))?;
        let courier = self
            .courier_repo
            .find_by_id(draft.courier_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Courier(id={})不存在", draft.courier_id)))?;

        if self.shipment_repo.find_by_lot_id(draft.lot_id)?.is_some() {
            return Err(ApiError::DuplicateRecord(format!(
                "批次已登记发运: {}",
                lot.lot_name
            )));
        }

        let id = self.shipment_repo.insert(draft)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::CreateShipment,
            operator,
            Some(json!({
                "shipment_id": id,
                "lot_id": draft.lot_id,
                "country": draft.country,
                "status": draft.status.to_db_str(),
                "courier_id": draft.courier_id,
            })),
            format!("登记发运: {} ({})", lot.lot_name, courier.display_name()),
        ))?;

        tracing::info!(shipment_id = id, "发运登记完成");
        Ok(id)
    }

    /// 发运列表（批次缺失显示未知，快递员缺失显示未指派）
    pub fn list_shipments(&self, filter: &ShipmentFilter) -> ApiResult<Vec<ShipmentRow>> {
        let unknown = i18n::t("lot.unknown");
        let unassigned = i18n::t("shipment.courier_unassigned");
        Ok(self
            .shipment_repo
            .list_with_names()?
            .into_iter()
            .map(|(shipment, lot_name, courier_name)| ShipmentRow {
                shipment,
                lot_name: lot_name.unwrap_or_else(|| unknown.clone()),
                courier_name: courier_name.unwrap_or_else(|| unassigned.clone()),
            })
            .filter(|row| filter.matches(row))
            .collect())
    }

    /// 各状态发运数（三个状态都会出现）
    pub fn status_counts(&self) -> ApiResult<Vec<(ShipmentStatus, i64)>> {
        let mut counts: Vec<(ShipmentStatus, i64)> =
            ShipmentStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for (raw, n) in self.shipment_repo.count_by_status()? {
            match ShipmentStatus::from_db_str(&raw) {
                Some(status) => {
                    if let Some(slot) = counts.iter_mut().find(|(s, _)| *s == status) {
                        slot.1 += n;
                    }
                }
                None => tracing::warn!(status = %raw, "忽略无法识别的发运状态"),
            }
        }
        Ok(counts)
    }

    /// 各快递公司发运数（降序）
    pub fn counts_by_agency(&self) -> ApiResult<Vec<(String, i64)>> {
        Ok(self.shipment_repo.count_by_agency()?)
    }

    pub fn update_shipment_status(
        &self,
        id: i64,
        status: ShipmentStatus,
        operator: &str,
    ) -> ApiResult<()> {
        self.shipment_repo.update_status(id, status)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::UpdateShipmentStatus,
            operator,
            Some(json!({ "shipment_id": id, "status": status.to_db_str() })),
            format!("更新发运状态: id={} -> {}", id, status),
        ))?;
        Ok(())
    }

    pub fn delete_shipment(&self, id: i64, operator: &str) -> ApiResult<()> {
        self.shipment_repo.delete(id)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::DeleteShipment,
            operator,
            Some(json!({ "shipment_id": id })),
            format!("删除发运记录: id={}", id),
        ))?;
        Ok(())
    }

    // ==========================================
    // 校验
    // ==========================================

    async fn ensure_known_country(&self, country: &str) -> ApiResult<()> {
        let subsidiaries = self.config.get_subsidiaries().await?;
        if subsidiaries.iter().any(|s| s == country) {
            Ok(())
        } else {
            Err(ApiError::InvalidInput(format!("未知的国家: {}", country)))
        }
    }

    fn validate_courier(&self, draft: &CourierDraft) -> ApiResult<()> {
        if draft.last_name.trim().is_empty() || draft.first_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("快递员姓名不能为空".to_string()));
        }
        let known = self
            .agency_repo
            .list_all()?
            .iter()
            .any(|a| a.agency == draft.agency);
        if !known {
            return Err(ApiError::InvalidInput(format!(
                "未登记的快递公司: {}",
                draft.agency
            )));
        }
        Ok(())
    }
}
