// ==========================================
// DCP 追踪系统 - 质检 API
// ==========================================
// 职责: 待质检批次、质检录入、列表、汇总、修改、删除
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReferenceConfigReader;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::lot::Lot;
use crate::domain::quality::{
    CardTypeEntry, QualityControl, QualityControlFilter, QualityControlRow, QualitySummary,
};
use crate::domain::types::TestResult;
use crate::engine::sampling::SamplingEngine;
use crate::i18n;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::lot_repo::LotRepository;
use crate::repository::quality_repo::{NewQualityControl, QualityRepository};

pub struct QualityApi {
    quality_repo: Arc<QualityRepository>,
    lot_repo: Arc<LotRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<dyn ReferenceConfigReader>,
    sampling: SamplingEngine,
}

impl QualityApi {
    pub fn new(
        quality_repo: Arc<QualityRepository>,
        lot_repo: Arc<LotRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<dyn ReferenceConfigReader>,
    ) -> Self {
        Self {
            quality_repo,
            lot_repo,
            action_log_repo,
            config,
            sampling: SamplingEngine::new(),
        }
    }

    /// 尚无质检记录的批次
    pub fn list_uncontrolled_lots(&self) -> ApiResult<Vec<Lot>> {
        let controlled: HashSet<i64> = self.quality_repo.controlled_lot_ids()?.into_iter().collect();
        Ok(self
            .lot_repo
            .list_all()?
            .into_iter()
            .filter(|lot| !controlled.contains(&lot.id))
            .collect())
    }

    /// 录入一次质检（每个卡种一条记录）
    ///
    /// # 参数
    /// - entries: 本次选择的卡种及数量（同一次录入内卡种不可重复）
    /// - remark: 为空时使用配置的默认备注
    ///
    /// # 返回
    /// 已落库的质检记录（抽检数量已按卡种数规则计算）
    #[instrument(skip(self, entries, remark), fields(entries = entries.len()))]
    pub async fn record_control(
        &self,
        lot_id: i64,
        entries: &[CardTypeEntry],
        remark: Option<&str>,
        result: TestResult,
        control_date: NaiveDate,
        operator: &str,
    ) -> ApiResult<Vec<QualityControl>> {
        let lot = self
            .lot_repo
            .find_by_id(lot_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Lot(id={})不存在", lot_id)))?;

        if entries.is_empty() {
            return Err(ApiError::InvalidInput("至少选择一个卡种".to_string()));
        }

        let card_types = self.config.get_card_types().await?;
        let mut seen = HashSet::new();
        for entry in entries {
            if !card_types.contains(&entry.card_type) {
                return Err(ApiError::InvalidInput(format!(
                    "未知的卡种: {}",
                    entry.card_type
                )));
            }
            if !seen.insert(entry.card_type.as_str()) {
                return Err(ApiError::InvalidInput(format!(
                    "卡种重复: {}",
                    entry.card_type
                )));
            }
            if entry.quantity < 1 {
                return Err(ApiError::InvalidInput(format!(
                    "卡种 {} 数量必须 ≥ 1",
                    entry.card_type
                )));
            }
        }

        let requested: u64 = entries.iter().map(|e| u64::from(e.quantity)).sum();
        self.ensure_within_lot(&lot, None, requested)?;

        let remark = self.resolve_remark(remark).await?;
        let (sizes, total_to_test) = self.sampling.sample_sizes(entries);

        let new_controls: Vec<NewQualityControl> = entries
            .iter()
            .zip(sizes)
            .map(|(entry, quantity_to_test)| NewQualityControl {
                lot_id,
                card_type: entry.card_type.clone(),
                quantity: entry.quantity,
                quantity_to_test,
                control_date,
                remark: remark.clone(),
                result,
            })
            .collect();

        let ids = self.quality_repo.insert_batch(&new_controls)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::RecordQualityControl,
            operator,
            Some(json!({
                "lot_id": lot_id,
                "card_types": entries.iter().map(|e| e.card_type.as_str()).collect::<Vec<_>>(),
                "quantity_to_test": total_to_test,
                "result": result.to_db_str(),
            })),
            format!("质检录入: {}", lot.lot_name),
        ))?;

        tracing::info!(lot_id, records = ids.len(), total_to_test, "质检录入完成");

        Ok(ids
            .into_iter()
            .zip(new_controls)
            .map(|(id, c)| QualityControl {
                id,
                lot_id: c.lot_id,
                card_type: c.card_type,
                quantity: c.quantity,
                quantity_to_test: c.quantity_to_test,
                control_date: c.control_date,
                remark: c.remark,
                result: c.result,
            })
            .collect())
    }

    /// 质检列表（关联批次名与分公司，批次已删除时显示未知）
    pub fn list_controls(&self, filter: &QualityControlFilter) -> ApiResult<Vec<QualityControlRow>> {
        let unknown = i18n::t("lot.unknown");
        Ok(self
            .quality_repo
            .list_with_lots()?
            .into_iter()
            .map(|(control, lot_name, subsidiary)| QualityControlRow {
                control,
                lot_name: lot_name.unwrap_or_else(|| unknown.clone()),
                subsidiary: subsidiary.unwrap_or_else(|| unknown.clone()),
            })
            .filter(|row| filter.matches(row))
            .collect())
    }

    /// 汇总指标：抽检总数、成功数、失败数
    pub fn summarize(&self, rows: &[QualityControlRow]) -> QualitySummary {
        rows.iter().fold(QualitySummary::default(), |mut acc, row| {
            acc.total_tested += u64::from(row.control.quantity_to_test);
            match row.control.result {
                TestResult::Success => acc.success_count += 1,
                TestResult::Failure => acc.failure_count += 1,
            }
            acc
        })
    }

    /// 修改质检记录
    pub fn update_control(&self, control: &QualityControl, operator: &str) -> ApiResult<()> {
        if control.quantity < 1 {
            return Err(ApiError::InvalidInput("卡种数量必须 ≥ 1".to_string()));
        }
        if control.quantity_to_test > control.quantity {
            return Err(ApiError::InvalidInput(format!(
                "抽检数量 {} 超过卡种数量 {}",
                control.quantity_to_test, control.quantity
            )));
        }

        // 批次已删除的孤立记录不做数量校验
        if let Some(lot) = self.lot_repo.find_by_id(control.lot_id)? {
            self.ensure_within_lot(&lot, Some(control.id), u64::from(control.quantity))?;
        }

        self.quality_repo.update(control)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::UpdateQualityControl,
            operator,
            serde_json::to_value(control).ok(),
            format!("修改质检记录: id={}", control.id),
        ))?;
        Ok(())
    }

    pub fn delete_control(&self, id: i64, operator: &str) -> ApiResult<()> {
        self.quality_repo.delete(id)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::DeleteQualityControl,
            operator,
            Some(json!({ "control_id": id })),
            format!("删除质检记录: id={}", id),
        ))?;
        Ok(())
    }

    /// 批次内各卡种数量之和不得超过批次数量
    ///
    /// # 参数
    /// - excluded_id: 正在修改的记录，不计入已录入数量
    /// - requested: 本次录入（或修改后）的卡数
    fn ensure_within_lot(
        &self,
        lot: &Lot,
        excluded_id: Option<i64>,
        requested: u64,
    ) -> ApiResult<()> {
        let recorded: u64 = self
            .quality_repo
            .find_by_lot_ids(&[lot.id])?
            .iter()
            .filter(|c| Some(c.id) != excluded_id)
            .map(|c| u64::from(c.quantity))
            .sum();

        if recorded + requested > u64::from(lot.quantity) {
            return Err(ApiError::BusinessRuleViolation(format!(
                "质检卡数超过批次数量: lot={}, 已录入={}, 本次={}, 批次数量={}",
                lot.lot_name, recorded, requested, lot.quantity
            )));
        }
        Ok(())
    }

    async fn resolve_remark(&self, remark: Option<&str>) -> ApiResult<String> {
        match remark.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => Ok(r.to_string()),
            None => Ok(self.config.get_default_remark().await?),
        }
    }
}
