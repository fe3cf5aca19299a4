// ==========================================
// DCP 追踪系统 - 批次管理 API
// ==========================================
// 职责: 批次登记、修改、删除、查询、按类型汇总
// 规则: 抽检卡数每次写入时重算；未打印 PIN 时 PIN 数强制为 0
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReferenceConfigReader;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::lot::{Lot, LotDraft, LotFilter};
use crate::engine::sampling::SamplingEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::lot_repo::LotRepository;

/// 按批次类型汇总的卡片数量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotTypeQuantities {
    /// 每个配置的批次类型一项（无批次时为 0），顺序与配置一致
    pub by_type: Vec<(String, u64)>,
    pub total: u64,
}

// ==========================================
// LotApi - 批次管理 API
// ==========================================
pub struct LotApi {
    lot_repo: Arc<LotRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<dyn ReferenceConfigReader>,
    sampling: SamplingEngine,
}

impl LotApi {
    pub fn new(
        lot_repo: Arc<LotRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<dyn ReferenceConfigReader>,
    ) -> Self {
        Self {
            lot_repo,
            action_log_repo,
            config,
            sampling: SamplingEngine::new(),
        }
    }

    /// 登记批次
    ///
    /// # 返回
    /// - Ok(Lot): 已落库的批次（含ID与抽检卡数）
    /// - Err(DuplicateRecord): 批次名已存在
    #[instrument(skip(self, draft), fields(lot_name = %draft.lot_name))]
    pub async fn register_lot(&self, draft: LotDraft, operator: &str) -> ApiResult<Lot> {
        let draft = self.validate_draft(draft).await?;

        if self.lot_repo.find_by_name(&draft.lot_name)?.is_some() {
            return Err(ApiError::DuplicateRecord(format!(
                "批次名已存在: {}",
                draft.lot_name
            )));
        }

        let cards_to_test = self.sampling.lot_cards_to_test(draft.quantity);
        let id = self.lot_repo.insert(&draft, cards_to_test)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::RegisterLot,
            operator,
            Some(json!({
                "lot_id": id,
                "lot_name": draft.lot_name,
                "quantity": draft.quantity,
                "subsidiary": draft.subsidiary,
            })),
            format!("登记批次: {}", draft.lot_name),
        ))?;

        tracing::info!(lot_id = id, cards_to_test, "批次登记完成");
        self.get_lot(id)
    }

    /// 修改批次（全字段覆盖，抽检卡数重算）
    #[instrument(skip(self, draft))]
    pub async fn update_lot(&self, id: i64, draft: LotDraft, operator: &str) -> ApiResult<Lot> {
        let draft = self.validate_draft(draft).await?;

        if let Some(existing) = self.lot_repo.find_by_name(&draft.lot_name)? {
            if existing.id != id {
                return Err(ApiError::DuplicateRecord(format!(
                    "批次名已存在: {}",
                    draft.lot_name
                )));
            }
        }

        let cards_to_test = self.sampling.lot_cards_to_test(draft.quantity);
        self.lot_repo.update(id, &draft, cards_to_test)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::UpdateLot,
            operator,
            Some(json!({ "lot_id": id, "lot_name": draft.lot_name, "quantity": draft.quantity })),
            format!("修改批次: {}", draft.lot_name),
        ))?;

        self.get_lot(id)
    }

    /// 删除批次（质检记录保留，列表中显示为未知批次）
    pub fn delete_lot(&self, id: i64, operator: &str) -> ApiResult<()> {
        let lot = self.get_lot(id)?;
        self.lot_repo.delete(id)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::DeleteLot,
            operator,
            Some(json!({ "lot_id": id, "lot_name": lot.lot_name })),
            format!("删除批次: {}", lot.lot_name),
        ))?;
        Ok(())
    }

    pub fn get_lot(&self, id: i64) -> ApiResult<Lot> {
        self.lot_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Lot(id={})不存在", id)))
    }

    /// 查询批次列表（按登记顺序）
    pub fn list_lots(&self, filter: &LotFilter) -> ApiResult<Vec<Lot>> {
        Ok(self
            .lot_repo
            .list_all()?
            .into_iter()
            .filter(|lot| filter.matches(lot))
            .collect())
    }

    /// 按批次类型汇总卡片数量
    ///
    /// 配置中的每个类型都会出现；不在配置中的历史类型追加在末尾
    pub async fn quantity_by_lot_type(&self, filter: &LotFilter) -> ApiResult<LotTypeQuantities> {
        let lot_types = self.config.get_lot_types().await?;
        let mut by_type: Vec<(String, u64)> = lot_types.into_iter().map(|t| (t, 0)).collect();

        for lot in self.list_lots(filter)? {
            match by_type.iter_mut().find(|(t, _)| *t == lot.lot_type) {
                Some((_, qty)) => *qty += u64::from(lot.quantity),
                None => by_type.push((lot.lot_type.clone(), u64::from(lot.quantity))),
            }
        }

        let total = by_type.iter().map(|(_, q)| q).sum();
        Ok(LotTypeQuantities { by_type, total })
    }

    // ==========================================
    // 校验
    // ==========================================
    async fn validate_draft(&self, mut draft: LotDraft) -> ApiResult<LotDraft> {
        draft.lot_name = draft.lot_name.trim().to_string();
        if draft.lot_name.is_empty() {
            return Err(ApiError::InvalidInput("批次名不能为空".to_string()));
        }
        if draft.quantity < 1 {
            return Err(ApiError::InvalidInput("卡片数量必须 ≥ 1".to_string()));
        }

        let lot_types = self.config.get_lot_types().await?;
        if !lot_types.contains(&draft.lot_type) {
            return Err(ApiError::InvalidInput(format!(
                "未知的批次类型: {}",
                draft.lot_type
            )));
        }

        let subsidiaries = self.config.get_subsidiaries().await?;
        if !subsidiaries.contains(&draft.subsidiary) {
            return Err(ApiError::InvalidInput(format!(
                "未知的分公司: {}",
                draft.subsidiary
            )));
        }

        if draft.pin_printing {
            if draft.pin_count < 1 {
                return Err(ApiError::InvalidInput(
                    "打印 PIN 时 PIN 数量必须 ≥ 1".to_string(),
                ));
            }
        } else {
            draft.pin_count = 0;
        }

        Ok(draft)
    }
}
