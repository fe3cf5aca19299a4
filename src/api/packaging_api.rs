// ==========================================
// DCP 追踪系统 - 包装 API
// ==========================================
// 职责: 生成包装方案、保存方案、包装台账维护、CSV 导出
// 红线: 重复记录跳过并上报，不中断保存
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::packaging::{PackagingFilter, PackagingPlan, PackagingRecord, SaveReport};
use crate::domain::types::PackagingKind;
use crate::engine::packaging_planner::PackagingPlanner;
use crate::exporter::PackagingCsvExporter;
use crate::i18n;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::lot_repo::LotRepository;
use crate::repository::packaging_repo::{LineInsertOutcome, PackagingRepository};
use crate::repository::quality_repo::QualityRepository;

// ==========================================
// PackagingApi - 包装 API
// ==========================================
pub struct PackagingApi {
    lot_repo: Arc<LotRepository>,
    quality_repo: Arc<QualityRepository>,
    packaging_repo: Arc<PackagingRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    planner: PackagingPlanner,
    exporter: PackagingCsvExporter,
}

impl PackagingApi {
    pub fn new(
        lot_repo: Arc<LotRepository>,
        quality_repo: Arc<QualityRepository>,
        packaging_repo: Arc<PackagingRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            lot_repo,
            quality_repo,
            packaging_repo,
            action_log_repo,
            planner: PackagingPlanner::new(),
            exporter: PackagingCsvExporter::new(),
        }
    }

    /// 某日有登记批次的分公司
    pub fn list_subsidiaries_on(&self, date: NaiveDate) -> ApiResult<Vec<String>> {
        Ok(self.lot_repo.distinct_subsidiaries_on(date)?)
    }

    /// 生成某日某分公司的包装方案（未落库）
    ///
    /// # 参数
    /// - remarks_by_lot_type: 操作员备注，按批次类型、按单元顺序对齐；缺省为 "RAS"
    ///
    /// # 返回
    /// - Err(PlanRejected): 无批次，或 VIP 卡数超过批次总量
    #[instrument(skip(self, remarks_by_lot_type))]
    pub fn prepare_plan(
        &self,
        date: NaiveDate,
        subsidiary: &str,
        remarks_by_lot_type: &HashMap<String, Vec<String>>,
    ) -> ApiResult<PackagingPlan> {
        let lots = self.lot_repo.find_by_date_and_subsidiary(date, subsidiary)?;
        let lot_ids: Vec<i64> = lots.iter().map(|l| l.id).collect();
        let controls = self.quality_repo.find_by_lot_ids(&lot_ids)?;

        let plan = self
            .planner
            .plan(date, subsidiary, &lots, &controls, remarks_by_lot_type)?;

        tracing::info!(
            groups = plan.groups.len(),
            lines = plan.line_count(),
            "包装方案生成完成"
        );
        Ok(plan)
    }

    /// 保存包装方案
    ///
    /// 全部明细行在一个事务内写入；唯一键冲突的行跳过，并在报告中给出提示。
    /// 其他数据库错误回滚整个方案
    #[instrument(skip(self, plan), fields(date = %plan.packaging_date, subsidiary = %plan.subsidiary))]
    pub fn save_plan(&self, plan: &PackagingPlan, operator: &str) -> ApiResult<SaveReport> {
        if operator.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作员不能为空".to_string()));
        }

        let mut report = SaveReport::default();
        let mut rows = Vec::with_capacity(plan.line_count());
        for group in &plan.groups {
            if group.lines.is_empty() && group.vip_totals.vip_total > 0 {
                report.vip_only_groups.push(group.group.lot_type.clone());
            }
            for (idx, line) in group.lines.iter().enumerate() {
                rows.push((line, (idx + 1) as u32));
            }
        }

        let outcomes = self
            .packaging_repo
            .insert_plan_lines(&rows, plan.packaging_date, operator)?;

        let date = plan.packaging_date.to_string();
        for ((line, unit_seq), outcome) in rows.iter().zip(outcomes) {
            match outcome {
                LineInsertOutcome::Inserted(_) => report.inserted += 1,
                LineInsertOutcome::Duplicate(msg) => {
                    tracing::warn!(lots = %line.lot_names_joined, unit_seq = *unit_seq, %msg, "包装记录重复，跳过");
                    report.duplicates.push(i18n::t_with_args(
                        "packaging.duplicate",
                        &[
                            ("lots", line.lot_names_joined.as_str()),
                            ("kind", line.packaging_kind.to_db_str()),
                            ("subsidiary", line.subsidiary.as_str()),
                            ("date", date.as_str()),
                        ],
                    ));
                }
            }
        }

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::SavePackaging,
            operator,
            Some(json!({
                "packaging_date": plan.packaging_date.to_string(),
                "subsidiary": plan.subsidiary,
                "inserted": report.inserted,
                "duplicates": report.duplicates.len(),
                "vip_only_groups": report.vip_only_groups,
            })),
            format!(
                "保存包装方案: {} {} (新增 {}, 重复 {})",
                plan.subsidiary,
                plan.packaging_date,
                report.inserted,
                report.duplicates.len()
            ),
        ))?;

        Ok(report)
    }

    // ==========================================
    // 包装台账
    // ==========================================

    pub fn list_records(&self, filter: &PackagingFilter) -> ApiResult<Vec<PackagingRecord>> {
        Ok(self
            .packaging_repo
            .list_all()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// 修改台账记录的备注、包装类型、卡数
    pub fn update_record(
        &self,
        id: i64,
        remark: &str,
        packaging_kind: PackagingKind,
        card_count: u32,
        operator: &str,
    ) -> ApiResult<()> {
        if card_count < 1 {
            return Err(ApiError::InvalidInput("卡数必须 ≥ 1".to_string()));
        }

        self.packaging_repo
            .update(id, remark, packaging_kind, card_count)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::UpdatePackaging,
            operator,
            Some(json!({
                "record_id": id,
                "remark": remark,
                "packaging_kind": packaging_kind.to_db_str(),
                "card_count": card_count,
            })),
            format!("修改包装记录: id={}", id),
        ))?;
        Ok(())
    }

    pub fn delete_record(&self, id: i64, operator: &str) -> ApiResult<()> {
        self.packaging_repo.delete(id)?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::DeletePackaging,
            operator,
            Some(json!({ "record_id": id })),
            format!("删除包装记录: id={}", id),
        ))?;
        Ok(())
    }

    /// 清空台账
    ///
    /// # 返回
    /// 删除的记录数
    pub fn clear_all(&self, operator: &str) -> ApiResult<usize> {
        let removed = self.packaging_repo.clear_all()?;

        self.action_log_repo.insert(&ActionLog::now(
            ActionType::ClearPackaging,
            operator,
            Some(json!({ "removed": removed })),
            format!("清空包装台账: {} 条", removed),
        ))?;
        Ok(removed)
    }

    /// 导出筛选后的台账为 CSV
    ///
    /// # 返回
    /// 导出的记录数
    pub fn export_csv(&self, filter: &PackagingFilter, path: &Path) -> ApiResult<usize> {
        let records = self.list_records(filter)?;
        self.exporter
            .write_file(path, &records)
            .map_err(|e| ApiError::ExportError(e.to_string()))
    }
}
