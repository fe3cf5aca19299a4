// ==========================================
// DCP 追踪系统 - 包装方案编排
// ==========================================
// 职责: 某日某分公司的批次 → 按批次类型分组 → VIP 统计 → 包装分配 → 明细行
// 输入: 当日登记的批次 + 这些批次的质检记录（调用方一次性读取快照）
// 输出: PackagingPlan（未落库）
// 红线: 不访问数据库；VIP 超出批次总量视为前置条件失败，不做截断
// ==========================================

use crate::domain::lot::{Lot, LotGroup, LotMember};
use crate::domain::packaging::{PackagingGroupPlan, PackagingPlan};
use crate::domain::quality::{QualityControl, VipCardRecord};
use crate::engine::packaging_allocator::PackagingAllocator;
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("VIP 卡数超过批次总量: lot_type={lot_type}, total={total}, vip_total={vip_total}")]
    VipExceedsLotQuantity {
        lot_type: String,
        total: u64,
        vip_total: u64,
    },

    #[error("分公司在 {date} 没有登记批次: {subsidiary}")]
    NoLotsForSubsidiary { subsidiary: String, date: NaiveDate },
}

// ==========================================
// PackagingPlanner
// ==========================================
#[derive(Debug, Default)]
pub struct PackagingPlanner {
    allocator: PackagingAllocator,
}

impl PackagingPlanner {
    pub fn new() -> Self {
        Self {
            allocator: PackagingAllocator::new(),
        }
    }

    /// 按批次类型分组
    ///
    /// 组顺序 = 类型首次出现顺序；组内顺序 = 输入顺序
    pub fn group_lots_by_type<'a, I>(&self, lots: I) -> Vec<LotGroup>
    where
        I: IntoIterator<Item = &'a Lot>,
    {
        let mut groups: Vec<LotGroup> = Vec::new();
        for lot in lots {
            match groups.iter_mut().find(|g| g.lot_type == lot.lot_type) {
                Some(group) => group.member_lots.push(LotMember::from(lot)),
                None => groups.push(LotGroup {
                    lot_type: lot.lot_type.clone(),
                    member_lots: vec![LotMember::from(lot)],
                }),
            }
        }
        groups
    }

    /// 生成包装方案
    ///
    /// # 参数
    /// - lots_of_day: 当日登记的全部批次（内部按分公司过滤）
    /// - controls: 质检记录（内部按组内批次过滤）
    /// - remarks_by_lot_type: 操作员备注，按批次类型分组、按单元下标对齐
    #[instrument(skip(self, lots_of_day, controls, remarks_by_lot_type), fields(
        lots = lots_of_day.len(),
        controls = controls.len()
    ))]
    pub fn plan(
        &self,
        packaging_date: NaiveDate,
        subsidiary: &str,
        lots_of_day: &[Lot],
        controls: &[QualityControl],
        remarks_by_lot_type: &HashMap<String, Vec<String>>,
    ) -> Result<PackagingPlan, PlanError> {
        let groups = self.group_lots_by_type(
            lots_of_day
                .iter()
                .filter(|lot| lot.subsidiary == subsidiary && lot.registration_date == packaging_date),
        );

        if groups.is_empty() {
            return Err(PlanError::NoLotsForSubsidiary {
                subsidiary: subsidiary.to_string(),
                date: packaging_date,
            });
        }

        let mut group_plans = Vec::with_capacity(groups.len());
        for group in groups {
            let lot_ids = group.lot_ids();
            let vip_records: Vec<VipCardRecord> = controls
                .iter()
                .filter(|c| lot_ids.contains(&c.lot_id))
                .map(VipCardRecord::from)
                .collect();
            let vip_totals = self.allocator.compute_vip_totals(&vip_records);

            let total = group.total_quantity();
            let non_vip_quantity = total.checked_sub(vip_totals.vip_total).ok_or_else(|| {
                PlanError::VipExceedsLotQuantity {
                    lot_type: group.lot_type.clone(),
                    total,
                    vip_total: vip_totals.vip_total,
                }
            })?;

            let units = self.allocator.allocate_packaging(non_vip_quantity, subsidiary);
            let remarks = remarks_by_lot_type
                .get(&group.lot_type)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let lines = self.allocator.build_packaging_lines(
                &group,
                &vip_totals,
                &units,
                subsidiary,
                remarks,
            );

            if lines.is_empty() && vip_totals.vip_total > 0 {
                tracing::warn!(
                    lot_type = %group.lot_type,
                    vip_total = vip_totals.vip_total,
                    "分组全部为 VIP 卡，不生成包装行"
                );
            }

            tracing::debug!(
                lot_type = %group.lot_type,
                total,
                vip_total = vip_totals.vip_total,
                lines = lines.len(),
                "批次类型分组包装完成"
            );

            group_plans.push(PackagingGroupPlan {
                group,
                vip_totals,
                non_vip_quantity,
                lines,
            });
        }

        Ok(PackagingPlan {
            packaging_date,
            subsidiary: subsidiary.to_string(),
            groups: group_plans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{PackagingKind, TestResult};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn lot(id: i64, name: &str, lot_type: &str, subsidiary: &str, quantity: u32) -> Lot {
        Lot {
            id,
            lot_name: name.to_string(),
            lot_type: lot_type.to_string(),
            quantity,
            production_date: date(),
            registration_date: date(),
            subsidiary: subsidiary.to_string(),
            pin_printing: false,
            pin_count: 0,
            cards_to_test: quantity.div_ceil(50),
        }
    }

    fn control(lot_id: i64, card_type: &str, quantity: u32) -> QualityControl {
        QualityControl {
            id: lot_id * 10,
            lot_id,
            card_type: card_type.to_string(),
            quantity,
            quantity_to_test: 1,
            control_date: date(),
            remark: "RAS".to_string(),
            result: TestResult::Success,
        }
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let planner = PackagingPlanner::new();
        let lots = vec![
            lot(1, "A", "Renouvellement", "Mali", 10),
            lot(2, "B", "Ordinaire", "Mali", 10),
            lot(3, "C", "Renouvellement", "Mali", 10),
        ];
        let groups = planner.group_lots_by_type(&lots);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].lot_type, "Renouvellement");
        assert_eq!(groups[0].joined_lot_names(), "A, C");
        assert_eq!(groups[1].joined_lot_names(), "B");
    }

    #[test]
    fn test_plan_subtracts_vip_cards() {
        let planner = PackagingPlanner::new();
        let lots = vec![
            lot(1, "ML-1", "Ordinaire", "Mali", 600),
            lot(2, "ML-2", "Ordinaire", "Mali", 65),
            lot(9, "SN-1", "Ordinaire", "Sénégal", 400),
        ];
        let controls = vec![control(1, "visa gold premier", 10), control(2, "visa infinite encoche", 5)];

        let plan = planner
            .plan(date(), "Mali", &lots, &controls, &HashMap::new())
            .unwrap();

        assert_eq!(plan.groups.len(), 1);
        let group = &plan.groups[0];
        assert_eq!(group.non_vip_quantity, 650);
        assert_eq!(group.vip_totals.vip_total, 15);
        assert_eq!(group.lines.len(), 2);
        assert_eq!(group.lines[0].packaging_kind, PackagingKind::Crate);
        assert_eq!(group.lines[0].card_count, 500);
        assert_eq!(group.lines[1].packaging_kind, PackagingKind::Envelope);
        assert!(group.lines.iter().all(|l| l.vip_pack_count == 15));
    }

    #[test]
    fn test_plan_rejects_vip_above_total() {
        let planner = PackagingPlanner::new();
        let lots = vec![lot(1, "ML-1", "Ordinaire", "Mali", 10)];
        let controls = vec![control(1, "visa gold encoche", 11)];

        let err = planner
            .plan(date(), "Mali", &lots, &controls, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, PlanError::VipExceedsLotQuantity { total: 10, vip_total: 11, .. }));
    }

    #[test]
    fn test_plan_vip_only_group_has_no_lines() {
        let planner = PackagingPlanner::new();
        let lots = vec![
            lot(1, "ML-1", "Ordinaire", "Mali", 20),
            lot(2, "ML-2", "Renouvellement", "Mali", 80),
        ];
        let controls = vec![control(1, "visa infinite encoche", 20)];

        let plan = planner
            .plan(date(), "Mali", &lots, &controls, &HashMap::new())
            .unwrap();

        assert_eq!(plan.groups.len(), 2);
        assert_eq!(plan.groups[0].non_vip_quantity, 0);
        assert!(plan.groups[0].lines.is_empty());
        assert_eq!(plan.groups[0].vip_totals.vip_pack_count, 20);
        assert_eq!(plan.groups[1].lines.len(), 1);
    }

    #[test]
    fn test_plan_without_lots_is_error() {
        let planner = PackagingPlanner::new();
        let err = planner
            .plan(date(), "Togo", &[], &[], &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, PlanError::NoLotsForSubsidiary { .. }));
    }
}
