// ==========================================
// PackagingApi 集成测试
// ==========================================
// 测试范围:
// 1. 包装方案: list_subsidiaries_on, prepare_plan
// 2. 方案保存: save_plan（重复记录跳过并上报）
// 3. 包装台账: list_records, update_record, delete_record, clear_all
// 4. CSV 导出: export_csv
// ==========================================

mod helpers;

use std::collections::HashMap;

use dcp_tracker::api::ApiError;
use dcp_tracker::domain::{CardTypeEntry, PackagingFilter};
use dcp_tracker::repository::NewQualityControl;
use dcp_tracker::{ActionType, PackagingKind, TestResult};
use helpers::api_test_helper::*;

fn entry(card_type: &str, quantity: u32) -> CardTypeEntry {
    CardTypeEntry {
        card_type: card_type.to_string(),
        quantity,
    }
}

/// 准备 Mali 两个 Ordinaire 批次（含 15 张 VIP）+ 一个 Renouvellement 批次，
/// 以及 Togo 一个批次
async fn seed_day(env: &ApiTestEnv) {
    let date = day(2026, 3, 2);
    let ml1 = env.register("ML-001", "Ordinaire", "Mali", 400, date).await;
    env.register("ML-002", "Ordinaire", "Mali", 265, date).await;
    env.register("RN-001", "Renouvellement", "Mali", 120, date).await;
    env.register("TG-001", "Ordinaire", "Togo", 80, date).await;

    env.quality_api
        .record_control(
            ml1.id,
            &[
                entry("visa gold premier", 10),
                entry("visa infinite encoche", 5),
                entry("challenge", 100),
            ],
            None,
            TestResult::Success,
            date,
            "agent01",
        )
        .await
        .expect("质检录入失败");
}

// ==========================================
// 包装方案
// ==========================================

#[tokio::test]
async fn test_list_subsidiaries_on_按首次登记顺序() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_day(&env).await;

    let subsidiaries = env
        .packaging_api
        .list_subsidiaries_on(day(2026, 3, 2))
        .expect("查询失败");
    assert_eq!(subsidiaries, vec!["Mali".to_string(), "Togo".to_string()]);

    let none = env
        .packaging_api
        .list_subsidiaries_on(day(2026, 3, 3))
        .expect("查询失败");
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_prepare_plan_分组与VIP扣除() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_day(&env).await;

    let mut remarks = HashMap::new();
    remarks.insert("Ordinaire".to_string(), vec!["Scellé".to_string()]);

    let plan = env
        .packaging_api
        .prepare_plan(day(2026, 3, 2), "Mali", &remarks)
        .expect("生成方案失败");

    assert_eq!(plan.groups.len(), 2);
    assert_eq!(plan.line_count(), 3);

    let ordinaire = &plan.groups[0];
    assert_eq!(ordinaire.group.lot_type, "Ordinaire");
    assert_eq!(ordinaire.vip_totals.vip_total, 15);
    assert_eq!(ordinaire.non_vip_quantity, 650);
    let counts: Vec<(PackagingKind, u32)> = ordinaire
        .lines
        .iter()
        .map(|l| (l.packaging_kind, l.card_count))
        .collect();
    assert_eq!(
        counts,
        vec![(PackagingKind::Crate, 500), (PackagingKind::Envelope, 150)]
    );
    assert_eq!(ordinaire.lines[0].remark, "Scellé");
    assert_eq!(ordinaire.lines[1].remark, "RAS");
    assert_eq!(ordinaire.lines[0].lot_names_joined, "ML-001, ML-002");

    let renouvellement = &plan.groups[1];
    assert_eq!(renouvellement.vip_totals.vip_total, 0);
    assert_eq!(renouvellement.lines.len(), 1);
    assert_eq!(renouvellement.lines[0].packaging_kind, PackagingKind::Envelope);
    assert_eq!(renouvellement.lines[0].card_count, 120);
}

#[tokio::test]
async fn test_prepare_plan_无批次() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_day(&env).await;

    let result = env
        .packaging_api
        .prepare_plan(day(2026, 3, 2), "Niger", &HashMap::new());
    assert!(matches!(result, Err(ApiError::PlanRejected(_))));
}

#[tokio::test]
async fn test_prepare_plan_库中VIP超过批次总量() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let date = day(2026, 3, 4);
    let lot = env.register("BN-001", "Ordinaire", "Bénin", 10, date).await;

    // 录入接口会拒绝，此处直接写库模拟历史数据
    env.quality_repo
        .insert_batch(&[NewQualityControl {
            lot_id: lot.id,
            card_type: "visa gold encoche".to_string(),
            quantity: 30,
            quantity_to_test: 1,
            control_date: date,
            remark: "RAS".to_string(),
            result: TestResult::Success,
        }])
        .expect("写入失败");

    let result = env
        .packaging_api
        .prepare_plan(date, "Bénin", &HashMap::new());
    assert!(matches!(result, Err(ApiError::PlanRejected(_))));
}

// ==========================================
// 方案保存
// ==========================================

#[tokio::test]
async fn test_save_plan_重复保存跳过() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_day(&env).await;

    let plan = env
        .packaging_api
        .prepare_plan(day(2026, 3, 2), "Mali", &HashMap::new())
        .expect("生成方案失败");

    let first = env.packaging_api.save_plan(&plan, "agent01").expect("保存失败");
    assert_eq!(first.inserted, 3);
    assert!(first.duplicates.is_empty());

    let second = env.packaging_api.save_plan(&plan, "agent02").expect("保存失败");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates.len(), 3);
    assert!(second.duplicates[0].contains("ML-001, ML-002"));
    assert!(second.duplicates[0].contains("Mali"));
    assert!(second.duplicates[0].contains("2026-03-02"));

    let records = env
        .packaging_api
        .list_records(&PackagingFilter::default())
        .expect("查询失败");
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.operator == "agent01"));

    let logs = env
        .dashboard_api
        .list_actions_by_type(ActionType::SavePackaging)
        .expect("查询日志失败");
    assert_eq!(logs.len(), 2);
}

#[tokio::test]
async fn test_save_plan_操作员为空() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_day(&env).await;

    let plan = env
        .packaging_api
        .prepare_plan(day(2026, 3, 2), "Togo", &HashMap::new())
        .expect("生成方案失败");

    let result = env.packaging_api.save_plan(&plan, "  ");
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    assert_eq!(env.packaging_repo.list_all().expect("查询失败").len(), 0);
}

#[tokio::test]
async fn test_save_plan_中途失败整体回滚() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_day(&env).await;

    let plan = env
        .packaging_api
        .prepare_plan(day(2026, 3, 2), "Mali", &HashMap::new())
        .expect("生成方案失败");

    // 第三行（RN-001）写入时失败
    let conn = rusqlite::Connection::open(&env.db_path).expect("无法打开数据库");
    conn.execute_batch(
        "CREATE TRIGGER refuse_rn BEFORE INSERT ON conditionnement
         WHEN NEW.nom_lot = 'RN-001'
         BEGIN SELECT RAISE(ABORT, 'écriture refusée'); END;",
    )
    .expect("创建触发器失败");

    let result = env.packaging_api.save_plan(&plan, "agent01");
    assert!(matches!(result, Err(ApiError::DatabaseError(_))));
    assert_eq!(env.packaging_repo.list_all().expect("查询失败").len(), 0);
    assert!(env
        .dashboard_api
        .list_actions_by_type(ActionType::SavePackaging)
        .expect("查询日志失败")
        .is_empty());
}

#[tokio::test]
async fn test_save_plan_全VIP分组上报() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let date = day(2026, 3, 5);
    let vip_lot = env.register("CI-001", "Ordinaire", "Côte d'Ivoire", 20, date).await;
    env.register("CI-002", "Renouvellement", "Côte d'Ivoire", 90, date).await;
    env.quality_api
        .record_control(
            vip_lot.id,
            &[entry("visa infinite encoche", 20)],
            None,
            TestResult::Success,
            date,
            "agent01",
        )
        .await
        .expect("质检录入失败");

    let plan = env
        .packaging_api
        .prepare_plan(date, "Côte d'Ivoire", &HashMap::new())
        .expect("生成方案失败");
    assert!(plan.groups[0].lines.is_empty());

    let report = env.packaging_api.save_plan(&plan, "agent01").expect("保存失败");
    assert_eq!(report.inserted, 1);
    assert_eq!(report.vip_only_groups, vec!["Ordinaire".to_string()]);
}

// ==========================================
// 包装台账
// ==========================================

#[tokio::test]
async fn test_inventory_修改删除清空() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_day(&env).await;

    let plan = env
        .packaging_api
        .prepare_plan(day(2026, 3, 2), "Mali", &HashMap::new())
        .expect("生成方案失败");
    env.packaging_api.save_plan(&plan, "agent01").expect("保存失败");

    let records = env
        .packaging_api
        .list_records(&PackagingFilter::default())
        .expect("查询失败");
    let target = records[0].id;

    env.packaging_api
        .update_record(target, "Reconditionné", PackagingKind::Envelope, 90, "agent02")
        .expect("修改失败");
    let updated = env
        .packaging_repo
        .find_by_id(target)
        .expect("查询失败")
        .expect("记录不存在");
    assert_eq!(updated.remark, "Reconditionné");
    assert_eq!(updated.packaging_kind, PackagingKind::Envelope);
    assert_eq!(updated.card_count, 90);

    let invalid = env
        .packaging_api
        .update_record(target, "RAS", PackagingKind::Crate, 0, "agent02");
    assert!(matches!(invalid, Err(ApiError::InvalidInput(_))));

    let missing = env
        .packaging_api
        .update_record(9_999, "RAS", PackagingKind::Crate, 10, "agent02");
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    env.packaging_api
        .delete_record(target, "agent02")
        .expect("删除失败");
    let filter = PackagingFilter {
        kinds: vec![PackagingKind::Envelope],
        ..Default::default()
    };
    assert_eq!(
        env.packaging_api.list_records(&filter).expect("查询失败").len(),
        2
    );

    let removed = env.packaging_api.clear_all("agent02").expect("清空失败");
    assert_eq!(removed, 2);
    assert!(env
        .packaging_api
        .list_records(&PackagingFilter::default())
        .expect("查询失败")
        .is_empty());
}

// ==========================================
// CSV 导出
// ==========================================

#[tokio::test]
async fn test_export_csv_按筛选导出() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_day(&env).await;

    for subsidiary in ["Mali", "Togo"] {
        let plan = env
            .packaging_api
            .prepare_plan(day(2026, 3, 2), subsidiary, &HashMap::new())
            .expect("生成方案失败");
        env.packaging_api.save_plan(&plan, "agent01").expect("保存失败");
    }

    let dir = tempfile::tempdir().expect("无法创建临时目录");
    let path = dir.path().join("conditionnement.csv");
    let filter = PackagingFilter {
        subsidiaries: vec!["Togo".to_string()],
        ..Default::default()
    };

    let written = env
        .packaging_api
        .export_csv(&filter, &path)
        .expect("导出失败");
    assert_eq!(written, 1);

    let content = std::fs::read_to_string(&path).expect("读取导出文件失败");
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("id,nom_lot,type_lot,filiale,type_emballage,nombre_cartes,cartes_vip,packs,date_conditionnement,operateur,remarque")
    );
    let row = lines.next().expect("缺少数据行");
    assert!(row.contains(",TG-001,Ordinaire,Togo,Enveloppe,80,0,0,2026-03-02,agent01,RAS"));
    assert!(lines.next().is_none());
}
