// ==========================================
// LotApi 集成测试
// ==========================================
// 测试范围:
// 1. 批次登记: register_lot（校验、抽检卡数、PIN 规则、重名）
// 2. 批次维护: update_lot, delete_lot
// 3. 批次查询: list_lots, quantity_by_lot_type
// ==========================================

mod helpers;

use dcp_tracker::api::ApiError;
use dcp_tracker::domain::LotFilter;
use dcp_tracker::ActionType;
use helpers::api_test_helper::*;

// ==========================================
// 批次登记
// ==========================================

#[tokio::test]
async fn test_register_lot_计算抽检卡数() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let lot = env
        .register("ML-001", "Ordinaire", "Mali", 1_001, day(2026, 3, 2))
        .await;

    assert!(lot.id > 0);
    assert_eq!(lot.lot_name, "ML-001");
    assert_eq!(lot.cards_to_test, 21);
    assert!(!lot.pin_printing);
    assert_eq!(lot.pin_count, 0);

    let logs = env
        .action_log_repo
        .list_by_type(&ActionType::RegisterLot.to_string())
        .expect("查询日志失败");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].actor, "agent01");
}

#[tokio::test]
async fn test_register_lot_未打印PIN时强制为0() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let mut draft = lot_draft("ML-002", "Ordinaire", "Mali", 50, day(2026, 3, 2));
    draft.pin_count = 40;
    let lot = env
        .lot_api
        .register_lot(draft, "agent01")
        .await
        .expect("登记失败");
    assert_eq!(lot.pin_count, 0);

    let mut with_pin = lot_draft("ML-003", "Ordinaire", "Mali", 50, day(2026, 3, 2));
    with_pin.pin_printing = true;
    with_pin.pin_count = 0;
    let result = env.lot_api.register_lot(with_pin, "agent01").await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_register_lot_校验失败() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let date = day(2026, 3, 2);

    let empty_name = env
        .lot_api
        .register_lot(lot_draft("   ", "Ordinaire", "Mali", 10, date), "agent01")
        .await;
    assert!(matches!(empty_name, Err(ApiError::InvalidInput(_))));

    let zero = env
        .lot_api
        .register_lot(lot_draft("ML-010", "Ordinaire", "Mali", 0, date), "agent01")
        .await;
    assert!(matches!(zero, Err(ApiError::InvalidInput(_))));

    let unknown_type = env
        .lot_api
        .register_lot(lot_draft("ML-011", "Spécial", "Mali", 10, date), "agent01")
        .await;
    assert!(matches!(unknown_type, Err(ApiError::InvalidInput(_))));

    let unknown_subsidiary = env
        .lot_api
        .register_lot(lot_draft("ML-012", "Ordinaire", "Ghana", 10, date), "agent01")
        .await;
    assert!(matches!(unknown_subsidiary, Err(ApiError::InvalidInput(_))));

    assert_eq!(env.lot_repo.count().expect("计数失败"), 0);
}

#[tokio::test]
async fn test_register_lot_重名() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let date = day(2026, 3, 2);
    env.register("ML-001", "Ordinaire", "Mali", 10, date).await;

    let result = env
        .lot_api
        .register_lot(lot_draft("  ML-001 ", "Renouvellement", "Niger", 20, date), "agent01")
        .await;
    match result {
        Err(e @ ApiError::DuplicateRecord(_)) => assert!(e.is_recoverable()),
        other => panic!("Expected DuplicateRecord, got {:?}", other),
    }
}

// ==========================================
// 批次维护
// ==========================================

#[tokio::test]
async fn test_update_lot_重算抽检卡数() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let date = day(2026, 3, 2);
    let lot = env.register("ML-001", "Ordinaire", "Mali", 10, date).await;
    assert_eq!(lot.cards_to_test, 1);

    let updated = env
        .lot_api
        .update_lot(
            lot.id,
            lot_draft("ML-001", "Renouvellement", "Mali", 260, date),
            "agent02",
        )
        .await
        .expect("修改失败");
    assert_eq!(updated.id, lot.id);
    assert_eq!(updated.lot_type, "Renouvellement");
    assert_eq!(updated.cards_to_test, 6);
}

#[tokio::test]
async fn test_update_lot_改名冲突() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let date = day(2026, 3, 2);
    env.register("ML-001", "Ordinaire", "Mali", 10, date).await;
    let second = env.register("ML-002", "Ordinaire", "Mali", 10, date).await;

    let result = env
        .lot_api
        .update_lot(
            second.id,
            lot_draft("ML-001", "Ordinaire", "Mali", 10, date),
            "agent02",
        )
        .await;
    assert!(matches!(result, Err(ApiError::DuplicateRecord(_))));
}

#[tokio::test]
async fn test_delete_lot() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let lot = env
        .register("ML-001", "Ordinaire", "Mali", 10, day(2026, 3, 2))
        .await;

    env.lot_api.delete_lot(lot.id, "agent01").expect("删除失败");
    assert!(matches!(env.lot_api.get_lot(lot.id), Err(ApiError::NotFound(_))));
    assert!(matches!(
        env.lot_api.delete_lot(lot.id, "agent01"),
        Err(ApiError::NotFound(_))
    ));
}

// ==========================================
// 批次查询
// ==========================================

#[tokio::test]
async fn test_list_lots_筛选() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.register("ML-001", "Ordinaire", "Mali", 10, day(2026, 3, 1)).await;
    env.register("ML-002", "Ordinaire", "Mali", 20, day(2026, 3, 2)).await;
    env.register("NG-001", "Renouvellement", "Niger", 30, day(2026, 3, 2)).await;

    let all = env.lot_api.list_lots(&LotFilter::default()).expect("查询失败");
    assert_eq!(all.len(), 3);

    let filter = LotFilter {
        registered_from: Some(day(2026, 3, 2)),
        subsidiaries: vec!["Mali".to_string()],
        ..Default::default()
    };
    let filtered = env.lot_api.list_lots(&filter).expect("查询失败");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].lot_name, "ML-002");
}

#[tokio::test]
async fn test_quantity_by_lot_type_包含零项() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.register("ML-001", "Ordinaire", "Mali", 100, day(2026, 3, 1)).await;
    env.register("ML-002", "Ordinaire", "Mali", 50, day(2026, 3, 2)).await;
    env.register("NG-001", "Renouvellement", "Niger", 30, day(2026, 3, 2)).await;

    let quantities = env
        .lot_api
        .quantity_by_lot_type(&LotFilter::default())
        .await
        .expect("汇总失败");

    assert_eq!(
        quantities.by_type,
        vec![
            ("Ordinaire".to_string(), 150),
            ("Émission instantanée".to_string(), 0),
            ("Renouvellement".to_string(), 30),
        ]
    );
    assert_eq!(quantities.total, 180);
}
