// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用环境与数据构造
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use dcp_tracker::api::{DashboardApi, LogisticsApi, LotApi, PackagingApi, QualityApi};
use dcp_tracker::config::ReferenceConfigReader;
use dcp_tracker::domain::{Lot, LotDraft};
use dcp_tracker::repository::{
    ActionLogRepository, AgencyRepository, CourierRepository, LotRepository, PackagingRepository,
    QualityRepository, ShipmentRepository,
};

use super::mock_config::MockConfig;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub lot_api: Arc<LotApi>,
    pub quality_api: Arc<QualityApi>,
    pub packaging_api: Arc<PackagingApi>,
    pub logistics_api: Arc<LogisticsApi>,
    pub dashboard_api: Arc<DashboardApi>,

    // Repository层（用于测试数据准备与断言）
    pub lot_repo: Arc<LotRepository>,
    pub quality_repo: Arc<QualityRepository>,
    pub packaging_repo: Arc<PackagingRepository>,
    pub shipment_repo: Arc<ShipmentRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(MockConfig::default())
    }

    pub fn with_config(config: MockConfig) -> Result<Self, Box<dyn std::error::Error>> {
        dcp_tracker::logging::init_test();
        dcp_tracker::i18n::set_locale("fr");

        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let conn = dcp_tracker::db::open_shared_connection(&db_path)?;
        let config: Arc<dyn ReferenceConfigReader> = Arc::new(config);

        let lot_repo = Arc::new(LotRepository::from_connection(conn.clone()));
        let quality_repo = Arc::new(QualityRepository::from_connection(conn.clone()));
        let packaging_repo = Arc::new(PackagingRepository::from_connection(conn.clone()));
        let agency_repo = Arc::new(AgencyRepository::from_connection(conn.clone()));
        let courier_repo = Arc::new(CourierRepository::from_connection(conn.clone()));
        let shipment_repo = Arc::new(ShipmentRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::from_connection(conn));

        let lot_api = Arc::new(LotApi::new(
            lot_repo.clone(),
            action_log_repo.clone(),
            config.clone(),
        ));
        let quality_api = Arc::new(QualityApi::new(
            quality_repo.clone(),
            lot_repo.clone(),
            action_log_repo.clone(),
            config.clone(),
        ));
        let packaging_api = Arc::new(PackagingApi::new(
            lot_repo.clone(),
            quality_repo.clone(),
            packaging_repo.clone(),
            action_log_repo.clone(),
        ));
        let logistics_api = Arc::new(LogisticsApi::new(
            agency_repo.clone(),
            courier_repo,
            shipment_repo.clone(),
            lot_repo.clone(),
            action_log_repo.clone(),
            config.clone(),
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            lot_repo.clone(),
            quality_repo.clone(),
            agency_repo,
            shipment_repo.clone(),
            action_log_repo.clone(),
            config,
        ));

        Ok(Self {
            db_path,
            lot_api,
            quality_api,
            packaging_api,
            logistics_api,
            dashboard_api,
            lot_repo,
            quality_repo,
            packaging_repo,
            shipment_repo,
            action_log_repo,
            _temp_file: temp_file,
        })
    }

    /// 登记一个批次（不打印 PIN）
    pub async fn register(
        &self,
        name: &str,
        lot_type: &str,
        subsidiary: &str,
        quantity: u32,
        date: NaiveDate,
    ) -> Lot {
        self.lot_api
            .register_lot(lot_draft(name, lot_type, subsidiary, quantity, date), "agent01")
            .await
            .expect("批次登记失败")
    }
}

/// 构造批次录入
pub fn lot_draft(
    name: &str,
    lot_type: &str,
    subsidiary: &str,
    quantity: u32,
    date: NaiveDate,
) -> LotDraft {
    LotDraft {
        lot_name: name.to_string(),
        lot_type: lot_type.to_string(),
        quantity,
        production_date: date,
        registration_date: date,
        subsidiary: subsidiary.to_string(),
        pin_printing: false,
        pin_count: 0,
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("日期非法")
}
