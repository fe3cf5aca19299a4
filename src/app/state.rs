// ==========================================
// DCP 追踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{DashboardApi, LogisticsApi, LotApi, PackagingApi, QualityApi};
use crate::config::{ConfigManager, ReferenceConfigReader};
use crate::repository::{
    ActionLogRepository, AgencyRepository, CourierRepository, LotRepository, PackagingRepository,
    QualityRepository, ShipmentRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "DCP_TRACKER_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub lot_api: Arc<LotApi>,
    pub quality_api: Arc<QualityApi>,
    pub packaging_api: Arc<PackagingApi>,
    pub logistics_api: Arc<LogisticsApi>,
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器（参考列表读写）
    pub config_manager: Arc<ConfigManager>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开共享连接，检查 schema 版本（仅告警）
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_shared_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        {
            let guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::warn_on_schema_mismatch(&guard);
        }

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let lot_repo = Arc::new(LotRepository::from_connection(conn.clone()));
        let quality_repo = Arc::new(QualityRepository::from_connection(conn.clone()));
        let packaging_repo = Arc::new(PackagingRepository::from_connection(conn.clone()));
        let agency_repo = Arc::new(AgencyRepository::from_connection(conn.clone()));
        let courier_repo = Arc::new(CourierRepository::from_connection(conn.clone()));
        let shipment_repo = Arc::new(ShipmentRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config: Arc<dyn ReferenceConfigReader> = config_manager.clone();

        // ==========================================
        // 初始化API层
        // ==========================================
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
            packaging_repo,
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
            lot_repo,
            quality_repo,
            agency_repo,
            shipment_repo,
            action_log_repo.clone(),
            config,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            lot_api,
            quality_api,
            packaging_api,
            logistics_api,
            dashboard_api,
            config_manager,
            action_log_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 DCP_TRACKER_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./dcp_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("dcp-tracker");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("dcp_tracker.db");
        }
    }

    path.to_string_lossy().to_string()
}
