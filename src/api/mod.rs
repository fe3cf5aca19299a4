// ==========================================
// DCP 追踪系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行与界面调用
// 红线: 所有写入记录 ActionLog
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod logistics_api;
pub mod lot_api;
pub mod packaging_api;
pub mod quality_api;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, DashboardOverview, SamplingOverview, ShippedCount};
pub use error::{ApiError, ApiResult};
pub use logistics_api::LogisticsApi;
pub use lot_api::{LotApi, LotTypeQuantities};
pub use packaging_api::PackagingApi;
pub use quality_api::QualityApi;
