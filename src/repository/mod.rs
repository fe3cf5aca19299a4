// ==========================================
// DCP 追踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod agency_repo;
pub mod courier_repo;
pub mod error;
pub mod lot_repo;
pub mod packaging_repo;
pub mod quality_repo;
pub mod shipment_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use agency_repo::AgencyRepository;
pub use courier_repo::CourierRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use lot_repo::LotRepository;
pub use packaging_repo::{LineInsertOutcome, PackagingRepository};
pub use quality_repo::{ControlWithLot, NewQualityControl, QualityRepository};
pub use shipment_repo::{ShipmentRepository, ShipmentWithNames};
