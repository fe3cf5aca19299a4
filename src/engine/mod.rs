// ==========================================
// DCP 追踪系统 - 引擎层
// ==========================================
// 职责: 实现业务规则（抽样、包装分配），不拼 SQL
// 红线: Engine 不访问数据库
// ==========================================

pub mod packaging_allocator;
pub mod packaging_planner;
pub mod sampling;

// 重导出核心引擎
pub use packaging_allocator::{
    PackagingAllocator, DEFAULT_CRATE_CAPACITY, DEFAULT_REMARK, ENVELOPE_THRESHOLD,
    SENEGAL_CRATE_CAPACITY,
};
pub use packaging_planner::{PackagingPlanner, PlanError};
pub use sampling::{SamplingEngine, SAMPLING_BATCH_SIZE};
