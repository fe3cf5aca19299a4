// ==========================================
// DCP 追踪系统 - 操作日志仓储
// ==========================================
// core: 连接与写入
// queries: 按 ID / 最近 N 条 / 按类型 查询
// ==========================================

mod core;
mod queries;


pub use self::core::ActionLogRepository;
