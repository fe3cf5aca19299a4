// ==========================================
// DCP 追踪系统 - 配置层
// ==========================================
// 职责: 参考列表配置管理（批次类型、分公司、卡种、默认备注）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod reference_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use reference_config_trait::{ConfigResult, ReferenceConfigReader};
