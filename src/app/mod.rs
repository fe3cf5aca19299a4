// ==========================================
// DCP 追踪系统 - 应用层
// ==========================================
// 职责: 组装仓储与 API，持有界面状态
// ==========================================

pub mod edit_state;
pub mod state;

// 重导出
pub use edit_state::{EditState, EditTransitionError, Screen, UiState};
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
