// ==========================================
// DCP 追踪系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/引擎错误为用户可读的错误消息
// ==========================================

use crate::engine::packaging_planner::PlanError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 重复记录：操作员可忽略后继续
    #[error("重复记录: {0}")]
    DuplicateRecord(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("包装方案无法生成: {0}")]
    PlanRejected(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 可恢复错误：提示后继续工作流
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ApiError::DuplicateRecord(_) | ApiError::InvalidInput(_) | ApiError::ValidationError(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateRecord(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        ApiError::PlanRejected(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ApiError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::not_found("Lot", 42).into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Lot"));
                assert!(msg.contains("42"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("UNIQUE constraint failed".to_string())
                .into();
        assert!(matches!(api_err, ApiError::DuplicateRecord(_)));
        assert!(api_err.is_recoverable());
    }

    #[test]
    fn test_plan_error_is_not_recoverable() {
        let api_err: ApiError = PlanError::VipExceedsLotQuantity {
            lot_type: "Ordinaire".to_string(),
            total: 10,
            vip_total: 11,
        }
        .into();
        assert!(matches!(api_err, ApiError::PlanRejected(_)));
        assert!(!api_err.is_recoverable());
    }
}
