// ==========================================
// DCP 追踪系统 - 参考数据配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的参考列表读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ReferenceConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）；测试中为 MockConfig
#[async_trait]
pub trait ReferenceConfigReader: Send + Sync {
    /// 批次类型列表
    ///
    /// # 默认值
    /// - ["Ordinaire", "Émission instantanée", "Renouvellement"]
    async fn get_lot_types(&self) -> ConfigResult<Vec<String>>;

    /// 分公司（国家）列表
    async fn get_subsidiaries(&self) -> ConfigResult<Vec<String>>;

    /// 卡种列表
    async fn get_card_types(&self) -> ConfigResult<Vec<String>>;

    /// 默认备注
    ///
    /// # 默认值
    /// - "RAS"
    async fn get_default_remark(&self) -> ConfigResult<String>;
}
