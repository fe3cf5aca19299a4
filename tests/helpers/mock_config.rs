// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use dcp_tracker::config::{ConfigResult, ReferenceConfigReader};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub lot_types: Vec<String>,
    pub subsidiaries: Vec<String>,
    pub card_types: Vec<String>,
    pub default_remark: String,
}

impl MockConfig {
    /// 创建默认配置（与线上默认列表一致）
    pub fn default() -> Self {
        Self {
            lot_types: to_strings(&["Ordinaire", "Émission instantanée", "Renouvellement"]),
            subsidiaries: to_strings(&[
                "Burkina Faso",
                "Mali",
                "Niger",
                "Côte d'Ivoire",
                "Sénégal",
                "Bénin",
                "Togo",
                "Guinée Bissau",
                "Guinée Conakry",
            ]),
            card_types: to_strings(&[
                "challenge",
                "open",
                "challenge plus",
                "access",
                "visa leader",
                "visa gold encoche",
                "visa infinite encoche",
                "visa gold premier",
                "visa infinite premier",
                "wadia challenge",
                "wadia open",
                "wadia challenge plus",
            ]),
            default_remark: "RAS".to_string(),
        }
    }

    /// 自定义默认备注
    pub fn with_default_remark(remark: &str) -> Self {
        let mut config = Self::default();
        config.default_remark = remark.to_string();
        config
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl ReferenceConfigReader for MockConfig {
    async fn get_lot_types(&self) -> ConfigResult<Vec<String>> {
        Ok(self.lot_types.clone())
    }

    async fn get_subsidiaries(&self) -> ConfigResult<Vec<String>> {
        Ok(self.subsidiaries.clone())
    }

    async fn get_card_types(&self) -> ConfigResult<Vec<String>> {
        Ok(self.card_types.clone())
    }

    async fn get_default_remark(&self) -> ConfigResult<String> {
        Ok(self.default_remark.clone())
    }
}
