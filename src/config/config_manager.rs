// ==========================================
// DCP 追踪系统 - 配置管理器
// ==========================================
// 职责: 参考列表的加载、查询、覆写
// 存储: config_kv 表 (scope_id='global')，列表值为 JSON 数组
// ==========================================

use crate::config::reference_config_trait::{ConfigResult, ReferenceConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// 内置默认值
// ==========================================
pub const DEFAULT_LOT_TYPES: [&str; 3] = ["Ordinaire", "Émission instantanée", "Renouvellement"];

pub const DEFAULT_SUBSIDIARIES: [&str; 9] = [
    "Burkina Faso",
    "Mali",
    "Niger",
    "Côte d'Ivoire",
    "Sénégal",
    "Bénin",
    "Togo",
    "Guinée Bissau",
    "Guinée Conakry",
];

pub const DEFAULT_CARD_TYPES: [&str; 12] = [
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
];

pub const DEFAULT_REMARK_VALUE: &str = "RAS";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 覆写列表配置（JSON 数组）
    pub fn set_list(&self, key: &str, values: &[String]) -> ConfigResult<()> {
        let json = serde_json::to_string(values)?;
        self.set_global_config_value(key, &json)
    }

    /// 读取列表配置；缺失、格式错误或为空时回退到默认值
    fn get_list_or_default(&self, key: &str, default: &[&str]) -> ConfigResult<Vec<String>> {
        let fallback = || default.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let raw = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(fallback()),
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) if !list.is_empty() => Ok(list),
            Ok(_) => Ok(fallback()),
            Err(e) => {
                tracing::warn!(key, error = %e, "配置值不是合法的 JSON 数组，使用默认值");
                Ok(fallback())
            }
        }
    }
}

#[async_trait]
impl ReferenceConfigReader for ConfigManager {
    async fn get_lot_types(&self) -> ConfigResult<Vec<String>> {
        self.get_list_or_default(config_keys::LOT_TYPES, &DEFAULT_LOT_TYPES)
    }

    async fn get_subsidiaries(&self) -> ConfigResult<Vec<String>> {
        self.get_list_or_default(config_keys::SUBSIDIARIES, &DEFAULT_SUBSIDIARIES)
    }

    async fn get_card_types(&self) -> ConfigResult<Vec<String>> {
        self.get_list_or_default(config_keys::CARD_TYPES, &DEFAULT_CARD_TYPES)
    }

    async fn get_default_remark(&self) -> ConfigResult<String> {
        let value = self.get_global_config_value(config_keys::DEFAULT_REMARK)?;
        Ok(value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REMARK_VALUE.to_string()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const LOT_TYPES: &str = "lot_types"; // JSON 数组
    pub const SUBSIDIARIES: &str = "subsidiaries"; // JSON 数组
    pub const CARD_TYPES: &str = "card_types"; // JSON 数组
    pub const DEFAULT_REMARK: &str = "default_remark";
}
