use crate::db::open_sqlite_connection;
use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

/// action_ts 列的文本格式（本地时间，精确到秒）
pub(super) const ACTION_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================
/// 只追加；日志不提供修改与删除
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 与业务仓储共用同一连接，保证写入与日志顺序一致
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub(super) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加一条操作日志
    ///
    /// # 返回
    /// 日志的 action_id
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<String> {
        let payload = log
            .payload_json
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::FieldValueError {
                field: "payload_json".to_string(),
                message: e.to_string(),
            })?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO action_log (action_id, action_type, action_ts, actor, payload_json, detail)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                log.action_id,
                log.action_type,
                log.action_ts.format(ACTION_TS_FORMAT).to_string(),
                log.actor,
                payload,
                log.detail,
            ],
        )?;

        tracing::debug!(action_type = %log.action_type, actor = %log.actor, "操作日志已记录");
        Ok(log.action_id.clone())
    }
}
