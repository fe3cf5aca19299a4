use super::core::{ActionLogRepository, ACTION_TS_FORMAT};
use crate::domain::action_log::ActionLog;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

impl ActionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    pub fn find_by_id(&self, action_id: &str) -> RepositoryResult<Option<ActionLog>> {
        let conn = self.get_conn()?;
        let log = conn
            .query_row(
                r#"
                SELECT action_id, action_type, action_ts, actor, payload_json, detail
                FROM action_log
                WHERE action_id = ?1
                "#,
                params![action_id],
                map_row,
            )
            .optional()?;
        Ok(log)
    }

    /// 查询最近的操作日志
    pub fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor, payload_json, detail
            FROM action_log
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let logs = stmt
            .query_map(params![limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 按操作类型查询（时间倒序）
    pub fn list_by_type(&self, action_type: &str) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor, payload_json, detail
            FROM action_log
            WHERE action_type = ?1
            ORDER BY action_ts DESC, rowid DESC
            "#,
        )?;

        let logs = stmt
            .query_map(params![action_type], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM action_log", [], |row| row.get(0))?)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<ActionLog> {
    let action_ts_str: String = row.get(2)?;
    let action_ts = NaiveDateTime::parse_from_str(&action_ts_str, ACTION_TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    // 损坏的 JSON 按缺失处理
    let payload_json = row
        .get::<_, Option<String>>(4)?
        .and_then(|s| serde_json::from_str(&s).ok());

    Ok(ActionLog {
        action_id: row.get(0)?,
        action_type: row.get(1)?,
        action_ts,
        actor: row.get(3)?,
        payload_json,
        detail: row.get(5)?,
    })
}
