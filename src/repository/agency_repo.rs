// ==========================================
// DCP 追踪系统 - 快递公司数据仓储
// ==========================================
// 对齐: agences_livraison 表，(pays, agence) 唯一
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::logistics::DeliveryAgency;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct AgencyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AgencyRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, country: &str, agency: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO agences_livraison (pays, agence) VALUES (?1, ?2)",
            params![country, agency],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 重命名（按 国家 + 原名称 定位）
    pub fn rename(&self, country: &str, old_name: &str, new_name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE agences_livraison SET agence = ?1 WHERE pays = ?2 AND agence = ?3",
            params![new_name, country, old_name],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found(
                "DeliveryAgency",
                format!("{}/{}", country, old_name),
            ));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM agences_livraison WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("DeliveryAgency", id));
        }
        Ok(())
    }

    /// 全部快递公司（按国家、名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<DeliveryAgency>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, pays, agence FROM agences_livraison ORDER BY pays ASC, agence ASC",
        )?;
        let agencies = stmt
            .query_map([], |row| {
                Ok(DeliveryAgency {
                    id: row.get(0)?,
                    country: row.get(1)?,
                    agency: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(agencies)
    }

    /// 某国家最先登记的快递公司
    pub fn first_agency_of(&self, country: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let agency = conn
            .query_row(
                "SELECT agence FROM agences_livraison WHERE pays = ?1 ORDER BY id ASC LIMIT 1",
                params![country],
                |row| row.get(0),
            )
            .optional()?;
        Ok(agency)
    }

    /// 不同快递公司名称数
    pub fn count_distinct_names(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(DISTINCT agence) FROM agences_livraison",
            [],
            |row| row.get(0),
        )?)
    }
}
