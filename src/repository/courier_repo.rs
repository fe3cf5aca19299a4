// ==========================================
// DCP 追踪系统 - 快递员数据仓储
// ==========================================
// 对齐: livreurs 表，(agence, nom, prenom) 唯一
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::logistics::{Courier, CourierDraft};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct CourierRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CourierRepository {
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

    pub fn insert(&self, draft: &CourierDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO livreurs (agence, nom, prenom, contact) VALUES (?1, ?2, ?3, ?4)",
            params![draft.agency, draft.last_name, draft.first_name, draft.contact],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, draft: &CourierDraft) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE livreurs SET agence = ?1, nom = ?2, prenom = ?3, contact = ?4
            WHERE id = ?5
            "#,
            params![draft.agency, draft.last_name, draft.first_name, draft.contact, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Courier", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM livreurs WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Courier", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Courier>> {
        let conn = self.get_conn()?;
        let courier = conn
            .query_row(
                "SELECT id, agence, nom, prenom, contact FROM livreurs WHERE id = ?1",
                params![id],
                map_courier,
            )
            .optional()?;
        Ok(courier)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Courier>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, agence, nom, prenom, contact FROM livreurs ORDER BY id ASC")?;
        let couriers = stmt
            .query_map([], map_courier)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(couriers)
    }

    pub fn list_by_agency(&self, agency: &str) -> RepositoryResult<Vec<Courier>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, agence, nom, prenom, contact FROM livreurs WHERE agence = ?1 ORDER BY id ASC",
        )?;
        let couriers = stmt
            .query_map(params![agency], map_courier)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(couriers)
    }
}

fn map_courier(row: &Row<'_>) -> rusqlite::Result<Courier> {
    Ok(Courier {
        id: row.get(0)?,
        agency: row.get(1)?,
        last_name: row.get(2)?,
        first_name: row.get(3)?,
        contact: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}
