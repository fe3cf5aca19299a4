// ==========================================
// DCP 追踪系统 - 发运数据仓储
// ==========================================
// 对齐: expedition 表（lot_id 唯一）/ references_expedition 表
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::logistics::{Shipment, ShipmentDraft};
use crate::domain::types::ShipmentStatus;
use crate::repository::error::{unrecognized_text, RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SHIPMENT_COLUMNS: &str = "e.id, e.lot_id, e.pays, e.statut, e.bordereau, e.reference, \
                                e.agence, e.agent_id, e.date_expedition";

/// 发运记录 + 批次名 + 快递员姓名（关联缺失时为 None）
pub type ShipmentWithNames = (Shipment, Option<String>, Option<String>);

pub struct ShipmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShipmentRepository {
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

    // ==========================================
    // 发运记录
    // ==========================================

    /// 插入发运记录
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): 该批次已登记发运
    pub fn insert(&self, draft: &ShipmentDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO expedition (
                lot_id, pays, statut, bordereau, reference, agence, agent_id, date_expedition
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                draft.lot_id,
                draft.country,
                draft.status.to_db_str(),
                draft.waybill,
                draft.reference,
                draft.agency,
                draft.courier_id,
                draft.shipment_date,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_status(&self, id: i64, status: ShipmentStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE expedition SET statut = ?1 WHERE id = ?2",
            params![status.to_db_str(), id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Shipment", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM expedition WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Shipment", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Shipment>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM expedition e WHERE e.id = ?1", SHIPMENT_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_shipment).optional()?)
    }

    pub fn find_by_lot_id(&self, lot_id: i64) -> RepositoryResult<Option<Shipment>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM expedition e WHERE e.lot_id = ?1", SHIPMENT_COLUMNS);
        Ok(conn.query_row(&sql, params![lot_id], map_shipment).optional()?)
    }

    /// 全部发运记录（左连接批次与快递员，按ID升序）
    pub fn list_with_names(&self) -> RepositoryResult<Vec<ShipmentWithNames>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {},
                   l.nom_lot,
                   CASE WHEN v.id IS NULL THEN NULL ELSE v.nom || ' ' || v.prenom END
            FROM expedition e
            LEFT JOIN lots l ON l.id = e.lot_id
            LEFT JOIN livreurs v ON v.id = e.agent_id
            ORDER BY e.id ASC
            "#,
            SHIPMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Ok((map_shipment(row)?, row.get(9)?, row.get(10)?)))?
            .collect::<rusqlite::Result<Vec<ShipmentWithNames>>>()?;
        Ok(rows)
    }

    /// 按状态原值计数
    pub fn count_by_status(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT statut, COUNT(*) FROM expedition GROUP BY statut")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }

    /// 按快递公司计数（数量降序）
    pub fn count_by_agency(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT agence, COUNT(*) AS n FROM expedition
            GROUP BY agence
            ORDER BY n DESC, agence ASC
            "#,
        )?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }

    /// 指定状态下按 (快递公司, 国家) 计数
    pub fn count_by_agency_and_country(
        &self,
        status: ShipmentStatus,
    ) -> RepositoryResult<Vec<(String, String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT agence, pays, COUNT(*) FROM expedition
            WHERE statut = ?1
            GROUP BY agence, pays
            ORDER BY agence ASC, pays ASC
            "#,
        )?;
        let counts = stmt
            .query_map(params![status.to_db_str()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }

    // ==========================================
    // 发运参考号
    // ==========================================

    pub fn find_reference(&self, country: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let reference = conn
            .query_row(
                "SELECT reference FROM references_expedition WHERE pays = ?1",
                params![country],
                |row| row.get(0),
            )
            .optional()?;
        Ok(reference)
    }

    pub fn upsert_reference(&self, country: &str, reference: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO references_expedition (pays, reference) VALUES (?1, ?2)
            ON CONFLICT(pays) DO UPDATE SET reference = excluded.reference
            "#,
            params![country, reference],
        )?;
        Ok(())
    }
}

fn map_shipment(row: &Row<'_>) -> rusqlite::Result<Shipment> {
    let raw_status: String = row.get(3)?;
    let status =
        ShipmentStatus::from_db_str(&raw_status).ok_or_else(|| unrecognized_text(3, &raw_status))?;
    Ok(Shipment {
        id: row.get(0)?,
        lot_id: row.get(1)?,
        country: row.get(2)?,
        status,
        waybill: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        reference: row.get(5)?,
        agency: row.get(6)?,
        courier_id: row.get(7)?,
        shipment_date: row.get(8)?,
    })
}
