// ==========================================
// DCP 追踪系统 - 质检数据仓储
// ==========================================
// 对齐: controle_qualite 表（lot_id 无外键，批次删除后记录保留）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::quality::QualityControl;
use crate::domain::types::TestResult;
use crate::repository::error::{unrecognized_text, RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const CONTROL_COLUMNS: &str = "c.id, c.lot_id, c.type_carte, c.quantite, c.quantite_a_tester, \
                               c.date_controle, c.remarque, c.resultat";

/// 质检记录 + 关联批次信息（批次已删除时为 None）
pub type ControlWithLot = (QualityControl, Option<String>, Option<String>);

/// 新增质检行（id 由库分配）
#[derive(Debug, Clone)]
pub struct NewQualityControl {
    pub lot_id: i64,
    pub card_type: String,
    pub quantity: u32,
    pub quantity_to_test: u32,
    pub control_date: NaiveDate,
    pub remark: String,
    pub result: TestResult,
}

// ==========================================
// QualityRepository
// ==========================================
pub struct QualityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl QualityRepository {
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

    /// 批量插入一次质检录入的全部卡种（单事务）
    ///
    /// # 返回
    /// 新记录ID（与输入顺序一致）
    pub fn insert_batch(&self, controls: &[NewQualityControl]) -> RepositoryResult<Vec<i64>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(controls.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO controle_qualite (
                    lot_id, type_carte, quantite, quantite_a_tester,
                    date_controle, remarque, resultat
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;
            for c in controls {
                stmt.execute(params![
                    c.lot_id,
                    c.card_type,
                    c.quantity,
                    c.quantity_to_test,
                    c.control_date,
                    c.remark,
                    c.result.to_db_str(),
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    /// 更新质检记录（全字段覆盖，id 不变）
    pub fn update(&self, control: &QualityControl) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE controle_qualite SET
                lot_id = ?1, type_carte = ?2, quantite = ?3, quantite_a_tester = ?4,
                date_controle = ?5, remarque = ?6, resultat = ?7
            WHERE id = ?8
            "#,
            params![
                control.lot_id,
                control.card_type,
                control.quantity,
                control.quantity_to_test,
                control.control_date,
                control.remark,
                control.result.to_db_str(),
                control.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("QualityControl", control.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM controle_qualite WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("QualityControl", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<QualityControl>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM controle_qualite c WHERE c.id = ?1", CONTROL_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_control).optional()?)
    }

    /// 全部质检记录（左连接批次，按ID升序）
    pub fn list_with_lots(&self) -> RepositoryResult<Vec<ControlWithLot>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}, l.nom_lot, l.filiale
            FROM controle_qualite c
            LEFT JOIN lots l ON l.id = c.lot_id
            ORDER BY c.id ASC
            "#,
            CONTROL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Ok((map_control(row)?, row.get(8)?, row.get(9)?)))?
            .collect::<rusqlite::Result<Vec<ControlWithLot>>>()?;
        Ok(rows)
    }

    /// 指定批次集合的质检记录
    pub fn find_by_lot_ids(&self, lot_ids: &[i64]) -> RepositoryResult<Vec<QualityControl>> {
        if lot_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;
        let placeholders = vec!["?"; lot_ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM controle_qualite c WHERE c.lot_id IN ({}) ORDER BY c.id ASC",
            CONTROL_COLUMNS, placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let controls = stmt
            .query_map(params_from_iter(lot_ids.iter()), map_control)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(controls)
    }

    /// 已有质检记录的批次ID（去重）
    pub fn controlled_lot_ids(&self) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT lot_id FROM controle_qualite ORDER BY lot_id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }
}

fn map_control(row: &Row<'_>) -> rusqlite::Result<QualityControl> {
    let raw_result: String = row.get(7)?;
    let result =
        TestResult::from_db_str(&raw_result).ok_or_else(|| unrecognized_text(7, &raw_result))?;
    Ok(QualityControl {
        id: row.get(0)?,
        lot_id: row.get(1)?,
        card_type: row.get(2)?,
        quantity: row.get(3)?,
        quantity_to_test: row.get(4)?,
        control_date: row.get(5)?,
        remark: row.get(6)?,
        result,
    })
}
