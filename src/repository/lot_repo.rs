// ==========================================
// DCP 追踪系统 - 生产批次数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（抽检数由调用方计算后传入）
// 约束: 所有查询使用参数化
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::lot::{Lot, LotDraft};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const LOT_COLUMNS: &str = "id, nom_lot, type_lot, quantite, date_production, date_enregistrement, \
                           filiale, impression_pin, nombre_pin, cartes_a_tester";

// ==========================================
// LotRepository - 批次仓储
// ==========================================
/// 职责: 管理 lots 表的 CRUD 操作
pub struct LotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LotRepository {
    /// 创建新的 LotRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入批次
    ///
    /// # 返回
    /// - Ok(i64): 新批次ID
    /// - Err(UniqueConstraintViolation): 批次名已存在
    pub fn insert(&self, draft: &LotDraft, cards_to_test: u32) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO lots (
                nom_lot, type_lot, quantite, date_production, date_enregistrement,
                filiale, impression_pin, nombre_pin, cartes_a_tester
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                draft.lot_name,
                draft.lot_type,
                draft.quantity,
                draft.production_date,
                draft.registration_date,
                draft.subsidiary,
                pin_flag_to_db(draft.pin_printing),
                draft.pin_count,
                cards_to_test,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新批次（全字段覆盖）
    pub fn update(&self, id: i64, draft: &LotDraft, cards_to_test: u32) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE lots SET
                nom_lot = ?1, type_lot = ?2, quantite = ?3, date_production = ?4,
                date_enregistrement = ?5, filiale = ?6, impression_pin = ?7,
                nombre_pin = ?8, cartes_a_tester = ?9
            WHERE id = ?10
            "#,
            params![
                draft.lot_name,
                draft.lot_type,
                draft.quantity,
                draft.production_date,
                draft.registration_date,
                draft.subsidiary,
                pin_flag_to_db(draft.pin_printing),
                draft.pin_count,
                cards_to_test,
                id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Lot", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM lots WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Lot", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Lot>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM lots WHERE id = ?1", LOT_COLUMNS);
        let lot = conn.query_row(&sql, params![id], map_lot).optional()?;
        Ok(lot)
    }

    pub fn find_by_name(&self, lot_name: &str) -> RepositoryResult<Option<Lot>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM lots WHERE nom_lot = ?1", LOT_COLUMNS);
        let lot = conn.query_row(&sql, params![lot_name], map_lot).optional()?;
        Ok(lot)
    }

    /// 查询全部批次（按ID升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Lot>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM lots ORDER BY id ASC", LOT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let lots = stmt
            .query_map([], map_lot)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lots)
    }

    /// 查询某登记日期的批次（按ID升序，即登记顺序）
    pub fn find_by_registration_date(&self, date: NaiveDate) -> RepositoryResult<Vec<Lot>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM lots WHERE date_enregistrement = ?1 ORDER BY id ASC",
            LOT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let lots = stmt
            .query_map(params![date], map_lot)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lots)
    }

    /// 查询某登记日期、某分公司的批次
    pub fn find_by_date_and_subsidiary(
        &self,
        date: NaiveDate,
        subsidiary: &str,
    ) -> RepositoryResult<Vec<Lot>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM lots WHERE date_enregistrement = ?1 AND filiale = ?2 ORDER BY id ASC",
            LOT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let lots = stmt
            .query_map(params![date, subsidiary], map_lot)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lots)
    }

    /// 某登记日期有批次的分公司（去重，按首次登记顺序）
    pub fn distinct_subsidiaries_on(&self, date: NaiveDate) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT filiale FROM lots
            WHERE date_enregistrement = ?1
            GROUP BY filiale
            ORDER BY MIN(id) ASC
            "#,
        )?;
        let subsidiaries = stmt
            .query_map(params![date], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(subsidiaries)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM lots", [], |row| row.get(0))?)
    }
}

fn pin_flag_to_db(pin_printing: bool) -> &'static str {
    if pin_printing {
        "Oui"
    } else {
        "Non"
    }
}

fn map_lot(row: &Row<'_>) -> rusqlite::Result<Lot> {
    Ok(Lot {
        id: row.get(0)?,
        lot_name: row.get(1)?,
        lot_type: row.get(2)?,
        quantity: row.get(3)?,
        production_date: row.get(4)?,
        registration_date: row.get(5)?,
        subsidiary: row.get(6)?,
        pin_printing: row.get::<_, String>(7)?.trim() == "Oui",
        pin_count: row.get(8)?,
        cards_to_test: row.get(9)?,
    })
}
