// ==========================================
// DCP 追踪系统 - 包装台账数据仓储
// ==========================================
// 对齐: conditionnement 表
// 唯一键: (nom_lot, date_conditionnement, type_emballage, filiale, unit_seq)
// 红线: 重复记录由库约束识别，仓储只透传 UniqueConstraintViolation
// 取舍: unit_seq 让同组多个包裹各占一行；代价是批次数量修改后重新
//       生成方案时，同一 (批次, 日期, 包装类型, 分公司) 可能出现两条
//       信封记录（例如原方案 1 号信封 + 新方案 2 号信封），需人工删除
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::packaging::{PackagingLineRecord, PackagingRecord};
use crate::domain::types::PackagingKind;
use crate::repository::error::{unrecognized_text, RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const PACKAGING_COLUMNS: &str = "id, nom_lot, type_lot, filiale, type_emballage, nombre_cartes, \
                                 cartes_vip, packs, date_conditionnement, unit_seq, operateur, remarque";

/// 方案明细行的写入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineInsertOutcome {
    Inserted(i64),
    Duplicate(String), // 约束信息
}

pub struct PackagingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackagingRepository {
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

    /// 插入一条包装明细
    ///
    /// # 返回
    /// - Ok(i64): 新记录ID
    /// - Err(UniqueConstraintViolation): 同一唯一键已存在
    pub fn insert_line(
        &self,
        line: &PackagingLineRecord,
        packaging_date: NaiveDate,
        unit_seq: u32,
        operator: &str,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        insert_line_on(&conn, line, packaging_date, unit_seq, operator)
    }

    /// 在一个事务内写入整个方案的明细行
    ///
    /// 唯一键冲突的行记为 Duplicate 并继续；其他错误回滚整个事务
    ///
    /// # 参数
    /// - lines: (明细行, 单元序号)
    pub fn insert_plan_lines(
        &self,
        lines: &[(&PackagingLineRecord, u32)],
        packaging_date: NaiveDate,
        operator: &str,
    ) -> RepositoryResult<Vec<LineInsertOutcome>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut outcomes = Vec::with_capacity(lines.len());
        for (line, unit_seq) in lines {
            match insert_line_on(&tx, line, packaging_date, *unit_seq, operator) {
                Ok(id) => outcomes.push(LineInsertOutcome::Inserted(id)),
                Err(RepositoryError::UniqueConstraintViolation(msg)) => {
                    outcomes.push(LineInsertOutcome::Duplicate(msg))
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit()?;
        Ok(outcomes)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<PackagingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM conditionnement WHERE id = ?1", PACKAGING_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_record).optional()?)
    }

    /// 全部包装记录（按包装日期、ID 升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<PackagingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM conditionnement ORDER BY date_conditionnement ASC, id ASC",
            PACKAGING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], map_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// 修改备注、包装类型、卡数
    pub fn update(
        &self,
        id: i64,
        remark: &str,
        packaging_kind: PackagingKind,
        card_count: u32,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE conditionnement
            SET remarque = ?1, type_emballage = ?2, nombre_cartes = ?3
            WHERE id = ?4
            "#,
            params![remark, packaging_kind.to_db_str(), card_count, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("PackagingRecord", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM conditionnement WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("PackagingRecord", id));
        }
        Ok(())
    }

    /// 清空台账
    ///
    /// # 返回
    /// 删除的行数
    pub fn clear_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute("DELETE FROM conditionnement", [])?)
    }
}

fn insert_line_on(
    conn: &Connection,
    line: &PackagingLineRecord,
    packaging_date: NaiveDate,
    unit_seq: u32,
    operator: &str,
) -> RepositoryResult<i64> {
    conn.execute(
        r#"
        INSERT INTO conditionnement (
            nom_lot, type_lot, filiale, type_emballage, nombre_cartes,
            cartes_vip, packs, date_conditionnement, unit_seq, operateur, remarque
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            line.lot_names_joined,
            line.lot_type,
            line.subsidiary,
            line.packaging_kind.to_db_str(),
            line.card_count,
            line.vip_card_count,
            line.vip_pack_count,
            packaging_date,
            unit_seq,
            operator,
            line.remark,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<PackagingRecord> {
    let raw_kind: String = row.get(4)?;
    let packaging_kind =
        PackagingKind::from_db_str(&raw_kind).ok_or_else(|| unrecognized_text(4, &raw_kind))?;
    Ok(PackagingRecord {
        id: row.get(0)?,
        lot_names_joined: row.get(1)?,
        lot_type: row.get(2)?,
        subsidiary: row.get(3)?,
        packaging_kind,
        card_count: row.get(5)?,
        vip_card_count: row.get(6)?,
        vip_pack_count: row.get(7)?,
        packaging_date: row.get(8)?,
        unit_seq: row.get(9)?,
        operator: row.get(10)?,
        remark: row.get(11)?,
    })
}
