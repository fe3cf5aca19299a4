// ==========================================
// DCP 追踪系统 - 包装台账 CSV 导出
// ==========================================
// 列顺序与台账表一致；日期 YYYY-MM-DD；包装类型为法文存储值
// ==========================================

use crate::domain::packaging::PackagingRecord;
use crate::exporter::error::ExportError;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// CSV 行（表头即字段 rename 值）
#[derive(Debug, Serialize)]
struct PackagingCsvRow<'a> {
    #[serde(rename = "id")]
    id: i64,
    #[serde(rename = "nom_lot")]
    lot_names_joined: &'a str,
    #[serde(rename = "type_lot")]
    lot_type: &'a str,
    #[serde(rename = "filiale")]
    subsidiary: &'a str,
    #[serde(rename = "type_emballage")]
    packaging_kind: &'static str,
    #[serde(rename = "nombre_cartes")]
    card_count: u32,
    #[serde(rename = "cartes_vip")]
    vip_card_count: u64,
    #[serde(rename = "packs")]
    vip_pack_count: u64,
    #[serde(rename = "date_conditionnement")]
    packaging_date: String,
    #[serde(rename = "operateur")]
    operator: &'a str,
    #[serde(rename = "remarque")]
    remark: &'a str,
}

impl<'a> From<&'a PackagingRecord> for PackagingCsvRow<'a> {
    fn from(r: &'a PackagingRecord) -> Self {
        Self {
            id: r.id,
            lot_names_joined: &r.lot_names_joined,
            lot_type: &r.lot_type,
            subsidiary: &r.subsidiary,
            packaging_kind: r.packaging_kind.to_db_str(),
            card_count: r.card_count,
            vip_card_count: r.vip_card_count,
            vip_pack_count: r.vip_pack_count,
            packaging_date: r.packaging_date.format("%Y-%m-%d").to_string(),
            operator: &r.operator,
            remark: &r.remark,
        }
    }
}

#[derive(Debug, Default)]
pub struct PackagingCsvExporter;

impl PackagingCsvExporter {
    pub fn new() -> Self {
        Self
    }

    /// 写入任意 Writer
    ///
    /// # 返回
    /// 写出的数据行数（不含表头）
    pub fn write_to<W: Write>(
        &self,
        writer: W,
        records: &[PackagingRecord],
    ) -> Result<usize, ExportError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in records {
            wtr.serialize(PackagingCsvRow::from(record))?;
        }
        wtr.flush().map_err(|e| ExportError::Csv(e.into()))?;
        Ok(records.len())
    }

    /// 写入文件（覆盖）
    pub fn write_file(&self, path: &Path, records: &[PackagingRecord]) -> Result<usize, ExportError> {
        let file = File::create(path).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let rows = self.write_to(file, records)?;
        tracing::info!(path = %path.display(), rows, "包装台账已导出");
        Ok(rows)
    }
}
