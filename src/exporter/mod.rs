// ==========================================
// DCP 追踪系统 - 导出层
// ==========================================
// 职责: 将台账数据写出为外部文件
// ==========================================

pub mod error;
pub mod packaging_csv;

pub use error::ExportError;
pub use packaging_csv::PackagingCsvExporter;
