// ==========================================
// DCP 追踪系统 - 导出错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("文件写入失败: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV 编码失败: {0}")]
    Csv(#[from] csv::Error),
}
