// ==========================================
// DCP 追踪系统 - 日志初始化
// ==========================================
// 级别: RUST_LOG（缺省 info）
// 格式: DCP_TRACKER_LOG_FORMAT=json 时输出 JSON，其余为文本
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "DCP_TRACKER_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// 从环境变量取值解析，无法识别时按文本处理
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// 初始化日志
///
/// ```no_run
/// dcp_tracker::logging::init();
/// tracing::info!("ready");
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = LogFormat::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

    match format {
        LogFormat::Json => fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .init(),
    }
}

/// 测试用日志（debug 级别，写入测试输出；可重复调用）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
