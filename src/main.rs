// ==========================================
// DCP 追踪系统 - 命令行入口
// ==========================================
// 用法:
//   dcp-tracker plan <YYYY-MM-DD> <filiale>
//   dcp-tracker export-packaging <csv_path>
//   dcp-tracker subsidiaries <YYYY-MM-DD>
//   dcp-tracker overview
// 数据库路径: 环境变量 DCP_TRACKER_DB_PATH 或用户数据目录
// 语言: DCP_TRACKER_LOCALE（fr / en）
// ==========================================

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use dcp_tracker::app::{get_default_db_path, AppState};
use dcp_tracker::domain::PackagingFilter;
use dcp_tracker::i18n;

/// 界面语言环境变量
const LOCALE_ENV: &str = "DCP_TRACKER_LOCALE";

const USAGE: &str = "用法:
  dcp-tracker plan <YYYY-MM-DD> <filiale>
  dcp-tracker export-packaging <csv_path>
  dcp-tracker subsidiaries <YYYY-MM-DD>
  dcp-tracker overview";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dcp_tracker::logging::init();
    let locale = std::env::var(LOCALE_ENV).unwrap_or_else(|_| i18n::DEFAULT_LOCALE.to_string());
    i18n::set_locale(&locale);

    tracing::info!("==================================================");
    tracing::info!("{}", dcp_tracker::APP_NAME);
    tracing::info!("系统版本: {}", dcp_tracker::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first() {
        Some(c) => c.as_str(),
        None => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match (command, &args[1..]) {
        ("plan", [date, subsidiary]) => {
            let date = parse_date(date)?;
            let plan = state
                .packaging_api
                .prepare_plan(date, subsidiary, &HashMap::new())?;
            for group in &plan.groups {
                println!(
                    "[{}] {} | total={} vip={} non_vip={}",
                    group.group.lot_type,
                    group.group.joined_lot_names(),
                    group.group.total_quantity(),
                    group.vip_totals.vip_total,
                    group.non_vip_quantity
                );
                for line in &group.lines {
                    println!(
                        "  {:<10} {:>5}  vip={} packs={}  {}",
                        line.packaging_kind.to_string(),
                        line.card_count,
                        line.vip_card_count,
                        line.vip_pack_count,
                        line.remark
                    );
                }
            }
        }
        ("export-packaging", [path]) => {
            let rows = state
                .packaging_api
                .export_csv(&PackagingFilter::default(), Path::new(path))?;
            println!("{}", i18n::t_with_args("export.file_written", &[("path", path.as_str())]));
            tracing::info!(rows, "导出完成");
        }
        ("subsidiaries", [date]) => {
            let date = parse_date(date)?;
            for subsidiary in state.packaging_api.list_subsidiaries_on(date)? {
                println!("{}", subsidiary);
            }
        }
        ("overview", []) => {
            let overview = state.dashboard_api.overview().await?;
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        _ => bail!("无法识别的命令\n{}", USAGE),
    }

    Ok(())
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("日期格式错误: {}", raw))
}
