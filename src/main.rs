// ==========================================
// 坩埚监控调度系统 - 命令行入口
// ==========================================
// 用法: cauldron-aps [audit|schedule|all] [data_dir] [config.json]
// 输出: JSON 报告写入 stdout，日志写入 stderr
// ==========================================

use anyhow::{bail, Context};
use cauldron_aps::config::ConfigManager;
use cauldron_aps::importer::JsonDirectorySource;
use cauldron_aps::{logging, AuditApi, ScheduleApi, APP_NAME, VERSION};
use std::path::PathBuf;
use tracing::info;

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "all".to_string());
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let config_path = args.next().map(PathBuf::from);

    info!(app = APP_NAME, version = VERSION, command = %command, "启动");

    let config = match &config_path {
        Some(path) => ConfigManager::from_file(path)
            .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
        None => ConfigManager::from_default_location().context("加载默认配置失败")?,
    }
    .with_env_overrides()
    .context("应用环境变量覆写失败")?;

    let source = JsonDirectorySource::new(&data_dir)
        .with_context(|| format!("打开数据目录失败: {}", data_dir.display()))?;

    let output = match command.as_str() {
        "audit" => {
            let report = AuditApi::new(config).run_audit(&source)?;
            serde_json::to_value(report)?
        }
        "schedule" => {
            let report = ScheduleApi::new(config).run_schedule(&source, None)?;
            serde_json::to_value(report)?
        }
        "all" => {
            let audit = AuditApi::new(config.clone()).run_audit(&source)?;
            let schedule = ScheduleApi::new(config).run_schedule(&source, None)?;
            serde_json::json!({ "audit": audit, "schedule": schedule })
        }
        other => bail!("未知命令: {} (可选: audit | schedule | all)", other),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
