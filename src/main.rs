use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Arg, Command};
use job_context::app::{DemoApp, DemoSummary};
use job_context::shutdown::wait_for_shutdown_signal;
use job_context_config::{AppConfig, ConfigValidator, LogLevel, OutputFormat};
use job_context_observability::init_structured_logging;
use tracing::{error, info};

fn main() -> Result<()> {
    // 解析命令行参数
    let matches = Command::new("job-context")
        .version("1.0.0")
        .about("线程级作业上下文演示")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径"),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_name("COUNT")
                .help("演示作业数量")
                .value_parser(clap::value_parser!(usize))
                .default_value("6"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别（覆盖配置文件）")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式（覆盖配置文件）")
                .value_parser(["json", "pretty", "compact"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");
    let jobs = matches.get_one::<usize>("jobs").copied().unwrap_or(6);

    // 加载配置
    let mut config = AppConfig::load(config_path.map(String::as_str))
        .with_context(|| format!("加载配置失败: {config_path:?}"))?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.logging.format = format.parse::<OutputFormat>().map_err(|e| anyhow!(e))?;
    }
    config.validate()?;

    // 初始化日志系统
    init_structured_logging(&config.logging)?;

    let runtime = build_runtime(&config)?;
    let summary = runtime.block_on(run_demo(&config, jobs));

    match summary {
        Ok(summary) => {
            info!(total = summary.total(), "作业上下文演示已退出");
            Ok(())
        }
        Err(e) => {
            error!("演示运行失败: {e:#}");
            Err(e)
        }
    }
}

async fn run_demo(config: &AppConfig, jobs: usize) -> Result<DemoSummary> {
    let app = DemoApp::new(config, jobs)?;
    let manager = app.manager();

    let watcher = tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("收到关闭信号，中断作业执行");
        manager.interrupt();
    });

    let summary = app.run().await;
    watcher.abort();
    summary
}

/// 构建运行时，每个线程（包括阻塞线程）都有唯一名称
fn build_runtime(config: &AppConfig) -> Result<tokio::runtime::Runtime> {
    let prefix = config.worker.thread_name_prefix.clone();
    let next_id = Arc::new(AtomicUsize::new(1));

    tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(config.worker.max_threads)
        .thread_name_fn(move || {
            let id = next_id.fetch_add(1, Ordering::Relaxed);
            format!("{prefix}-{id}")
        })
        .enable_all()
        .build()
        .context("创建Tokio运行时失败")
}
