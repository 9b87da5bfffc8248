//! 日志系统初始化.
//!
//! 库 crate 通过 `log` 门面输出日志, 这里安装 tracing 订阅器接收它们:
//! 控制台输出到 stderr, 可选按天滚动的文件输出.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// 日志文件目录, 为空时只输出到控制台
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "adts".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// 安装全局订阅器, 进程内只能成功一次
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("无效的日志级别, level={}", config.level))?;

    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .event_format(LineFormatter { ansi: true });

    let file_layer = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)
                .with_context(|| format!("创建日志目录失败, path={directory}"))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&config.file_prefix)
                .filename_suffix("log")
                .build(directory)
                .with_context(|| format!("创建日志文件失败, path={directory}"))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            LOG_GUARD.set(guard).ok();
            Some(
                fmt::Layer::default()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .event_format(LineFormatter { ansi: false }),
            )
        }
        None => None,
    };

    Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志系统已初始化")?;

    Ok(())
}

/// 指定日期的日志文件路径
pub fn log_file_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}.{}.log", prefix, date.format("%Y-%m-%d")))
}

/// 单行日志格式: `[月-日 时:分:秒.毫秒] 级别 文件:行 > 内容`
struct LineFormatter {
    ansi: bool,
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        let meta = event.metadata();
        write!(
            writer,
            "[{:02}-{:02} {:02}:{:02}:{:02}.{:03}] ",
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis()
        )?;
        let level = meta.level().to_string();
        if self.ansi {
            let color = match *meta.level() {
                tracing::Level::ERROR => "\x1b[31m",
                tracing::Level::WARN => "\x1b[33m",
                tracing::Level::INFO => "\x1b[32m",
                _ => "\x1b[34m",
            };
            write!(writer, "{color}{level:5}\x1b[0m ")?;
        } else {
            write!(writer, "{level:5} ")?;
        }
        // log 门面转发的事件没有 tracing 的文件信息, 用 target 代替
        match (meta.file(), meta.line()) {
            (Some(file), Some(line)) => write!(writer, "{file}:{line} > ")?,
            _ => write!(writer, "{} > ", meta.target())?,
        }
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
