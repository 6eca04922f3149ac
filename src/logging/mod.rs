//! 日志系统

pub mod formatter;

use crate::error::FleetError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: String,
    /// 日志文件路径
    pub file_path: Option<String>,
    /// 是否启用彩色输出
    pub colored: bool,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 是否启用美化输出
    pub pretty: bool,
    /// 日志轮转配置
    pub rotation: LogRotation,
}

/// 日志轮转配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    /// 不轮转
    Never,
    /// 每小时轮转
    Hourly,
    /// 每天轮转
    Daily,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            colored: true,
            show_target: false,
            pretty: true,
            rotation: LogRotation::Daily,
        }
    }
}

impl LogConfig {
    /// 解析日志级别，无法识别时使用 INFO
    pub fn level_filter(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

/// 初始化日志系统
///
/// 写入文件时返回的 guard 必须保留到程序退出，否则缓冲的日志会丢失。
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>, FleetError> {
    let env_filter = EnvFilter::from_default_env().add_directive(config.level_filter().into());

    // 控制台输出层
    let console_layer = if config.pretty {
        fmt::layer()
            .with_ansi(config.colored)
            .with_target(config.show_target)
            .event_format(formatter::FleetFormatter::new(config.colored))
            .boxed()
    } else {
        fmt::layer()
            .with_ansi(config.colored)
            .with_target(config.show_target)
            .boxed()
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(console_layer);

    // 文件输出层
    let Some(file_path) = config.file_path else {
        registry
            .try_init()
            .map_err(|e| FleetError::System(format!("Failed to install logger: {}", e)))?;
        return Ok(None);
    };

    let file_path = Path::new(&file_path);
    let directory = file_path.parent().unwrap_or(Path::new("."));
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("multiminer.log");

    let (writer, guard) = match config.rotation {
        LogRotation::Never => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            tracing_appender::non_blocking(file)
        }
        LogRotation::Hourly => tracing_appender::non_blocking(rolling::hourly(directory, file_name)),
        LogRotation::Daily => tracing_appender::non_blocking(rolling::daily(directory, file_name)),
    };

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .json();

    registry
        .with(file_layer)
        .try_init()
        .map_err(|e| FleetError::System(format!("Failed to install logger: {}", e)))?;

    Ok(Some(guard))
}

#[macro_export]
macro_rules! fleet_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "fleet", $($arg)*)
    };
}

#[macro_export]
macro_rules! device_debug {
    ($device:expr, $($arg:tt)*) => {
        tracing::debug!(target: "device", device = %$device, $($arg)*)
    };
}

#[macro_export]
macro_rules! market_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "market", $($arg)*)
    };
}

#[macro_export]
macro_rules! market_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "market", $($arg)*)
    };
}
