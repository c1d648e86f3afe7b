//! 日志初始化
//!
//! 安装 `tracing-subscriber` fmt 订阅器，并把 `log` crate 的记录桥接到 tracing。
//!
//! 过滤规则优先读取 `RUST_LOG`，未设置时使用 [`DEFAULT_DIRECTIVE`]：
//!
//! ```bash
//! RUST_LOG=reflex_trajectory=debug,reflex_control=debug cargo test
//! ```

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// 默认过滤规则
pub const DEFAULT_DIRECTIVE: &str = "reflex=info";

/// 日志初始化错误
#[derive(Debug, Error)]
pub enum LoggingError {
    /// 过滤规则无法解析
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// 全局 tracing 订阅器已存在
    #[error("Tracing subscriber already installed: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// `log` 全局 logger 已存在
    #[error("Log bridge already installed: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// 构造过滤器：`RUST_LOG` 优先，否则使用 `default_directive`
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))?)
}

/// 使用默认过滤规则初始化日志
///
/// 已有全局订阅器时返回错误。
pub fn try_init() -> Result<(), LoggingError> {
    try_init_with(DEFAULT_DIRECTIVE)
}

/// 使用指定的默认过滤规则初始化日志
pub fn try_init_with(default_directive: &str) -> Result<(), LoggingError> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive)?)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    LogTracer::init_with_filter(log::LevelFilter::Trace)?;
    Ok(())
}

/// 初始化日志
///
/// # Panics
///
/// 已有全局订阅器时 panic；测试或库代码请使用 [`try_init`]。
pub fn init() {
    if let Err(e) = try_init() {
        panic!("failed to initialize logging: {e}");
    }
}
