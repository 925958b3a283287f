//! 日志初始化
//!
//! 自省与绑定过程通过 `tracing` 输出事件：解析计划构建为 debug，缓存命中与逐属性绑定为 trace。
//! 需要观察绑定细节时设置 `bind_level`，不影响其他模块的日志级别。

use std::str::FromStr;

use anyhow::{anyhow, Context};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Environment;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 紧凑格式（默认）
    Compact,
    Full,
    Json,
    /// 适合开发环境
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 全局级别（默认：Info）
    pub level: LogLevel,

    /// 绑定相关模块（`chimera_bind*`）的级别，未设置时跟随全局级别
    pub bind_level: Option<LogLevel>,

    pub format: LogFormat,

    pub show_target: bool,

    /// 自定义过滤器，优先级最高，例如 `my_app=debug,chimera_bind=trace`
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            bind_level: None,
            format: LogFormat::Compact,
            show_target: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn bind_level(mut self, level: LogLevel) -> Self {
        self.bind_level = Some(level);
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// 从环境变量读取：`RUST_LOG`、`LOG_LEVEL`、`LOG_FORMAT`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            config.filter = Some(rust_log);
        }
        if let Some(level) = std::env::var("LOG_LEVEL").ok().and_then(|s| s.parse().ok()) {
            config.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|s| s.parse().ok()) {
            config.format = format;
        }

        config
    }

    /// 从配置读取 `chimera.logging.*`，缺失的键保持默认值
    pub fn from_environment(env: &Environment) -> Self {
        let mut config = Self::default();

        if let Some(level) = env.get_string("chimera.logging.level").and_then(|s| s.parse().ok()) {
            config.level = level;
        }
        config.bind_level = env
            .get_string("chimera.logging.bind-level")
            .and_then(|s| s.parse().ok());
        if let Some(format) = env.get_string("chimera.logging.format").and_then(|s| s.parse().ok()) {
            config.format = format;
        }
        if let Some(show) = env.get_bool("chimera.logging.show-target") {
            config.show_target = show;
        }
        config.filter = env.get_string("chimera.logging.filter");

        config
    }

    /// 过滤指令
    pub fn directives(&self) -> String {
        if let Some(filter) = &self.filter {
            return filter.clone();
        }
        match self.bind_level {
            Some(bind) => format!(
                "{},chimera_bind={},chimera_bind_web={}",
                self.level, bind, bind
            ),
            None => self.level.to_string(),
        }
    }

    /// 初始化全局订阅者，重复初始化返回错误
    pub fn init(self) -> anyhow::Result<()> {
        let env_filter = EnvFilter::try_new(self.directives())
            .with_context(|| format!("Invalid log filter: {}", self.directives()))?;

        let result = match self.format {
            LogFormat::Compact => fmt()
                .with_env_filter(env_filter)
                .compact()
                .with_target(self.show_target)
                .try_init(),
            LogFormat::Full => fmt()
                .with_env_filter(env_filter)
                .with_target(self.show_target)
                .try_init(),
            LogFormat::Json => fmt()
                .with_env_filter(env_filter)
                .json()
                .with_target(self.show_target)
                .try_init(),
            LogFormat::Pretty => fmt()
                .with_env_filter(env_filter)
                .pretty()
                .with_target(self.show_target)
                .try_init(),
        };

        result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
    }
}
