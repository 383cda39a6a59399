//! # 日志初始化
//!
//! 基于 `tracing-subscriber` 的日志输出：终端（stderr）按 -v/-q 过滤，
//! 可选追加一个不带颜色的日志文件。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 日志宏 (`tracing::info!` 等) 在 `batch/`, `engine/` 中使用

use crate::error::{PhaseSweepError, Result};

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// -v 次数和 -q 对应的日志级别
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// 初始化全局日志
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(level_filter(verbosity, quiet));

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| PhaseSweepError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
            // 日志文件始终记录到 DEBUG
            let file_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_filter(LevelFilter::DEBUG);
            registry.with(file_layer).try_init()
        }
        None => registry.try_init(),
    };

    result.map_err(|e| PhaseSweepError::Other(format!("cannot initialize logging: {}", e)))
}
