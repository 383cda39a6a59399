//! # 统一错误处理模块
//!
//! 定义 phasesweep 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 引擎边界的错误定义在 `engine/mod.rs`（`EngineError`），这里通过 `#[from]` 接入

use crate::engine::EngineError;
use thiserror::Error;

/// phasesweep 统一错误类型
#[derive(Error, Debug)]
pub enum PhaseSweepError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    NotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 配置错误（在任何引擎调用和文件写入之前抛出）
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Failed to parse configuration file: {path}\nReason: {reason}")]
    ConfigParse { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to serialize result for {name}\nReason: {reason}")]
    Serialization { name: String, reason: String },

    #[error("Failed to deserialize stored result: {path}\nReason: {reason}")]
    Deserialization { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 引擎错误
    // ─────────────────────────────────────────────────────────────
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Sweep finished with {failed} of {total} composition points failed")]
    SweepFailed { failed: usize, total: usize },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl PhaseSweepError {
    /// 构造配置错误
    pub fn config(msg: impl Into<String>) -> Self {
        PhaseSweepError::Configuration(msg.into())
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, PhaseSweepError>;
