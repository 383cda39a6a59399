//! # 批量处理模块
//!
//! 提供扫描驱动与结果文件的批量处理能力。
//!
//! ## 功能
//! - 顺序扫描驱动（引擎会话单线程使用）
//! - 结果文件收集与并行读取
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被各命令模块使用
//! - 使用 `rayon` 并行读取结果
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod parallel;
pub mod runner;

pub use collector::FileCollector;
pub use parallel::ParallelLoader;
pub use runner::{BatchResult, SweepRunner};
