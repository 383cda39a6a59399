//! # sweep 子命令 CLI 定义
//!
//! 按配置执行成分扫描
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sweep.rs`

use clap::Args;
use std::path::PathBuf;

/// sweep 子命令参数
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Sweep configuration file (TOML)
    pub config: PathBuf,
}
