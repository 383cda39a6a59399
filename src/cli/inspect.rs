//! # inspect 子命令 CLI 定义
//!
//! 查看单个结果文件
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/inspect.rs`

use clap::Args;
use std::path::PathBuf;

/// inspect 子命令参数
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Stored result file (.cbor)
    pub file: PathBuf,
}
