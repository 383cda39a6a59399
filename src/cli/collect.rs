//! # collect 子命令 CLI 定义
//!
//! 读取结果目录并汇总为 CSV
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`

use clap::Args;
use std::path::PathBuf;

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Directory containing stored results
    pub results_dir: PathBuf,

    /// Filename for the summary CSV
    #[arg(short, long, default_value = "summary.csv")]
    pub output: PathBuf,

    /// File pattern(s), comma separated
    #[arg(short, long, default_value = "*.cbor")]
    pub pattern: String,

    /// Search subdirectories as well
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Number of rows to print in the terminal table
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,
}
