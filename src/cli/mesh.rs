//! # mesh 子命令 CLI 定义
//!
//! 校验配置并预览成分网格，不调用引擎
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/mesh.rs`

use clap::Args;
use std::path::PathBuf;

/// mesh 子命令参数
#[derive(Args, Debug)]
pub struct MeshArgs {
    /// Sweep configuration file (TOML)
    pub config: PathBuf,

    /// Write every composition point to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Number of points to print in the preview table
    #[arg(long, default_value_t = 20)]
    pub show: usize,
}
