//! # plot 子命令 CLI 定义
//!
//! 将单个结果文件绘制为相图
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/plot.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 图像格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlotFormat {
    /// PNG bitmap
    Png,
    /// SVG vector
    Svg,
}

impl PlotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

/// plot 子命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Stored result file (.cbor)
    pub file: PathBuf,

    /// Output image path (default: next to the input, with the format's extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image format
    #[arg(short, long, value_enum, default_value = "png")]
    pub format: PlotFormat,

    /// Also export the phase groups as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 900)]
    pub height: u32,
}
