//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。命令行只指向配置文件和结果文件，
//! 扫描参数本身全部来自配置结构。
//!
//! ## 命令结构
//! - `init`: 写出示例配置
//! - `mesh`: 校验配置并预览成分网格
//! - `sweep`: 执行扫描
//! - `inspect`: 查看单个结果文件
//! - `collect`: 汇总结果目录
//! - `plot`: 绘制相图
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: init, mesh, sweep, inspect, collect, plot

pub mod collect;
pub mod init;
pub mod inspect;
pub mod mesh;
pub mod plot;
pub mod sweep;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// phasesweep - 合金成分扫描与相图计算调度
#[derive(Parser)]
#[command(name = "phasesweep")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Sweep alloy compositions through an external phase-diagram engine", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Write an example sweep configuration
    Init(init::InitArgs),

    /// Validate a configuration and preview its composition mesh
    Mesh(mesh::MeshArgs),

    /// Run the composition sweep
    Sweep(sweep::SweepArgs),

    /// Show the phase groups of one stored result
    Inspect(inspect::InspectArgs),

    /// Summarize a directory of stored results into CSV
    Collect(collect::CollectArgs),

    /// Render a stored phase diagram to PNG or SVG
    Plot(plot::PlotArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sweep_with_global_flags() {
        let cli = Cli::try_parse_from(["phasesweep", "sweep", "sweep.toml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Sweep(args) => assert_eq!(args.config, PathBuf::from("sweep.toml")),
            _ => panic!("expected sweep"),
        }
    }
}
