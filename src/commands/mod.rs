//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `mesh/`, `engine/`, `store/`, `render/`, `utils/`
//! - 子模块: init, mesh, sweep, inspect, collect, plot

pub mod collect;
pub mod init;
pub mod inspect;
pub mod mesh;
pub mod plot;
pub mod sweep;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init(args) => init::execute(args),
        Commands::Mesh(args) => mesh::execute(args),
        Commands::Sweep(args) => sweep::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Collect(args) => collect::execute(args),
        Commands::Plot(args) => plot::execute(args),
    }
}
