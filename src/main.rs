//! # phasesweep - 合金成分扫描与相图批量计算工具
//!
//! 在多组元合金的成分空间上生成网格，逐点调用外部热力学引擎计算相图，
//! 并把每个成分点的结果保存为以规范名称命名的文件。
//!
//! ## 子命令
//! - `init`    - 写出示例扫描配置
//! - `mesh`    - 校验配置并预览成分网格
//! - `sweep`   - 执行扫描
//! - `inspect` - 查看单个结果文件
//! - `collect` - 汇总结果目录为 CSV
//! - `plot`    - 绘制单个结果的相图
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── config.rs  (扫描配置)
//!   │     ├── mesh/      (成分网格)
//!   │     ├── engine/    (引擎会话与重试)
//!   │     ├── store/     (结果存储)
//!   │     ├── batch/     (扫描驱动与结果整理)
//!   │     ├── render/    (绘图与导出)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   ├── logging.rs  (日志初始化)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod engine;
mod error;
mod logging;
mod mesh;
mod models;
mod render;
mod store;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
