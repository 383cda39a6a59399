//! # init 命令实现
//!
//! 写出一份可直接编辑的示例扫描配置。
//!
//! ## 依赖关系
//! - 使用 `cli/init.rs` 定义的参数
//! - 使用 `config.rs`

use crate::cli::init::InitArgs;
use crate::config::SweepConfig;
use crate::error::{PhaseSweepError, Result};
use crate::utils::output;

use std::fs;
use std::path::Path;

const CONFIG_HEADER: &str = "\
# phasesweep configuration
#
# Element roles:
#   fixed    value = <fraction>         (replaced by each entry of mesh.fixed_levels when given)
#   varying  min / max / steps          (max defaults to an even share of the remaining budget)
#   balance                             (takes 1 - sum of all other fractions)

";

/// 执行 init 命令
pub fn execute(args: InitArgs) -> Result<()> {
    output::print_header("Initialize Sweep Configuration");

    write_example(&args.path, args.force)?;

    output::print_success(&format!("Wrote example configuration to '{}'", args.path.display()));
    output::print_info(&format!(
        "Preview the mesh with: phasesweep mesh {}",
        args.path.display()
    ));
    Ok(())
}

/// 写出示例配置；目标已存在且未指定 `force` 时拒绝覆盖
pub fn write_example(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(PhaseSweepError::InvalidArgument(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let body = SweepConfig::example().to_toml()?;
    fs::write(path, format!("{}{}", CONFIG_HEADER, body)).map_err(|e| {
        PhaseSweepError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        }
    })
}
