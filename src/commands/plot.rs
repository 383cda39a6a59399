//! # plot 命令实现
//!
//! 读取单个结果文件，绘制相图，可选导出分组数据 CSV。
//! 图标题取文件名（即成分的规范名称）。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的参数
//! - 使用 `store/` 读取记录
//! - 使用 `render/` 绘图和导出

use crate::cli::plot::{PlotArgs, PlotFormat};
use crate::error::{PhaseSweepError, Result};
use crate::render::{export, plot};
use crate::store;
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 执行 plot 命令
pub fn execute(args: PlotArgs) -> Result<()> {
    output::print_header("Phase Diagram Plot");

    let result = store::load(&args.file)?;
    if result.is_empty() {
        return Err(PhaseSweepError::InvalidArgument(format!(
            "'{}' contains no phase boundaries to plot",
            args.file.display()
        )));
    }

    let image = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.file, args.format));
    let title = plot_title(&args.file);

    plot::generate_phase_plot(
        &result,
        &image,
        &title,
        args.width,
        args.height,
        args.format == PlotFormat::Svg,
    )?;
    output::print_success(&format!("Plot saved to '{}'", image.display()));

    if let Some(csv_path) = &args.csv {
        export::groups_to_csv(&result, csv_path)?;
        output::print_success(&format!("Data saved to '{}'", csv_path.display()));
    }

    Ok(())
}

/// 图标题：文件名去掉扩展名
fn plot_title(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

/// 默认输出：与输入同名，扩展名取图像格式
fn default_output(input: &Path, format: PlotFormat) -> PathBuf {
    input.with_extension(format.extension())
}
