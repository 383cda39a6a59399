//! # inspect 命令实现
//!
//! 读取单个结果文件，打印成分、数据库和各相组合的概要。
//!
//! ## 依赖关系
//! - 使用 `cli/inspect.rs` 定义的参数
//! - 使用 `store/` 读取记录
//! - 使用 `tabled` 打印表格

use crate::cli::inspect::InspectArgs;
use crate::error::Result;
use crate::models::PhaseDiagramResult;
use crate::store;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 相组合概要行
#[derive(Debug, Clone, Tabled)]
struct GroupRow {
    #[tabled(rename = "Phases")]
    phases: String,
    #[tabled(rename = "Points")]
    points: usize,
    #[tabled(rename = "X range")]
    x_range: String,
    #[tabled(rename = "Y range")]
    y_range: String,
}

/// 执行 inspect 命令
pub fn execute(args: InspectArgs) -> Result<()> {
    output::print_header("Inspect Result");

    let record = store::load_record(&args.file)?;
    let result = &record.result;

    output::print_field("File", &args.file.display().to_string());
    output::print_field("Composition", &record.composition.to_string());
    output::print_field("Database", &record.database);
    output::print_field("Format version", &record.format_version.to_string());
    output::print_field("X quantity", result.x_quantity());
    output::print_field("Y quantity", result.y_quantity());
    output::print_field("Phase groups", &result.group_count().to_string());
    output::print_field("Points", &result.point_count().to_string());
    println!();

    if result.is_empty() {
        output::print_warning("Result contains no phase boundaries");
        return Ok(());
    }

    println!("{}", Table::new(group_rows(result)));
    Ok(())
}

fn group_rows(result: &PhaseDiagramResult) -> Vec<GroupRow> {
    result
        .groups()
        .map(|(phases, group)| GroupRow {
            phases: phases.to_string(),
            points: group.len(),
            x_range: format_range(group.x_range(), 4),
            y_range: format_range(group.y_range(), 1),
        })
        .collect()
}

fn format_range(range: Option<(f64, f64)>, decimals: usize) -> String {
    match range {
        Some((lo, hi)) => format!("{:.*} - {:.*}", decimals, lo, decimals, hi),
        None => "-".to_string(),
    }
}
