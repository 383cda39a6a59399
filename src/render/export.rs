//! # 相图数据导出
//!
//! 将各稳定相组合的坐标序列展开为长表 CSV：`phases, x, y`。
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{PhaseSweepError, Result};
use crate::models::PhaseDiagramResult;

use std::path::Path;

/// 导出分组数据为 CSV
pub fn groups_to_csv(result: &PhaseDiagramResult, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    let x_header = header_or(result.x_quantity(), "x");
    let y_header = header_or(result.y_quantity(), "y");
    wtr.write_record(["phases", x_header, y_header])?;

    for (phases, group) in result.groups() {
        for (x, y) in group.points() {
            wtr.write_record([phases.to_string(), format!("{:.6}", x), format!("{:.4}", y)])?;
        }
    }

    wtr.flush().map_err(|e| PhaseSweepError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

fn header_or<'a>(quantity: &'a str, fallback: &'a str) -> &'a str {
    if quantity.trim().is_empty() {
        fallback
    } else {
        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhaseGroup;

    #[test]
    fn test_groups_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.csv");
        let result = PhaseDiagramResult::new("X(Cr)", "")
            .with_group("FCC_L12", PhaseGroup::new(vec![0.1, 0.2], vec![800.0, 900.0]))
            .with_group("BCC_B2", PhaseGroup::new(vec![0.3], vec![1000.0]));

        groups_to_csv(&result, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "phases,X(Cr),y");
        assert_eq!(lines[1], "BCC_B2,0.300000,1000.0000");
        assert_eq!(lines.len(), 4);
    }
}
