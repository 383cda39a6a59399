//! # mesh 命令实现
//!
//! 校验配置并预览将要计算的成分点，不调用引擎。
//!
//! ## 功能
//! - 各固定水平的点数与变化元素范围
//! - 前 N 个成分点的表格预览
//! - 可选导出全部成分点到 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/mesh.rs` 定义的参数
//! - 使用 `config.rs`, `mesh/`
//! - 使用 `tabled` 打印表格，`csv` 导出

use crate::cli::mesh::MeshArgs;
use crate::config::SweepConfig;
use crate::error::{PhaseSweepError, Result};
use crate::mesh::MeshSet;
use crate::utils::output;

use std::path::Path;
use tabled::builder::Builder;

/// 执行 mesh 命令
pub fn execute(args: MeshArgs) -> Result<()> {
    output::print_header("Composition Mesh");

    let config = SweepConfig::load(&args.config)?;
    let meshes = config.mesh_set()?;
    let symbols = config.element_symbols();

    output::print_field("Elements", &symbols.join(", "));
    output::print_field("Precision", &config.precision.to_string());
    for (level, mesh) in meshes.meshes() {
        let key = match level {
            Some(level) => format!("Level {:.*}", mesh.precision(), level),
            None => "Mesh".to_string(),
        };
        let bounds = mesh
            .varying_bounds()
            .iter()
            .map(|(el, lo, hi)| {
                let p = mesh.precision();
                format!("{} {:.*}-{:.*}", el, p, lo, p, hi)
            })
            .collect::<Vec<_>>()
            .join(", ");
        output::print_field(&key, &format!("{} points [{}]", mesh.len(), bounds));
    }
    output::print_field("Total", &meshes.len().to_string());
    println!();

    if args.show > 0 && !meshes.is_empty() {
        println!("{}", preview_table(&meshes, &symbols, args.show));
        if meshes.len() > args.show {
            output::print_info(&format!("... {} more points", meshes.len() - args.show));
        }
    }

    if let Some(csv_path) = &args.csv {
        write_points_csv(&meshes, &symbols, csv_path)?;
        output::print_success(&format!(
            "Wrote {} points to '{}'",
            meshes.len(),
            csv_path.display()
        ));
    }

    Ok(())
}

/// 前 `limit` 个成分点的表格
fn preview_table(meshes: &MeshSet, symbols: &[String], limit: usize) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["#".to_string(), "Name".to_string()];
    header.extend(symbols.iter().cloned());
    builder.push_record(header);

    for (i, point) in meshes.points().take(limit).enumerate() {
        let mut row = vec![(i + 1).to_string(), point.canonical_name()];
        row.extend(symbols.iter().map(|s| match point.fraction(s) {
            Some(x) => format!("{:.*}", point.precision(), x),
            None => String::new(),
        }));
        builder.push_record(row);
    }

    builder.build().to_string()
}

/// 导出全部成分点：名称 + 各元素摩尔分数
pub fn write_points_csv(meshes: &MeshSet, symbols: &[String], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| PhaseSweepError::FileWriteError {
        path: path.display().to_string(),
        source: e.into(),
    })?;

    let mut header = vec!["name".to_string()];
    header.extend(symbols.iter().cloned());
    wtr.write_record(&header)?;

    for point in meshes.points() {
        let mut row = vec![point.canonical_name()];
        row.extend(
            symbols
                .iter()
                .map(|s| point.fraction(s).map(|x| x.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(|e| PhaseSweepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{ElementSpec, MeshSpec};
    use std::fs;

    fn meshes() -> MeshSet {
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying_range("Al", 0.0, 0.10).with_steps(3),
                ElementSpec::fixed("Cr", 0.30),
                ElementSpec::balance("Ni"),
            ],
            3,
        );
        MeshSet::single(&spec).unwrap()
    }

    fn symbols() -> Vec<String> {
        vec!["Al".into(), "Cr".into(), "Ni".into()]
    }

    #[test]
    fn test_points_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        write_points_csv(&meshes(), &symbols(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "name,Al,Cr,Ni");
        assert!(lines[1].starts_with("Al0.00-Cr0.30-Ni0.70,0,0.3,"));
    }

    #[test]
    fn test_preview_table_is_limited() {
        let table = preview_table(&meshes(), &symbols(), 2);
        assert!(table.contains("Al0.00-Cr0.30-Ni0.70"));
        assert!(table.contains("Al0.05-Cr0.30-Ni0.65"));
        assert!(!table.contains("Al0.10-Cr0.30-Ni0.60"));
    }
}
