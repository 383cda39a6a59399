//! # collect 命令实现
//!
//! 读取结果目录中的全部结果文件，汇总为一张 CSV 表。
//!
//! ## 功能
//! - 按模式收集结果文件（可递归）
//! - 并行读取，损坏文件单独列出
//! - 校验文件名与记录中的成分是否一致
//! - 汇总 CSV：成分、各元素分数、数据库、相组合数、点数、相组合列表
//! - 按相组合数排序打印前 N 个成分
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `batch/collector.rs`, `batch/parallel.rs`, `store/`
//! - 使用 `tabled` 打印表格，`csv` 导出

use crate::batch::{FileCollector, ParallelLoader};
use crate::cli::collect::CollectArgs;
use crate::error::{PhaseSweepError, Result};
use crate::models::CompositionPoint;
use crate::store::{self, StoredRecord};
use crate::utils::output;

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use tracing::warn;

/// 排名表行
#[derive(Debug, Clone, Tabled)]
struct RankRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Composition")]
    composition: String,
    #[tabled(rename = "Groups")]
    groups: usize,
    #[tabled(rename = "Points")]
    points: usize,
}

/// 文件名检查结果
#[derive(Debug, Clone, PartialEq)]
pub enum NameCheck {
    Matches,
    /// 文件名是规范名称，但与记录中的成分不同
    Differs(String),
    /// 文件名不是规范名称
    NotCanonical,
}

/// 执行 collect 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting Sweep Results");

    let files = FileCollector::new(args.results_dir.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        return Err(PhaseSweepError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }

    let loader = ParallelLoader::new(args.jobs);
    output::print_info(&format!(
        "Loading {} result files with {} jobs...",
        files.len(),
        loader.jobs()
    ));

    let outcome = loader.run(files, |path| store::load_record(path))?;

    for (path, record) in &outcome.loaded {
        match check_name(path, record) {
            NameCheck::Matches => {}
            NameCheck::Differs(name) => {
                warn!(file = %path.display(), stored = %name, "file name does not match stored composition");
                output::print_warning(&format!(
                    "{}: stored composition is {}",
                    path.display(),
                    name
                ));
            }
            NameCheck::NotCanonical => {
                warn!(file = %path.display(), "file name is not a canonical composition name");
            }
        }
    }

    write_summary(&outcome.loaded, &args.output)?;
    output::print_success(&format!(
        "Wrote {} compositions to '{}'",
        outcome.loaded.len(),
        args.output.display()
    ));

    if args.top_n > 0 && !outcome.loaded.is_empty() {
        println!();
        println!("{}", Table::new(rank_rows(&outcome.loaded, args.top_n)));
    }

    output::print_separator();
    output::print_done(&format!(
        "Collected: {} loaded, {} failed",
        outcome.loaded.len(),
        outcome.failures.len()
    ));
    output::print_failures(&outcome.failures, 10);

    Ok(())
}

/// 比较文件名与记录中的规范名称
pub fn check_name(path: &Path, record: &StoredRecord) -> NameCheck {
    let stem = match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => stem,
        None => return NameCheck::NotCanonical,
    };

    let stored = record.composition.canonical_name();
    if stem == stored {
        return NameCheck::Matches;
    }

    match CompositionPoint::parse_canonical_name(stem) {
        Some(_) => NameCheck::Differs(stored),
        None => NameCheck::NotCanonical,
    }
}

/// 所有记录中出现过的元素（首次出现顺序）
fn element_columns(records: &[(PathBuf, StoredRecord)]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for (_, record) in records {
        for element in record.composition.elements() {
            if !columns.iter().any(|c| c == element) {
                columns.push(element.to_string());
            }
        }
    }
    columns
}

/// 写出汇总 CSV
pub fn write_summary(records: &[(PathBuf, StoredRecord)], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| PhaseSweepError::FileWriteError {
        path: path.display().to_string(),
        source: e.into(),
    })?;

    let elements = element_columns(records);

    let mut header = vec!["file".to_string(), "composition".to_string()];
    header.extend(elements.iter().cloned());
    header.extend(
        ["database", "phase_groups", "points", "phases"]
            .iter()
            .map(|s| s.to_string()),
    );
    wtr.write_record(&header)?;

    for (file, record) in records {
        let result = &record.result;
        let mut row = vec![
            file.display().to_string(),
            record.composition.canonical_name(),
        ];
        row.extend(elements.iter().map(|el| {
            record
                .composition
                .fraction(el)
                .map(|x| format!("{:.*}", record.composition.precision(), x))
                .unwrap_or_default()
        }));
        row.push(record.database.clone());
        row.push(result.group_count().to_string());
        row.push(result.point_count().to_string());
        row.push(result.phases().collect::<Vec<_>>().join(";"));
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(|e| PhaseSweepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 按相组合数（其次点数）降序排列的前 `limit` 个成分
fn rank_rows(records: &[(PathBuf, StoredRecord)], limit: usize) -> Vec<RankRow> {
    let mut ranked: Vec<&StoredRecord> = records.iter().map(|(_, r)| r).collect();
    ranked.sort_by(|a, b| {
        b.result
            .group_count()
            .cmp(&a.result.group_count())
            .then(b.result.point_count().cmp(&a.result.point_count()))
    });

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, record)| RankRow {
            rank: i + 1,
            composition: record.composition.canonical_name(),
            groups: record.result.group_count(),
            points: record.result.point_count(),
        })
        .collect()
}
