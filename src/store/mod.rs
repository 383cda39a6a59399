//! # 结果存储模块
//!
//! 将每个成分点的相图结果写入以规范名称命名的文件，并提供读取接口。
//!
//! ## 功能
//! - `save`: 写入 `<output_dir>/<规范名称>.cbor`，已存在时静默覆盖
//! - `load`: 读取并返回相图结果
//! - `load_record`: 读取完整记录（成分、数据库、结果）
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 和 `commands/` 使用
//! - 子模块: codec

pub mod codec;

use crate::error::{PhaseSweepError, Result};
use crate::models::{CompositionPoint, PhaseDiagramResult};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 结果文件扩展名
pub const RESULT_EXTENSION: &str = "cbor";

/// 当前记录格式版本
pub const FORMAT_VERSION: u32 = 1;

/// 写入磁盘的完整记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub format_version: u32,
    pub composition: CompositionPoint,
    pub database: String,
    pub result: PhaseDiagramResult,
}

/// 成分点对应的结果文件路径
pub fn result_path(point: &CompositionPoint, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.{}", point.canonical_name(), RESULT_EXTENSION))
}

/// 保存结果，返回写入的路径
pub fn save(
    point: &CompositionPoint,
    database: &str,
    result: &PhaseDiagramResult,
    output_dir: &Path,
) -> Result<PathBuf> {
    #[derive(Serialize)]
    struct RecordRef<'a> {
        format_version: u32,
        composition: &'a CompositionPoint,
        database: &'a str,
        result: &'a PhaseDiagramResult,
    }

    let path = result_path(point, output_dir);
    let record = RecordRef {
        format_version: FORMAT_VERSION,
        composition: point,
        database,
        result,
    };
    codec::write_cbor(&record, &path, &point.canonical_name())?;
    Ok(path)
}

/// 读取完整记录
pub fn load_record(path: &Path) -> Result<StoredRecord> {
    let record: StoredRecord = codec::read_cbor(path)?;
    if record.format_version > FORMAT_VERSION {
        return Err(PhaseSweepError::Deserialization {
            path: path.display().to_string(),
            reason: format!(
                "record format version {} is newer than supported version {}",
                record.format_version, FORMAT_VERSION
            ),
        });
    }
    Ok(record)
}

/// 读取相图结果
pub fn load(path: &Path) -> Result<PhaseDiagramResult> {
    load_record(path).map(|record| record.result)
}
