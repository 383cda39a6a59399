//! # CBOR 编解码
//!
//! 结果文件使用 CBOR（自描述二进制格式），写入时带 self-describe 标签 (55799)。
//!
//! ## 依赖关系
//! - 被 `store/mod.rs` 调用
//! - 使用 `serde_cbor`

use crate::error::{PhaseSweepError, Result};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// 将 `value` 写入 `path`；已存在的文件会被覆盖
///
/// 先写入同目录下的 `.partial` 临时文件，完整落盘后再改名，
/// 失败时删除临时文件，`path` 上不会留下截断的结果。
pub fn write_cbor<T: Serialize>(value: &T, path: &Path, name: &str) -> Result<()> {
    let partial = partial_path(path);

    let written = write_to(value, &partial, name).and_then(|_| {
        fs::rename(&partial, path).map_err(|e| PhaseSweepError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    });

    if written.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            warn!(path = %partial.display(), "cannot remove partial file: {}", e);
        }
    }
    written
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

fn write_to<T: Serialize>(value: &T, path: &Path, name: &str) -> Result<()> {
    let file = File::create(path).map_err(|e| PhaseSweepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    {
        let mut ser = serde_cbor::Serializer::new(serde_cbor::ser::IoWrite::new(&mut writer));
        ser.self_describe()
            .and_then(|_| value.serialize(&mut ser))
            .map_err(|e| PhaseSweepError::Serialization {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
    }

    writer.flush().map_err(|e| PhaseSweepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 从 `path` 读取 CBOR 对象
pub fn read_cbor<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(PhaseSweepError::NotFound {
            path: path.display().to_string(),
        });
    }

    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PhaseSweepError::NotFound {
            path: path.display().to_string(),
        },
        _ => PhaseSweepError::FileReadError {
            path: path.display().to_string(),
            source: e,
        },
    })?;

    serde_cbor::from_reader(BufReader::new(file)).map_err(|e| PhaseSweepError::Deserialization {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, SerializeSeq, Serializer};

    /// 序列化到一半时失败
    struct FailsMidway;

    impl Serialize for FailsMidway {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(3))?;
            seq.serialize_element("first")?;
            Err(S::Error::custom("out of space"))
        }
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Al0.10-Ni0.90.cbor");

        let err = write_cbor(&FailsMidway, &path, "Al0.10-Ni0.90").unwrap_err();

        assert!(matches!(err, PhaseSweepError::Serialization { .. }));
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Al0.10-Ni0.90.cbor");
        write_cbor(&vec![1u32, 2, 3], &path, "Al0.10-Ni0.90").unwrap();

        assert!(write_cbor(&FailsMidway, &path, "Al0.10-Ni0.90").is_err());

        let kept: Vec<u32> = read_cbor(&path).unwrap();
        assert_eq!(kept, vec![1, 2, 3]);
        assert!(!partial_path(&path).exists());
    }
}
