//! # 并行文件处理
//!
//! 并行读取已保存的结果文件。只用于只读的结果整理，不涉及引擎调用。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示
//! - 保持输入顺序，失败单独汇总
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条

use crate::error::{PhaseSweepError, Result};
use crate::utils::progress;

use rayon::prelude::*;
use std::path::PathBuf;

/// 并行处理的结果：成功项与失败项
pub struct ParallelOutcome<T> {
    /// (文件, 结果)，与输入顺序一致
    pub loaded: Vec<(PathBuf, T)>,
    /// (文件, 错误信息)
    pub failures: Vec<(String, String)>,
}

/// 并行文件处理器
pub struct ParallelLoader {
    /// 并行作业数
    jobs: usize,
}

impl ParallelLoader {
    /// jobs 为 0 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理文件列表
    pub fn run<T, F>(&self, files: Vec<PathBuf>, loader: F) -> Result<ParallelOutcome<T>>
    where
        T: Send,
        F: Fn(&PathBuf) -> Result<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Loading");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| PhaseSweepError::Other(format!("cannot build thread pool: {}", e)))?;

        let results: Vec<(PathBuf, Result<T>)> = pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    let result = loader(&file);
                    pb.inc(1);
                    (file, result)
                })
                .collect()
        });

        pb.finish_and_clear();

        let mut outcome = ParallelOutcome {
            loaded: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (file, result) in results {
            match result {
                Ok(value) => outcome.loaded.push((file, value)),
                Err(e) => outcome
                    .failures
                    .push((file.display().to_string(), e.to_string())),
            }
        }

        Ok(outcome)
    }
}
