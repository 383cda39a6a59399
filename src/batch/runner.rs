//! # 扫描驱动器
//!
//! 顺序遍历成分点，逐点调用引擎并保存结果。
//!
//! ## 功能
//! - 单线程顺序执行：引擎会话有状态，同一时刻只有一个调用
//! - 单点失败不终止扫描，记录（成分点, 错误）后继续
//! - 可选跳过已有结果文件
//! - 进度条显示与错误汇总
//!
//! ## 依赖关系
//! - 被 `commands/sweep.rs` 调用
//! - 使用 `engine/` 的 EngineSession 和 RetryPolicy
//! - 使用 `store/` 保存结果
//! - 使用 `utils/progress.rs` 创建进度条

use crate::engine::{CalculationRequest, CalculationSettings, EngineSession, RetryPolicy};
use crate::error::{PhaseSweepError, Result};
use crate::models::CompositionPoint;
use crate::store;
use crate::utils::{output, progress};

use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// 单个成分点处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    /// 计算并保存成功
    Success(String),
    /// 跳过（结果文件已存在）
    Skipped(String),
    /// 处理失败
    Failed(String, String), // (成分点规范名称, 错误信息)
}

/// 扫描结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Skipped(_) => self.skipped += 1,
            ProcessResult::Failed(name, err) => {
                self.failed += 1;
                self.failures.push((name, err));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// 将失败列表写入 CSV
    pub fn write_failures(&self, path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct FailureRow<'a> {
            composition: &'a str,
            error: &'a str,
        }

        let mut wtr = csv::Writer::from_path(path)?;
        for (name, err) in &self.failures {
            wtr.serialize(FailureRow {
                composition: name,
                error: err,
            })?;
        }
        wtr.flush().map_err(|e| PhaseSweepError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }
}

/// 扫描驱动器
pub struct SweepRunner<'a> {
    settings: &'a CalculationSettings,
    output_dir: PathBuf,
    retry: RetryPolicy,
    skip_existing: bool,
    show_progress: bool,
}

impl<'a> SweepRunner<'a> {
    pub fn new(settings: &'a CalculationSettings, output_dir: impl Into<PathBuf>) -> Self {
        SweepRunner {
            settings,
            output_dir: output_dir.into(),
            retry: RetryPolicy::None,
            skip_existing: false,
            show_progress: true,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 已有结果文件时跳过该点
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 逐点执行扫描
    pub fn run<S, I>(&self, points: I, total: usize, session: &mut S) -> BatchResult
    where
        S: EngineSession + ?Sized,
        I: IntoIterator<Item = CompositionPoint>,
    {
        let pb = if self.show_progress {
            progress::create_progress_bar(total as u64, "Calculating")
        } else {
            ProgressBar::hidden()
        };

        let mut batch_result = BatchResult::default();

        for (index, point) in points.into_iter().enumerate() {
            let name = point.canonical_name();
            pb.set_message(name.clone());
            info!(index = index + 1, total, point = %name, "calculating system");

            let result = self.process_point(&point, session);

            if let ProcessResult::Failed(_, err) = &result {
                pb.suspend(|| {
                    output::print_warning(&format!(
                        "Could not calculate {}: {}. Continuing with next...",
                        name, err
                    ));
                });
            }

            batch_result.merge(result);
            pb.inc(1);
        }

        pb.finish_and_clear();
        batch_result
    }

    fn process_point<S>(&self, point: &CompositionPoint, session: &mut S) -> ProcessResult
    where
        S: EngineSession + ?Sized,
    {
        let name = point.canonical_name();

        if self.skip_existing && store::result_path(point, &self.output_dir).is_file() {
            debug!(point = %name, "result exists, skipping");
            return ProcessResult::Skipped(name);
        }

        let request = CalculationRequest::for_point(point, self.settings);
        let (outcome, attempts) = self.retry.run(&name, || session.calculate(&request));

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                error!(point = %name, attempts, "engine failed: {}", e);
                return ProcessResult::Failed(name, e.to_string());
            }
        };

        match store::save(point, &self.settings.database, &result, &self.output_dir) {
            Ok(path) => {
                info!(point = %name, path = %path.display(), "saved");
                ProcessResult::Success(name)
            }
            Err(e) => {
                error!(point = %name, "cannot save result: {}", e);
                ProcessResult::Failed(name, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, TemperatureAxis};
    use crate::mesh::{ElementSpec, Mesh, MeshSpec};
    use crate::models::{PhaseDiagramResult, PhaseGroup};
    use std::collections::HashMap;

    /// 脚本化的引擎会话：按规范名称返回预设错误
    struct ScriptedSession {
        failures: HashMap<String, Vec<EngineError>>,
        requests: Vec<CalculationRequest>,
    }

    impl ScriptedSession {
        fn new() -> Self {
            ScriptedSession {
                failures: HashMap::new(),
                requests: Vec::new(),
            }
        }

        /// 该点依次返回这些错误，之后成功
        fn fail(mut self, name: &str, errors: Vec<EngineError>) -> Self {
            self.failures.insert(name.to_string(), errors);
            self
        }
    }

    impl EngineSession for ScriptedSession {
        fn calculate(
            &mut self,
            request: &CalculationRequest,
        ) -> std::result::Result<PhaseDiagramResult, EngineError> {
            self.requests.push(request.clone());
            if let Some(queue) = self.failures.get_mut(&request.name) {
                if !queue.is_empty() {
                    return Err(queue.remove(0));
                }
            }
            let x = request.fractions.get("Al").copied().unwrap_or(0.0);
            Ok(PhaseDiagramResult::new("X(Al)", "T")
                .with_group("FCC_L12", PhaseGroup::new(vec![x], vec![request.temperature.min])))
        }
    }

    fn settings() -> CalculationSettings {
        CalculationSettings {
            database: "TCHEA6".to_string(),
            temperature: TemperatureAxis {
                min: 500.0,
                max: 1200.0,
                steps: 60,
            },
            global_minimization: true,
            timeout_minutes: 15,
            axis_element: Some("Al".to_string()),
            budget_element: None,
        }
    }

    fn mesh() -> Mesh {
        Mesh::new(&MeshSpec::new(
            vec![
                ElementSpec::varying_range("Al", 0.0, 0.10),
                ElementSpec::fixed("Cr", 0.30),
            ],
            3,
        ))
        .unwrap()
    }

    #[test]
    fn test_all_points_saved() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings();
        let mesh = mesh();
        let mut session = ScriptedSession::new();

        let runner = SweepRunner::new(&settings, dir.path()).show_progress(false);
        let result = runner.run(mesh.points(), mesh.len(), &mut session);

        assert_eq!(result.success, 3);
        assert_eq!(result.total(), 3);
        assert!(!result.has_failures());
        assert_eq!(session.requests.len(), 3);
        assert_eq!(session.requests[1].database, "TCHEA6");
        assert_eq!(session.requests[1].temperature.steps, 60);

        for point in mesh.points() {
            let stored = store::load(&store::result_path(&point, dir.path())).unwrap();
            let x = point.fraction("Al").unwrap();
            assert_eq!(stored.group("FCC_L12").unwrap().x, vec![x]);
        }
    }

    #[test]
    fn test_failed_point_does_not_stop_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings();
        let mesh = mesh();
        let mut session = ScriptedSession::new().fail(
            "Al0.05-Cr0.30",
            vec![EngineError::InvalidComposition("outside database".into())],
        );

        let runner = SweepRunner::new(&settings, dir.path()).show_progress(false);
        let result = runner.run(mesh.points(), mesh.len(), &mut session);

        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.failures[0].0, "Al0.05-Cr0.30");
        assert!(result.failures[0].1.contains("outside database"));

        assert!(dir.path().join("Al0.00-Cr0.30.cbor").is_file());
        assert!(!dir.path().join("Al0.05-Cr0.30.cbor").exists());
        assert!(dir.path().join("Al0.10-Cr0.30.cbor").is_file());
    }

    #[test]
    fn test_transient_failure_retried() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings();
        let mesh = mesh();
        let mut session = ScriptedSession::new().fail(
            "Al0.10-Cr0.30",
            vec![EngineError::Convergence("first try".into())],
        );

        let runner = SweepRunner::new(&settings, dir.path())
            .with_retry(RetryPolicy::Fixed {
                attempts: 1,
                delay_ms: 0,
            })
            .show_progress(false);
        let result = runner.run(mesh.points(), mesh.len(), &mut session);

        assert_eq!(result.success, 3);
        assert_eq!(session.requests.len(), 4);
    }

    #[test]
    fn test_skip_existing_does_not_call_engine() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings();
        let mesh = mesh();

        let first = mesh.points().next().unwrap();
        store::save(&first, "TCHEA6", &PhaseDiagramResult::default(), dir.path()).unwrap();

        let mut session = ScriptedSession::new();
        let runner = SweepRunner::new(&settings, dir.path())
            .skip_existing(true)
            .show_progress(false);
        let result = runner.run(mesh.points(), mesh.len(), &mut session);

        assert_eq!(result.skipped, 1);
        assert_eq!(result.success, 2);
        assert_eq!(session.requests.len(), 2);
    }

    #[test]
    fn test_write_failures_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut result = BatchResult::default();
        result.merge(ProcessResult::Success("Al0.00-Cr0.30".into()));
        result.merge(ProcessResult::Failed(
            "Al0.05-Cr0.30".into(),
            "Calculation did not converge: x".into(),
        ));

        let path = dir.path().join("failures.csv");
        result.write_failures(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("composition,error"));
        assert_eq!(
            lines.next(),
            Some("Al0.05-Cr0.30,Calculation did not converge: x")
        );
    }
}
