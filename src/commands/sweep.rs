//! # sweep 命令实现
//!
//! 按配置生成成分网格，逐点调用外部引擎并保存结果。
//!
//! ## 功能
//! - 先校验全部配置，非法参数在任何文件写入和引擎调用之前报错
//! - 引擎会话在开始时获取一次，扫描结束（包括出错）时释放
//! - 单点失败记录到 `failures.csv`，扫描继续
//! - 存在失败点时以非零状态退出
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `config.rs`, `batch/runner.rs`, `engine/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::batch::{BatchResult, SweepRunner};
use crate::cli::sweep::SweepArgs;
use crate::config::SweepConfig;
use crate::engine::Engine;
use crate::error::{PhaseSweepError, Result};
use crate::mesh::MeshSet;
use crate::utils::{output, progress};

use std::fs;
use tracing::info;

/// 失败列表文件名
pub const FAILURES_FILE: &str = "failures.csv";

/// 执行 sweep 命令
pub fn execute(args: SweepArgs) -> Result<()> {
    output::print_header("Composition Sweep");

    let config = SweepConfig::load(&args.config)?;
    let engine = config.engine.process_engine();

    let result = run(&config, &engine, true)?;
    report(&config, &result)
}

/// 用给定引擎执行完整扫描
pub fn run<E: Engine>(
    config: &SweepConfig,
    engine: &E,
    show_progress: bool,
) -> Result<BatchResult> {
    // 校验（无 I/O）
    let meshes = config.mesh_set()?;
    let settings = config.calculation_settings();
    print_plan(config, &meshes);

    fs::create_dir_all(&config.output_dir).map_err(|e| PhaseSweepError::FileWriteError {
        path: config.output_dir.display().to_string(),
        source: e,
    })?;

    let spinner = if show_progress {
        progress::create_spinner("Opening engine session...")
    } else {
        indicatif::ProgressBar::hidden()
    };
    let session = engine.open(&config.database, &config.element_symbols());
    spinner.finish_and_clear();
    let mut session = session?;
    info!(database = %config.database, points = meshes.len(), "engine session opened");

    let runner = SweepRunner::new(&settings, &config.output_dir)
        .with_retry(config.retry.clone())
        .skip_existing(config.skip_existing)
        .show_progress(show_progress);
    let result = runner.run(meshes.points(), meshes.len(), &mut session);

    // 释放会话
    drop(session);
    info!("engine session closed");

    let failures_path = config.output_dir.join(FAILURES_FILE);
    if result.has_failures() {
        result.write_failures(&failures_path)?;
    } else if failures_path.is_file() {
        // 上一次运行遗留的失败列表
        fs::remove_file(&failures_path).map_err(|e| PhaseSweepError::FileWriteError {
            path: failures_path.display().to_string(),
            source: e,
        })?;
    }

    Ok(result)
}

/// 打印扫描计划
fn print_plan(config: &SweepConfig, meshes: &MeshSet) {
    output::print_info(&format!(
        "System {} in database {}",
        config.element_symbols().join("-"),
        config.database
    ));
    output::print_info(&format!(
        "Temperature {} - {} K ({} steps)",
        config.temperature.min, config.temperature.max, config.temperature.steps
    ));

    for (level, mesh) in meshes.meshes() {
        let bounds = mesh
            .varying_bounds()
            .iter()
            .map(|(el, lo, hi)| {
                let p = mesh.precision();
                format!("{} {:.*}-{:.*}", el, p, lo, p, hi)
            })
            .collect::<Vec<_>>()
            .join(", ");
        match level {
            Some(level) => output::print_info(&format!(
                "Fixed level {}: {} points [{}]",
                level,
                mesh.len(),
                bounds
            )),
            None => output::print_info(&format!("{} points [{}]", mesh.len(), bounds)),
        }
    }

    output::print_info(&format!(
        "Writing {} results to '{}'",
        meshes.len(),
        config.output_dir.display()
    ));
}

/// 打印统计；有失败点时返回错误
fn report(config: &SweepConfig, result: &BatchResult) -> Result<()> {
    output::print_separator();

    if result.skipped > 0 {
        output::print_skip(&format!("{} points already had results", result.skipped));
    }

    if result.has_failures() {
        output::print_warning(&format!(
            "Sweep complete: {} success, {} skipped, {} failed",
            result.success, result.skipped, result.failed
        ));
        output::print_failures(&result.failures, 10);
        output::print_info(&format!(
            "Failure list written to '{}'",
            config.output_dir.join(FAILURES_FILE).display()
        ));
        return Err(PhaseSweepError::SweepFailed {
            failed: result.failed,
            total: result.total(),
        });
    }

    output::print_done(&format!(
        "Sweep complete: {} success, {} skipped",
        result.success, result.skipped
    ));
    Ok(())
}
