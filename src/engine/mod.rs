//! # 外部热力学引擎适配层
//!
//! 本工具不实现任何平衡计算，只定义调用外部（商业授权）引擎的契约：
//! 输入元素分数、温度范围和步数、数据库名，输出不透明的相图结果。
//!
//! ## 功能
//! - `Engine` / `EngineSession` trait：会话在扫描开始时获取一次，
//!   以 `&mut` 传入驱动器，Drop 时释放
//! - `CalculationRequest`：单个成分点的计算请求
//! - `EngineError`：引擎边界的错误类型
//! - `process`：通过子进程桥接程序（行分隔 JSON）调用引擎
//! - `retry`：可配置的失败重试策略
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 和 `commands/sweep.rs` 使用
//! - 使用 `models/` 数据模型

pub mod process;
pub mod retry;

pub use process::ProcessEngine;
pub use retry::RetryPolicy;

use crate::models::{CompositionPoint, PhaseDiagramResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// 组成轴的最大步长分子（步长 = 该值 / 轴上限）
const AXIS_STEP_NUMERATOR: f64 = 0.025;

/// 引擎错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid composition: {0}")]
    InvalidComposition(String),

    #[error("License or session error: {0}")]
    Session(String),

    #[error("Calculation did not converge: {0}")]
    Convergence(String),

    #[error("Calculation timed out: {0}")]
    Timeout(String),

    #[error("Engine protocol error: {0}")]
    Protocol(String),

    #[error("Engine command '{command}' could not be started: {reason}")]
    Spawn { command: String, reason: String },
}

impl EngineError {
    /// 是否值得重试（收敛失败与超时）
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Convergence(_) | EngineError::Timeout(_))
    }
}

/// 温度轴
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureAxis {
    /// 下限 (K)
    pub min: f64,
    /// 上限 (K)
    pub max: f64,
    /// 最少步数
    pub steps: usize,
}

/// 组成轴：相图的横轴元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionAxis {
    pub element: String,
    pub max: f64,
    pub max_step_size: f64,
}

/// 每次扫描不变的计算设置
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationSettings {
    pub database: String,
    pub temperature: TemperatureAxis,
    pub global_minimization: bool,
    pub timeout_minutes: u64,
    /// 组成轴元素
    pub axis_element: Option<String>,
    /// 组成轴上限的参照元素（第一个变化元素）：上限 = 1 - 其余全部元素之和
    pub budget_element: Option<String>,
}

/// 单个成分点的计算请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRequest {
    /// 成分点规范名称
    pub name: String,
    pub database: String,
    pub fractions: BTreeMap<String, f64>,
    pub temperature: TemperatureAxis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition_axis: Option<CompositionAxis>,
    pub global_minimization: bool,
    pub timeout_minutes: u64,
}

impl CalculationRequest {
    pub fn for_point(point: &CompositionPoint, settings: &CalculationSettings) -> Self {
        let composition_axis = settings
            .axis_element
            .as_deref()
            .and_then(|element| {
                let budget = settings.budget_element.as_deref().unwrap_or(element);
                composition_axis(point, element, budget)
            });

        CalculationRequest {
            name: point.canonical_name(),
            database: settings.database.clone(),
            fractions: point.iter().map(|(el, x)| (el.to_string(), x)).collect(),
            temperature: settings.temperature.clone(),
            composition_axis,
            global_minimization: settings.global_minimization,
            timeout_minutes: settings.timeout_minutes,
        }
    }
}

/// 组成轴上限 = 1 - 参照元素以外全部元素之和，保留三位小数
fn composition_axis(
    point: &CompositionPoint,
    element: &str,
    budget: &str,
) -> Option<CompositionAxis> {
    point.fraction(element)?;

    let others: f64 = point
        .iter()
        .filter(|(el, _)| *el != budget)
        .map(|(_, x)| x)
        .sum();
    let max = ((1.0 - others) * 1000.0).round() / 1000.0;

    if max <= 0.0 {
        return None;
    }

    Some(CompositionAxis {
        element: element.to_string(),
        max,
        max_step_size: AXIS_STEP_NUMERATOR / max,
    })
}

/// 已打开的引擎会话（有状态，不可并发共享）
pub trait EngineSession {
    /// 对单个成分点执行相图计算
    fn calculate(&mut self, request: &CalculationRequest) -> Result<PhaseDiagramResult, EngineError>;
}

/// 引擎：负责获取会话
pub trait Engine {
    type Session: EngineSession;

    /// 选择数据库和元素，打开会话
    fn open(&self, database: &str, elements: &[String]) -> Result<Self::Session, EngineError>;
}
