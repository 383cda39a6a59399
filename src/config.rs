//! # 扫描配置
//!
//! 静态配置结构：元素设置、固定水平、温度范围、步数、数据库名、输出目录等。
//! 从 TOML 文件读取。`SweepConfig::example()` 给出 Al-Cr-Co-Fe-Ni 高熵合金扫描的完整示例。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `mesh/`, `engine/` 的参数类型
//! - 使用 `serde` + `toml`

use crate::engine::{CalculationSettings, ProcessEngine, RetryPolicy, TemperatureAxis};
use crate::error::{PhaseSweepError, Result};
use crate::mesh::{ElementSpec, MeshSet, MeshSpec};
use crate::models::DEFAULT_PRECISION;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 网格设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshConfig {
    /// 变化元素的默认步数
    pub steps: usize,
    /// 丢弃首尾网格点
    pub exclude_endpoints: bool,
    /// 固定元素依次取的水平；为空时使用各元素自身的固定值
    pub fixed_levels: Vec<f64>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        MeshConfig {
            steps: 15,
            exclude_endpoints: false,
            fixed_levels: vec![],
        }
    }
}

/// 引擎桥接设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// 桥接程序
    pub command: String,
    pub args: Vec<String>,
    /// 组成轴元素；缺省为第一个变化元素
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_element: Option<String>,
    pub global_minimization: bool,
    pub timeout_minutes: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            command: "phasesweep-bridge".to_string(),
            args: vec![],
            axis_element: None,
            global_minimization: true,
            timeout_minutes: 15,
        }
    }
}

impl EngineConfig {
    pub fn process_engine(&self) -> ProcessEngine {
        ProcessEngine::new(self.command.clone(), self.args.clone())
    }
}

/// 扫描配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// 热力学数据库名
    pub database: String,
    /// 结果输出目录
    pub output_dir: PathBuf,
    /// 规范名称小数位数
    pub precision: usize,
    /// 已有结果文件时跳过
    pub skip_existing: bool,
    pub elements: Vec<ElementSpec>,
    pub mesh: MeshConfig,
    pub temperature: TemperatureAxis,
    pub engine: EngineConfig,
    pub retry: RetryPolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            database: "TCHEA6".to_string(),
            output_dir: PathBuf::from("results"),
            precision: DEFAULT_PRECISION,
            skip_existing: false,
            elements: vec![],
            mesh: MeshConfig::default(),
            temperature: TemperatureAxis {
                min: 500.0,
                max: 1200.0,
                steps: 60,
            },
            engine: EngineConfig::default(),
            retry: RetryPolicy::None,
        }
    }
}

impl SweepConfig {
    /// Al-Cr-Co-Fe-Ni 示例：Al 变化、Cr 余量，Co/Fe/Ni 依次取 0.075 - 0.3
    pub fn example() -> Self {
        SweepConfig {
            precision: 3,
            elements: vec![
                ElementSpec::varying("Al"),
                ElementSpec::balance("Cr"),
                ElementSpec::fixed("Co", 0.1),
                ElementSpec::fixed("Fe", 0.1),
                ElementSpec::fixed("Ni", 0.1),
            ],
            mesh: MeshConfig {
                steps: 15,
                exclude_endpoints: true,
                fixed_levels: vec![0.075, 0.1, 0.125, 0.15, 0.175, 0.2, 0.225, 0.25, 0.275, 0.3],
            },
            engine: EngineConfig {
                axis_element: Some("Cr".to_string()),
                ..EngineConfig::default()
            },
            ..SweepConfig::default()
        }
    }

    /// 从 TOML 文件读取
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PhaseSweepError::NotFound {
                path: path.display().to_string(),
            },
            _ => PhaseSweepError::FileReadError {
                path: path.display().to_string(),
                source: e,
            },
        })?;
        Self::from_toml(&text).map_err(|e| match e {
            PhaseSweepError::ConfigParse { reason, .. } => PhaseSweepError::ConfigParse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PhaseSweepError::ConfigParse {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PhaseSweepError::Other(format!("cannot render configuration: {}", e)))
    }

    /// 网格参数
    pub fn mesh_spec(&self) -> MeshSpec {
        MeshSpec::new(self.elements.clone(), self.mesh.steps)
            .exclude_endpoints(self.mesh.exclude_endpoints)
            .with_precision(self.precision)
    }

    /// 校验全部配置并展开网格；任何文件或引擎操作之前调用
    pub fn mesh_set(&self) -> Result<MeshSet> {
        self.validate_calculation()?;
        MeshSet::with_levels(&self.mesh_spec(), &self.mesh.fixed_levels)
    }

    /// 引擎计算设置
    pub fn calculation_settings(&self) -> CalculationSettings {
        let first_varying = self
            .elements
            .iter()
            .find(|e| e.is_varying())
            .map(|e| e.symbol.clone());
        let axis_element = self
            .engine
            .axis_element
            .clone()
            .or_else(|| first_varying.clone());

        CalculationSettings {
            database: self.database.clone(),
            temperature: self.temperature.clone(),
            global_minimization: self.engine.global_minimization,
            timeout_minutes: self.engine.timeout_minutes,
            axis_element,
            budget_element: first_varying,
        }
    }

    /// 元素符号列表（声明顺序）
    pub fn element_symbols(&self) -> Vec<String> {
        self.elements.iter().map(|e| e.symbol.clone()).collect()
    }

    fn validate_calculation(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(PhaseSweepError::config("database name is empty"));
        }

        let t = &self.temperature;
        if !t.min.is_finite() || !t.max.is_finite() || t.min <= 0.0 || t.min >= t.max {
            return Err(PhaseSweepError::config(format!(
                "temperature range must satisfy 0 < min < max, got {} - {}",
                t.min, t.max
            )));
        }
        if t.steps == 0 {
            return Err(PhaseSweepError::config("temperature steps must be positive"));
        }

        if let Some(axis) = &self.engine.axis_element {
            if !self.elements.iter().any(|e| &e.symbol == axis) {
                return Err(PhaseSweepError::config(format!(
                    "axis element {} is not in the element list",
                    axis
                )));
            }
        }

        if self.engine.command.trim().is_empty() {
            return Err(PhaseSweepError::config("engine command is empty"));
        }

        Ok(())
    }
}
