//! # 成分网格参数
//!
//! 描述每个元素在扫描中的角色：固定、变化或余量（平衡元素）。
//!
//! ## 依赖关系
//! - 被 `config.rs` 反序列化
//! - 被 `mesh/generator.rs` 校验并展开

use crate::models::DEFAULT_PRECISION;

use serde::{Deserialize, Serialize};

/// 元素在扫描中的角色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ElementRole {
    /// 固定分数
    Fixed { value: f64 },
    /// 在 [min, max] 上等间距取值；max 缺省时由剩余预算决定
    Varying {
        #[serde(default)]
        min: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        steps: Option<usize>,
    },
    /// 余量元素：1 - 其余元素之和
    Balance,
}

/// 单个元素的扫描设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub symbol: String,
    #[serde(flatten)]
    pub role: ElementRole,
}

impl ElementSpec {
    pub fn fixed(symbol: impl Into<String>, value: f64) -> Self {
        ElementSpec {
            symbol: symbol.into(),
            role: ElementRole::Fixed { value },
        }
    }

    /// 从 0 变化到由预算决定的上限
    pub fn varying(symbol: impl Into<String>) -> Self {
        ElementSpec {
            symbol: symbol.into(),
            role: ElementRole::Varying {
                min: 0.0,
                max: None,
                steps: None,
            },
        }
    }

    #[cfg(test)]
    pub fn varying_range(symbol: impl Into<String>, min: f64, max: f64) -> Self {
        ElementSpec {
            symbol: symbol.into(),
            role: ElementRole::Varying {
                min,
                max: Some(max),
                steps: None,
            },
        }
    }

    pub fn balance(symbol: impl Into<String>) -> Self {
        ElementSpec {
            symbol: symbol.into(),
            role: ElementRole::Balance,
        }
    }

    /// 覆盖该变化元素的步数（对非变化元素无效）
    pub fn with_steps(mut self, n: usize) -> Self {
        if let ElementRole::Varying { steps, .. } = &mut self.role {
            *steps = Some(n);
        }
        self
    }

    pub fn is_varying(&self) -> bool {
        matches!(self.role, ElementRole::Varying { .. })
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.role, ElementRole::Fixed { .. })
    }

    pub fn is_balance(&self) -> bool {
        matches!(self.role, ElementRole::Balance)
    }
}

/// 一次网格生成的完整输入
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSpec {
    /// 元素列表（声明顺序即规范名称顺序）
    pub elements: Vec<ElementSpec>,
    /// 变化元素的默认步数
    pub steps: usize,
    /// 丢弃每个变化元素的首尾网格点
    pub exclude_endpoints: bool,
    /// 规范名称小数位数
    pub precision: usize,
}

impl MeshSpec {
    pub fn new(elements: Vec<ElementSpec>, steps: usize) -> Self {
        MeshSpec {
            elements,
            steps,
            exclude_endpoints: false,
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn exclude_endpoints(mut self, exclude: bool) -> Self {
        self.exclude_endpoints = exclude;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// 把所有固定元素设为同一水平，返回新的参数
    pub fn at_fixed_level(&self, level: f64) -> Self {
        let mut spec = self.clone();
        for element in &mut spec.elements {
            if let ElementRole::Fixed { value } = &mut element.role {
                *value = level;
            }
        }
        spec
    }
}
