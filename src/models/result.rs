//! # 相图结果数据模型
//!
//! 外部热力学引擎返回的相图数据，按稳定相组合分组。
//! 对本工具而言是不透明对象，只通过访问器读取，不校验任何物理约束。
//!
//! ## 依赖关系
//! - 由 `engine/` 在适配器边界创建
//! - 被 `store/`, `render/`, `commands/` 使用

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 某一稳定相组合下的坐标序列
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseGroup {
    /// x 轴取值（通常为某组元的摩尔分数）
    pub x: Vec<f64>,
    /// y 轴取值（通常为温度 K）
    pub y: Vec<f64>,
}

impl PhaseGroup {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        PhaseGroup { x, y }
    }

    /// 点数（x/y 长度不一致时取较短者）
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按 (x, y) 成对迭代
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// x 序列的 (最小值, 最大值)，忽略非有限值
    pub fn x_range(&self) -> Option<(f64, f64)> {
        min_max(&self.x)
    }

    /// y 序列的 (最小值, 最大值)，忽略非有限值
    pub fn y_range(&self) -> Option<(f64, f64)> {
        min_max(&self.y)
    }
}

/// 相图计算结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseDiagramResult {
    x_quantity: String,
    y_quantity: String,
    groups: BTreeMap<String, PhaseGroup>,
}

impl PhaseDiagramResult {
    pub fn new(x_quantity: impl Into<String>, y_quantity: impl Into<String>) -> Self {
        PhaseDiagramResult {
            x_quantity: x_quantity.into(),
            y_quantity: y_quantity.into(),
            groups: BTreeMap::new(),
        }
    }

    /// 添加一个稳定相组合的数据
    pub fn with_group(mut self, phases: impl Into<String>, group: PhaseGroup) -> Self {
        self.groups.insert(phases.into(), group);
        self
    }

    pub fn x_quantity(&self) -> &str {
        &self.x_quantity
    }

    pub fn y_quantity(&self) -> &str {
        &self.y_quantity
    }

    /// 稳定相组合标签（有序）
    pub fn phases(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|k| k.as_str())
    }

    #[cfg(test)]
    pub fn group(&self, phases: &str) -> Option<&PhaseGroup> {
        self.groups.get(phases)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &PhaseGroup)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// 所有分组的总点数
    pub fn point_count(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    /// 所有分组合并后的 x 范围
    pub fn x_range(&self) -> Option<(f64, f64)> {
        merge_ranges(self.groups.values().filter_map(|g| g.x_range()))
    }

    /// 所有分组合并后的 y 范围
    pub fn y_range(&self) -> Option<(f64, f64)> {
        merge_ranges(self.groups.values().filter_map(|g| g.y_range()))
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn merge_ranges(ranges: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    ranges.fold(None, |acc, (lo, hi)| match acc {
        None => Some((lo, hi)),
        Some((a, b)) => Some((a.min(lo), b.max(hi))),
    })
}
