//! # 成分网格模块
//!
//! 由元素设置生成待计算的成分点集合。
//!
//! ## 功能
//! - 单个网格：固定/变化/余量元素的笛卡尔网格
//! - 多水平网格：固定元素依次取多个水平，各自生成一个网格后串联
//!
//! ## 依赖关系
//! - 被 `config.rs` 和 `commands/` 使用
//! - 子模块: spec, generator

pub mod generator;
pub mod spec;

pub use generator::Mesh;
pub use spec::{ElementSpec, MeshSpec};

use crate::error::{PhaseSweepError, Result};
use crate::models::CompositionPoint;

use std::collections::HashSet;

/// 一次扫描的全部网格（每个固定水平一个）
#[derive(Debug, Clone)]
pub struct MeshSet {
    meshes: Vec<(Option<f64>, Mesh)>,
    len: usize,
}

impl MeshSet {
    /// 无固定水平：直接使用参数中的固定值
    pub fn single(spec: &MeshSpec) -> Result<Self> {
        Self::from_meshes(vec![(None, Mesh::new(spec)?)])
    }

    /// 固定元素依次取 `levels` 中的每个值
    ///
    /// 所有网格在返回前都已校验完毕，任何一个水平非法都不会产生部分结果。
    pub fn with_levels(spec: &MeshSpec, levels: &[f64]) -> Result<Self> {
        if levels.is_empty() {
            return Self::single(spec);
        }
        if !spec.elements.iter().any(|e| e.is_fixed()) {
            return Err(PhaseSweepError::config(
                "fixed levels were given but no element has a fixed role",
            ));
        }

        // 格式化后相同的水平会产生同名文件
        let mut seen = HashSet::new();
        for level in levels {
            let label = format!("{:.*}", spec.precision, level);
            if !seen.insert(label.clone()) {
                return Err(PhaseSweepError::config(format!(
                    "fixed level {} appears more than once at {} decimals",
                    label, spec.precision
                )));
            }
        }

        let meshes = levels
            .iter()
            .map(|&level| {
                Mesh::new(&spec.at_fixed_level(level)).map_err(|e| match e {
                    PhaseSweepError::Configuration(msg) => PhaseSweepError::Configuration(
                        format!("at fixed level {}: {}", level, msg),
                    ),
                    other => other,
                })
                .map(|mesh| (Some(level), mesh))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_meshes(meshes)
    }

    fn from_meshes(meshes: Vec<(Option<f64>, Mesh)>) -> Result<Self> {
        let len = meshes
            .iter()
            .try_fold(0usize, |acc, (_, mesh)| acc.checked_add(mesh.len()))
            .ok_or_else(|| PhaseSweepError::config("sweep has too many points to count"))?;
        Ok(MeshSet { meshes, len })
    }

    /// 所有网格的点数之和
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn meshes(&self) -> impl Iterator<Item = (Option<f64>, &Mesh)> {
        self.meshes.iter().map(|(level, mesh)| (*level, mesh))
    }

    /// 按水平顺序串联所有成分点
    pub fn points(&self) -> impl Iterator<Item = CompositionPoint> + '_ {
        self.meshes.iter().flat_map(|(_, mesh)| mesh.points())
    }
}
