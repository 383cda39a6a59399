//! # 成分点数据模型
//!
//! 一个成分点是合金体系中所有元素的摩尔分数赋值。
//! 生成后不可变，其身份即规范名称字符串（如 `Al0.05-Cr0.30-Ni0.65`）。
//!
//! ## 依赖关系
//! - 由 `mesh/generator.rs` 创建
//! - 被 `engine/`, `store/`, `batch/runner.rs` 使用
//! - 使用 `regex` 解析规范名称

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// 规范名称中元素之间的分隔符
pub const NAME_SEPARATOR: char = '-';

/// 默认规范名称小数位数
pub const DEFAULT_PRECISION: usize = 2;

/// 成分点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionPoint {
    /// 按声明顺序排列的 (元素, 摩尔分数)
    fractions: Vec<(String, f64)>,
    /// 规范名称的小数位数
    precision: usize,
}

impl CompositionPoint {
    pub fn new(fractions: Vec<(String, f64)>, precision: usize) -> Self {
        CompositionPoint {
            fractions,
            precision,
        }
    }

    /// 按声明顺序迭代 (元素, 分数)
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fractions.iter().map(|(el, x)| (el.as_str(), *x))
    }

    /// 查询某元素的分数
    pub fn fraction(&self, element: &str) -> Option<f64> {
        self.fractions
            .iter()
            .find(|(el, _)| el == element)
            .map(|(_, x)| *x)
    }

    pub fn elements(&self) -> Vec<&str> {
        self.fractions.iter().map(|(el, _)| el.as_str()).collect()
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// 规范名称：`<元素><分数>` 以 `-` 连接，固定小数位
    pub fn canonical_name(&self) -> String {
        self.fractions
            .iter()
            .map(|(el, x)| format!("{}{:.*}", el, self.precision, x))
            .collect::<Vec<_>>()
            .join(&NAME_SEPARATOR.to_string())
    }

    /// 从规范名称解析成分点（精度取自名称中的小数位数）
    pub fn parse_canonical_name(name: &str) -> Option<Self> {
        static PAIR: OnceLock<Regex> = OnceLock::new();
        let re = PAIR.get_or_init(|| Regex::new(r"^([A-Z][a-z]{0,2})(\d+(?:\.(\d+))?)$").unwrap());

        let mut fractions = Vec::new();
        let mut precision = None;

        for part in name.split(NAME_SEPARATOR) {
            let caps = re.captures(part)?;
            let element = caps.get(1)?.as_str().to_string();
            let value: f64 = caps.get(2)?.as_str().parse().ok()?;
            let digits = caps.get(3).map(|m| m.as_str().len()).unwrap_or(0);

            match precision {
                None => precision = Some(digits),
                Some(p) if p != digits => return None,
                _ => {}
            }
            fractions.push((element, value));
        }

        Some(CompositionPoint::new(fractions, precision?))
    }
}

impl fmt::Display for CompositionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}
