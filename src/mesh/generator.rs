//! # 成分网格生成器
//!
//! 根据固定/变化/余量元素设置生成成分点序列。
//!
//! ## 功能
//! - 构造时完成全部校验，非法参数返回配置错误
//! - 变化元素在 [min, 上限] 上等间距取值，上限由剩余预算决定
//! - 惰性迭代，按需生成成分点；同一网格可重复迭代
//!
//! ## 依赖关系
//! - 使用 `mesh/spec.rs` 的参数定义
//! - 生成 `models/composition.rs` 的 CompositionPoint
//! - 被 `mesh/mod.rs` 和 `commands/` 使用

use super::spec::{ElementRole, MeshSpec};
use crate::error::{PhaseSweepError, Result};
use crate::models::CompositionPoint;

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// 分数比较容差
pub const FRACTION_EPS: f64 = 1e-9;

/// 允许的最大规范名称精度
const MAX_PRECISION: usize = 10;

/// 元素在网格中的取值来源
#[derive(Debug, Clone)]
enum Slot {
    Fixed(f64),
    Varying(usize),
    Balance,
}

/// 单个变化元素的网格轴
#[derive(Debug, Clone)]
struct Axis {
    min: f64,
    max: f64,
    /// 完整网格点数（含端点）
    steps: usize,
    /// 实际使用的网格下标范围 [first, last)
    first: usize,
    last: usize,
}

impl Axis {
    fn value(&self, k: usize) -> f64 {
        if self.steps <= 1 {
            return self.min;
        }
        let t = k as f64 / (self.steps - 1) as f64;
        (self.min + (self.max - self.min) * t).min(self.max)
    }

    fn count(&self) -> usize {
        self.last - self.first
    }
}

/// 已校验的成分网格
#[derive(Debug, Clone)]
pub struct Mesh {
    symbols: Vec<String>,
    slots: Vec<Slot>,
    axes: Vec<Axis>,
    precision: usize,
    len: usize,
}

impl Mesh {
    /// 校验参数并构造网格
    pub fn new(spec: &MeshSpec) -> Result<Self> {
        validate_elements(spec)?;

        if spec.precision == 0 || spec.precision > MAX_PRECISION {
            return Err(PhaseSweepError::config(format!(
                "precision must be between 1 and {}, got {}",
                MAX_PRECISION, spec.precision
            )));
        }

        // 固定元素
        let mut fixed_sum = 0.0;
        for element in &spec.elements {
            if let ElementRole::Fixed { value } = element.role {
                if !value.is_finite() || value < 0.0 || value > 1.0 {
                    return Err(PhaseSweepError::config(format!(
                        "fixed fraction of {} must lie in [0, 1], got {}",
                        element.symbol, value
                    )));
                }
                fixed_sum += value;
            }
        }
        if fixed_sum > 1.0 + FRACTION_EPS {
            return Err(PhaseSweepError::config(format!(
                "constant fractions sum to {:.6}, which exceeds 1",
                fixed_sum
            )));
        }
        let budget = 1.0 - fixed_sum;

        // 显式上限占用的预算
        let mut explicit_sum = 0.0;
        let mut implicit_count = 0usize;
        for element in &spec.elements {
            if let ElementRole::Varying { min, max, .. } = element.role {
                if !min.is_finite() || min < 0.0 {
                    return Err(PhaseSweepError::config(format!(
                        "lower bound of {} must be a non-negative number, got {}",
                        element.symbol, min
                    )));
                }
                match max {
                    Some(m) if !m.is_finite() || m < min => {
                        return Err(PhaseSweepError::config(format!(
                            "range of {} is empty: [{}, {}]",
                            element.symbol, min, m
                        )));
                    }
                    Some(m) => explicit_sum += m,
                    None => implicit_count += 1,
                }
            }
        }
        if explicit_sum > budget + FRACTION_EPS {
            return Err(PhaseSweepError::config(format!(
                "upper bounds of varying elements sum to {:.6}, but only {:.6} remains after constants",
                explicit_sum, budget
            )));
        }
        let share = if implicit_count > 0 {
            (budget - explicit_sum).max(0.0) / implicit_count as f64
        } else {
            0.0
        };

        // 网格轴
        let mut slots = Vec::with_capacity(spec.elements.len());
        let mut axes = Vec::new();

        for element in &spec.elements {
            let slot = match element.role {
                ElementRole::Fixed { value } => Slot::Fixed(value),
                ElementRole::Balance => Slot::Balance,
                ElementRole::Varying { min, max, steps } => {
                    let max = max.unwrap_or(share);
                    let steps = steps.unwrap_or(spec.steps);
                    let axis = build_axis(&element.symbol, min, max, steps, spec)?;
                    axes.push(axis);
                    Slot::Varying(axes.len() - 1)
                }
            };
            slots.push(slot);
        }

        let len = axes
            .iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.count()))
            .ok_or_else(|| PhaseSweepError::config("mesh has too many points to count"))?;

        for (slot, element) in slots.iter().zip(&spec.elements) {
            if let Slot::Varying(i) = slot {
                check_axis_names(&element.symbol, &axes[*i], spec.precision)?;
            }
        }

        Ok(Mesh {
            symbols: spec.elements.iter().map(|e| e.symbol.clone()).collect(),
            slots,
            axes,
            precision: spec.precision,
            len,
        })
    }

    /// 网格点总数（各变化元素取值数之积）
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// 变化元素及其 [min, 上限]
    pub fn varying_bounds(&self) -> Vec<(&str, f64, f64)> {
        self.slots
            .iter()
            .zip(&self.symbols)
            .filter_map(|(slot, sym)| match slot {
                Slot::Varying(i) => Some((sym.as_str(), self.axes[*i].min, self.axes[*i].max)),
                _ => None,
            })
            .collect()
    }

    /// 惰性迭代所有成分点；第一个变化元素变化最慢
    pub fn points(&self) -> MeshPoints<'_> {
        MeshPoints {
            mesh: self,
            counters: self.axes.iter().map(|a| a.first).collect(),
            done: self.is_empty(),
        }
    }

    fn point_at(&self, counters: &[usize]) -> CompositionPoint {
        let mut fractions: Vec<(String, f64)> = Vec::with_capacity(self.slots.len());
        let mut balance_index = None;

        for (i, (slot, symbol)) in self.slots.iter().zip(&self.symbols).enumerate() {
            let x = match slot {
                Slot::Fixed(v) => *v,
                Slot::Varying(a) => self.axes[*a].value(counters[*a]),
                Slot::Balance => {
                    balance_index = Some(i);
                    0.0
                }
            };
            fractions.push((symbol.clone(), x));
        }

        if let Some(i) = balance_index {
            let rest: f64 = fractions.iter().map(|(_, x)| x).sum();
            let mut remainder = 1.0 - rest;
            if remainder.abs() < FRACTION_EPS {
                remainder = 0.0;
            }
            fractions[i].1 = remainder;
        }

        CompositionPoint::new(fractions, self.precision)
    }
}

/// 成分点迭代器（里程表式计数）
pub struct MeshPoints<'a> {
    mesh: &'a Mesh,
    counters: Vec<usize>,
    done: bool,
}

impl Iterator for MeshPoints<'_> {
    type Item = CompositionPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let point = self.mesh.point_at(&self.counters);

        // 从最后一个轴开始进位
        let mut carried = true;
        for (i, axis) in self.mesh.axes.iter().enumerate().rev() {
            self.counters[i] += 1;
            if self.counters[i] < axis.last {
                carried = false;
                break;
            }
            self.counters[i] = axis.first;
        }
        if carried {
            self.done = true;
        }

        Some(point)
    }
}

fn validate_elements(spec: &MeshSpec) -> Result<()> {
    if spec.elements.is_empty() {
        return Err(PhaseSweepError::config("element list is empty"));
    }

    static SYMBOL: OnceLock<Regex> = OnceLock::new();
    let symbol_re = SYMBOL.get_or_init(|| Regex::new(r"^[A-Z][a-z]{0,2}$").unwrap());

    let mut seen = HashSet::new();
    for element in &spec.elements {
        if !symbol_re.is_match(&element.symbol) {
            return Err(PhaseSweepError::config(format!(
                "'{}' is not a valid element symbol",
                element.symbol
            )));
        }
        if !seen.insert(element.symbol.as_str()) {
            return Err(PhaseSweepError::config(format!(
                "element {} is listed more than once",
                element.symbol
            )));
        }
    }

    let balance = spec.elements.iter().filter(|e| e.is_balance()).count();
    if balance > 1 {
        return Err(PhaseSweepError::config(format!(
            "at most one balance element is allowed, found {}",
            balance
        )));
    }

    Ok(())
}

fn build_axis(
    symbol: &str,
    min: f64,
    max: f64,
    steps: usize,
    spec: &MeshSpec,
) -> Result<Axis> {
    let required = if spec.exclude_endpoints { 3 } else { 1 };
    if steps < required {
        return Err(PhaseSweepError::config(format!(
            "{} needs at least {} steps, got {}",
            symbol, required, steps
        )));
    }
    if max < min - FRACTION_EPS {
        return Err(PhaseSweepError::config(format!(
            "no budget left for {}: upper bound {:.6} is below lower bound {:.6}",
            symbol, max, min
        )));
    }

    if steps > 1 && max - min <= FRACTION_EPS {
        return Err(PhaseSweepError::config(format!(
            "range of {} is degenerate ([{}, {}]) but {} steps were requested",
            symbol, min, max, steps
        )));
    }

    let (first, last) = if spec.exclude_endpoints {
        (1, steps - 1)
    } else {
        (0, steps)
    };

    Ok(Axis {
        min,
        max: max.max(min),
        steps,
        first,
        last,
    })
}

/// 检查轴上实际使用的取值按名称精度格式化后互不相同
///
/// 取值随下标单调不减，格式化也保持单调，只需比较相邻取值。
fn check_axis_names(symbol: &str, axis: &Axis, precision: usize) -> Result<()> {
    let count = axis.count();
    if count < 2 {
        return Ok(());
    }

    let resolution = 10f64.powi(-(precision as i32));
    let lo = axis.value(axis.first);
    let hi = axis.value(axis.last - 1);

    // 区间内可区分的名称数不足
    if count as f64 > (hi - lo) / resolution + 2.0 {
        return Err(PhaseSweepError::config(format!(
            "{} takes {} values in [{:.*}, {:.*}], more than {} decimals can name apart",
            symbol, count, precision, lo, precision, hi, precision
        )));
    }

    // 间距明显大于分辨率时相邻取值不会格式化为同一名称
    let spacing = (hi - lo) / (count - 1) as f64;
    if spacing > resolution * (1.0 + 1e-4) {
        return Ok(());
    }

    let mut previous = format!("{:.*}", precision, lo);
    for k in axis.first + 1..axis.last {
        let label = format!("{:.*}", precision, axis.value(k));
        if label == previous {
            return Err(PhaseSweepError::config(format!(
                "two grid values of {} both format as {} at {} decimals",
                symbol, label, precision
            )));
        }
        previous = label;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::spec::ElementSpec;
    use std::collections::HashSet;

    fn names(mesh: &Mesh) -> Vec<String> {
        mesh.points().map(|p| p.canonical_name()).collect()
    }

    #[test]
    fn test_single_varying_with_constant() {
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying_range("Al", 0.0, 0.10),
                ElementSpec::fixed("Cr", 0.30),
            ],
            3,
        );
        let mesh = Mesh::new(&spec).unwrap();

        assert_eq!(mesh.len(), 3);
        assert_eq!(
            names(&mesh),
            vec!["Al0.00-Cr0.30", "Al0.05-Cr0.30", "Al0.10-Cr0.30"]
        );
    }

    #[test]
    fn test_point_count_is_steps_pow_varying() {
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying("Al"),
                ElementSpec::varying("Cr"),
                ElementSpec::fixed("Co", 0.1),
                ElementSpec::fixed("Fe", 0.1),
                ElementSpec::balance("Ni"),
            ],
            5,
        );
        let mesh = Mesh::new(&spec).unwrap();

        assert_eq!(mesh.len(), 25);
        let points: Vec<_> = mesh.points().collect();
        assert_eq!(points.len(), 25);

        // 上限为剩余预算平分：(1 - 0.2) / 2
        for p in &points {
            for el in ["Al", "Cr"] {
                let x = p.fraction(el).unwrap();
                assert!(x >= 0.0 && x <= 0.4 + FRACTION_EPS, "{} = {}", el, x);
            }
            assert_eq!(p.fraction("Co"), Some(0.1));
            assert_eq!(p.fraction("Fe"), Some(0.1));
            assert!((p.iter().map(|(_, x)| x).sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(p.fraction("Ni").unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_canonical_names_are_unique() {
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying("Al").with_steps(4),
                ElementSpec::varying("Cr").with_steps(6),
                ElementSpec::fixed("Fe", 0.2),
            ],
            10,
        );
        let mesh = Mesh::new(&spec).unwrap();
        let all = names(&mesh);
        let unique: HashSet<_> = all.iter().collect();

        assert_eq!(all.len(), 24);
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_half_way_offset_grid_names_collide() {
        // 0.005 与 0.015 在两位小数下都写作 0.01
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying_range("Al", 0.005, 0.025).with_steps(3),
                ElementSpec::fixed("Cr", 0.3),
            ],
            3,
        );
        assert!(matches!(
            Mesh::new(&spec),
            Err(PhaseSweepError::Configuration(_))
        ));

        let finer = Mesh::new(&spec.clone().with_precision(3)).unwrap();
        let all = names(&finer);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), 3);
        assert_eq!(unique.len(), 3);
        assert_eq!(all[0], "Al0.005-Cr0.300");
    }

    #[test]
    fn test_spacing_just_below_resolution_is_accepted_when_names_differ() {
        // 0.0000, 0.0099, 0.0198 -> 0.00, 0.01, 0.02
        let spec = MeshSpec::new(
            vec![ElementSpec::varying_range("Al", 0.0, 0.0198).with_steps(3)],
            3,
        );
        let mesh = Mesh::new(&spec).unwrap();
        assert_eq!(names(&mesh), vec!["Al0.00", "Al0.01", "Al0.02"]);
    }

    #[test]
    fn test_point_count_overflow_is_error() {
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying("Al"),
                ElementSpec::varying("Cr"),
                ElementSpec::varying("Co"),
            ],
            10_000_000,
        )
        .with_precision(10);
        assert!(matches!(
            Mesh::new(&spec),
            Err(PhaseSweepError::Configuration(_))
        ));
    }

    #[test]
    fn test_points_are_restartable() {
        let spec = MeshSpec::new(vec![ElementSpec::varying("Al"), ElementSpec::balance("Ni")], 4);
        let mesh = Mesh::new(&spec).unwrap();
        assert_eq!(names(&mesh), names(&mesh));
    }

    #[test]
    fn test_first_varying_changes_slowest() {
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying_range("Al", 0.0, 0.1),
                ElementSpec::varying_range("Cr", 0.0, 0.1),
            ],
            2,
        )
        .with_precision(1);
        let mesh = Mesh::new(&spec).unwrap();
        assert_eq!(
            names(&mesh),
            vec!["Al0.0-Cr0.0", "Al0.0-Cr0.1", "Al0.1-Cr0.0", "Al0.1-Cr0.1"]
        );
    }

    #[test]
    fn test_exclude_endpoints() {
        let spec = MeshSpec::new(
            vec![ElementSpec::varying_range("Al", 0.0, 0.4), ElementSpec::balance("Ni")],
            5,
        )
        .exclude_endpoints(true);
        let mesh = Mesh::new(&spec).unwrap();
        assert_eq!(mesh.len(), 3);
        assert_eq!(
            names(&mesh),
            vec!["Al0.10-Ni0.90", "Al0.20-Ni0.80", "Al0.30-Ni0.70"]
        );
    }

    #[test]
    fn test_no_varying_elements_yields_one_point() {
        let spec = MeshSpec::new(
            vec![ElementSpec::fixed("Cr", 0.2), ElementSpec::balance("Ni")],
            7,
        );
        let mesh = Mesh::new(&spec).unwrap();
        assert_eq!(names(&mesh), vec!["Cr0.20-Ni0.80"]);
    }

    #[test]
    fn test_constants_exceeding_one_is_error() {
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying("Al"),
                ElementSpec::fixed("Cr", 0.6),
                ElementSpec::fixed("Co", 0.5),
            ],
            3,
        );
        let err = Mesh::new(&spec).unwrap_err();
        assert!(matches!(err, PhaseSweepError::Configuration(_)));
    }

    #[test]
    fn test_explicit_bounds_exceeding_budget_is_error() {
        let spec = MeshSpec::new(
            vec![
                ElementSpec::varying_range("Al", 0.0, 0.5),
                ElementSpec::fixed("Cr", 0.6),
            ],
            3,
        );
        assert!(matches!(
            Mesh::new(&spec),
            Err(PhaseSweepError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_elements_are_errors() {
        let dup = MeshSpec::new(vec![ElementSpec::varying("Al"), ElementSpec::fixed("Al", 0.1)], 3);
        assert!(Mesh::new(&dup).is_err());

        let bad_symbol = MeshSpec::new(vec![ElementSpec::varying("al")], 3);
        assert!(Mesh::new(&bad_symbol).is_err());

        let two_balance = MeshSpec::new(
            vec![
                ElementSpec::varying("Al"),
                ElementSpec::balance("Fe"),
                ElementSpec::balance("Ni"),
            ],
            3,
        );
        assert!(Mesh::new(&two_balance).is_err());

        assert!(Mesh::new(&MeshSpec::new(vec![], 3)).is_err());
    }

    #[test]
    fn test_spacing_finer_than_precision_is_error() {
        let spec = MeshSpec::new(vec![ElementSpec::varying_range("Al", 0.0, 0.01)], 11);
        assert!(matches!(
            Mesh::new(&spec),
            Err(PhaseSweepError::Configuration(_))
        ));

        let finer = spec.clone().with_precision(3);
        assert_eq!(Mesh::new(&finer).unwrap().len(), 11);
    }

    #[test]
    fn test_exclude_endpoints_needs_three_steps() {
        let spec = MeshSpec::new(vec![ElementSpec::varying("Al")], 2).exclude_endpoints(true);
        assert!(Mesh::new(&spec).is_err());
    }
}
