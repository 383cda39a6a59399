//! # 相图绘制
//!
//! 使用 `plotters` 将各稳定相组合的数据点绘制为散点相图。
//!
//! ## 功能
//! - 每个相组合一种颜色，附图例
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 调用
//! - 使用 `models/result.rs` 的 PhaseDiagramResult
//! - 使用 `plotters` 渲染图表

use crate::error::{PhaseSweepError, Result};
use crate::models::PhaseDiagramResult;

use plotters::prelude::*;
use std::path::Path;

/// 生成相图
pub fn generate_phase_plot(
    result: &PhaseDiagramResult,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_phase_chart(&root, result, title)?;
        root.present()
            .map_err(|e| PhaseSweepError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_phase_chart(&root, result, title)?;
        root.present()
            .map_err(|e| PhaseSweepError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 坐标轴范围：数据范围外扩 5%，无数据时为单位区间
pub fn axis_bounds(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        Some((lo, hi)) if hi > lo => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
        Some((v, _)) => (v - 0.5, v + 0.5),
        None => (0.0, 1.0),
    }
}

/// 绘制相图的核心逻辑
fn draw_phase_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    result: &PhaseDiagramResult,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| PhaseSweepError::Other(format!("{:?}", e)))?;

    let (x_min, x_max) = axis_bounds(result.x_range());
    let (y_min, y_max) = axis_bounds(result.y_range());

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| PhaseSweepError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(result.x_quantity())
        .y_desc(result.y_quantity())
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| PhaseSweepError::Other(format!("{:?}", e)))?;

    for (i, (phases, group)) in result.groups().filter(|(_, g)| !g.is_empty()).enumerate() {
        let color = Palette99::pick(i).to_rgba();

        chart
            .draw_series(
                group
                    .points()
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
                    .map(|(x, y)| Circle::new((x, y), 2, color.filled())),
            )
            .map_err(|e| PhaseSweepError::Other(format!("{:?}", e)))?
            .label(phases)
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    if result.group_count() > 0 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .label_font(("sans-serif", 13))
            .draw()
            .map_err(|e| PhaseSweepError::Other(format!("{:?}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_bounds() {
        let (lo, hi) = axis_bounds(Some((0.0, 1.0)));
        assert!((lo + 0.05).abs() < 1e-12);
        assert!((hi - 1.05).abs() < 1e-12);

        assert_eq!(axis_bounds(Some((800.0, 800.0))), (799.5, 800.5));
        assert_eq!(axis_bounds(None), (0.0, 1.0));
    }
}
