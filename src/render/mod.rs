//! # 相图输出模块
//!
//! 将已保存的相图结果导出为图像和数据文件。
//!
//! ## 子模块
//! - `plot`: 相图绘制 (PNG/SVG)
//! - `export`: 分组数据导出 (CSV)
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 使用
//! - 使用 `models/result.rs`

pub mod export;
pub mod plot;
