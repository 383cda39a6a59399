//! # 数据模型模块
//!
//! 定义成分点与相图结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `mesh/`, `engine/`, `store/` 和 `commands/` 使用
//! - 子模块: composition, result

pub mod composition;
pub mod result;

pub use composition::{CompositionPoint, DEFAULT_PRECISION};
pub use result::{PhaseDiagramResult, PhaseGroup};
