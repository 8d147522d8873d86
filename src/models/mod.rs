//! # 数据模型模块
//!
//! 定义 SISSO 模型、验证数据集和验证结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`validation/` 和 `commands/` 使用
//! - 子模块: sisso, dataset, report

pub mod dataset;
pub mod report;
pub mod sisso;

pub use dataset::{ValidationSample, ValidationSet};
pub use report::{Prediction, ValidationReport};
pub use sisso::{SissoModel, TaskFit};
