//! # 模型验证
//!
//! - `routing`: 多任务数据行到任务的映射
//! - `runner`: 逐行预测与汇总
//! - `stats`: RMSE / MaxAE / 误差排序
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `expr/`, `models/`

pub mod routing;
pub mod runner;
pub mod stats;

pub use routing::TaskRouter;
pub use runner::{RowPolicy, ValidationOutcome, ValidationRunner};
