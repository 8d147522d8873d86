//! # 批量处理模块
//!
//! 扫描模式下的组合调度。
//!
//! ## 功能
//! - 查找已有的模型目录
//! - 并行处理且保持顺序
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/sweep.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::ModelCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
