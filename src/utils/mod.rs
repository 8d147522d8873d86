//! # 工具函数模块
//!
//! 提供美化输出、进度条和结果日志。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `batch/` 模块使用
//! - 子模块: output, progress, results_log

pub mod output;
pub mod progress;
pub mod results_log;
