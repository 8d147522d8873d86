//! # 解析器模块
//!
//! 提供 SISSO 求解器输出与验证数据文件的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: sisso_out, dataset

pub mod dataset;
pub mod sisso_out;

pub use dataset::{read_raw_table, read_validation_file};
pub use sisso_out::{parse_sisso_file, resolve_model_path};
