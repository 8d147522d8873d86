//! # inspect 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/inspect.rs`

use clap::Args;
use std::path::PathBuf;

/// inspect 子命令参数
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// SISSO.out file, or a model directory containing one
    #[arg(long, short = 'm')]
    pub model: PathBuf,

    /// Only show this dimension (default: every dimension in the file)
    #[arg(long, short = 'd')]
    pub dimension: Option<usize>,

    /// Number of coefficient blocks (tasks) per model
    #[arg(long, default_value_t = 1)]
    pub tasks: usize,
}
