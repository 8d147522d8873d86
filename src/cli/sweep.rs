//! # sweep 子命令 CLI 定义
//!
//! 配置文件的每个键都可以用同名参数覆盖。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sweep.rs`

use crate::config::DEFAULT_CONFIG;

use clap::Args;
use std::path::PathBuf;

/// sweep 子命令参数
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// INI configuration file with a [root] section
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    // ─────────────────────────────────────────────────────────────
    // 配置覆盖
    // ─────────────────────────────────────────────────────────────
    /// Directory holding the `{root}_{rung}r_{dim}d` model directories
    #[arg(long)]
    pub pathway: Option<PathBuf>,

    /// Validation data file
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Model directory prefix
    #[arg(long)]
    pub root_name: Option<String>,

    /// Dimension whose worst samples are written to the results log
    #[arg(long)]
    pub opt_dimension: Option<usize>,

    /// Task names (e.g. "O OH OOH")
    #[arg(long)]
    pub tasks: Option<String>,

    /// Task boundaries as 1-based data row indices (e.g. "190 375 560")
    #[arg(long)]
    pub boundaries: Option<String>,

    /// Rungs to sweep (e.g. '0-2')
    #[arg(long)]
    pub rungs: Option<String>,

    /// Dimensions to sweep (e.g. '1-8')
    #[arg(long)]
    pub dimensions: Option<String>,

    /// Results log (appended)
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Only score samples of these tasks
    #[arg(long)]
    pub score: Option<String>,

    // ─────────────────────────────────────────────────────────────
    // 执行控制
    // ─────────────────────────────────────────────────────────────
    /// Validate the model directories found under the pathway instead of the fixed ranges
    #[arg(long, default_value_t = false)]
    pub discover: bool,

    /// Search model directories recursively (with --discover)
    #[arg(long, short = 'r', default_value_t = false, requires = "discover")]
    pub recursive: bool,

    /// Number of combinations validated in parallel (0 = all cores)
    #[arg(long, short = 'j', default_value_t = 1)]
    pub jobs: usize,

    /// Stop at the first failing combination
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Skip rows that fail to evaluate instead of aborting the combination
    #[arg(long, default_value_t = false)]
    pub skip_bad_rows: bool,
}
