//! # validate 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/validate.rs`

use clap::Args;
use std::path::PathBuf;

/// validate 子命令参数
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// SISSO.out file, or a model directory containing one
    #[arg(long, short = 'm')]
    pub model: PathBuf,

    /// Descriptor dimension of the model to validate
    #[arg(long, short = 'd')]
    pub dimension: usize,

    /// Validation data file (header + `sample property features...` rows)
    #[arg(long)]
    pub data: PathBuf,

    /// Coefficient block of a multi-task model to apply to every row (0 and 1 both select the first)
    #[arg(long, conflicts_with = "tasks")]
    pub mix_id: Option<usize>,

    /// Task names of a multi-task model, in coefficient-block order (e.g. "O OH OOH")
    #[arg(long, requires = "boundaries")]
    pub tasks: Option<String>,

    /// Task boundaries as 1-based data row indices (e.g. "190 375 560")
    #[arg(long, requires = "tasks")]
    pub boundaries: Option<String>,

    /// Only score samples of these tasks (e.g. "OH OOH")
    #[arg(long, requires = "tasks")]
    pub score: Option<String>,

    // ─────────────────────────────────────────────────────────────
    // 输出
    // ─────────────────────────────────────────────────────────────
    /// Append `val/<label>  rmse  maxae` to this results log
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Record label for the results log (defaults to the model directory name)
    #[arg(long)]
    pub label: Option<String>,

    /// Write per-sample predictions to a CSV file
    #[arg(long)]
    pub predictions: Option<PathBuf>,

    /// Number of worst samples to show
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Skip rows that fail to evaluate instead of aborting
    #[arg(long, default_value_t = false)]
    pub skip_bad_rows: bool,
}
