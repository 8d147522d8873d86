//! # split / kfold 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/split.rs`

use clap::Args;
use std::path::PathBuf;

/// split 子命令参数
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Feature table (header + one sample per line)
    pub input: PathBuf,

    /// Fraction of rows written to training_data
    #[arg(long, default_value_t = 0.5)]
    pub train: f64,

    /// Fraction of rows written to validation_data (the rest goes to test_data)
    #[arg(long, default_value_t = 0.25)]
    pub validation: f64,

    /// Random seed for a reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output directory
    #[arg(long, short = 'o', default_value = ".")]
    pub out_dir: PathBuf,
}

/// kfold 子命令参数
#[derive(Args, Debug)]
pub struct KfoldArgs {
    /// Feature table (header + one sample per line)
    pub input: PathBuf,

    /// Number of folds
    #[arg(long, short = 'k', default_value_t = 5)]
    pub folds: usize,

    /// Row counts of consecutive task groups to stratify by (e.g. "189 185")
    #[arg(long)]
    pub groups: Option<String>,

    /// Random seed for a reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output directory
    #[arg(long, short = 'o', default_value = ".")]
    pub out_dir: PathBuf,
}
