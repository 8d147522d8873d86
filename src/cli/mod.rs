//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `validate`: 验证单个 SISSO 模型
//! - `sweep`: 按配置扫描 (rung, dimension) 组合
//! - `inspect`: 查看 SISSO.out 中的模型
//! - `split`: 划分训练/验证/测试集
//! - `kfold`: k 折划分
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: validate, sweep, inspect, split

pub mod inspect;
pub mod split;
pub mod sweep;
pub mod validate;

use clap::{ArgAction, Parser, Subcommand};

/// sissoval - SISSO 描述符模型验证工具
#[derive(Parser)]
#[command(name = "sissoval")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Validate SISSO descriptor models against held-out data", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Validate one SISSO model against a held-out data set
    Validate(validate::ValidateArgs),

    /// Validate every (rung, dimension) model listed in a configuration
    Sweep(sweep::SweepArgs),

    /// Show the models stored in a SISSO.out file
    Inspect(inspect::InspectArgs),

    /// Shuffle a feature table into training / validation / test files
    Split(split::SplitArgs),

    /// Split a feature table into k folds
    Kfold(split::KfoldArgs),
}
