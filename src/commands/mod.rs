//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `parsers/`, `validation/`, `utils/`
//! - 子模块: validate, sweep, inspect, split

pub mod inspect;
pub mod split;
pub mod sweep;
pub mod validate;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Validate(args) => validate::execute(args),
        Commands::Sweep(args) => sweep::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Split(args) => split::execute_split(args),
        Commands::Kfold(args) => split::execute_kfold(args),
    }
}
