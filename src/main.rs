//! # sissoval - SISSO 描述符模型验证工具
//!
//! 读取 SISSO 求解器输出中的线性描述符模型，在独立的验证集上逐样本预测，
//! 统计 RMSE / MaxAE 并追加到结果日志。
//!
//! ## 子命令
//! - `validate` - 验证单个模型
//! - `sweep`    - 按配置扫描 (rung, dimension) 组合
//! - `inspect`  - 查看 SISSO.out 中的模型
//! - `split`    - 划分训练/验证/测试集
//! - `kfold`    - k 折划分
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── config.rs    (扫描配置)
//!   │     ├── batch/       (组合调度)
//!   │     ├── parsers/     (SISSO.out 与数据解析)
//!   │     ├── expr/        (描述符表达式)
//!   │     ├── validation/  (预测与统计)
//!   │     └── models/      (数据模型)
//!   ├── utils/      (输出、进度条、结果日志)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod expr;
#[cfg(test)]
mod fixtures;
mod models;
mod parsers;
mod utils;
mod validation;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            utils::output::print_error(&format!("  caused by: {}", cause));
            source = cause.source();
        }
        std::process::exit(1);
    }
}

/// `-v` 次数决定日志级别；未给出 `-v` 时尊重 `RUST_LOG`
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_default_env();
    if verbose > 0 || std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }
    builder
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}
