//! # 进度条工具
//!
//! 封装 `indicatif`，非终端环境下进度条自动隐藏。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 使用
//! - 使用 `indicatif` crate

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// 创建标准进度条
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    let pb = ProgressBar::new(len).with_style(style);
    pb.set_message(message.to_string());
    pb
}
