//! # 终端输出
//!
//! 统一的状态前缀与组合结果行样式。错误与失败写到 stderr，其余写到 stdout。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};

/// 标题栏与分隔线宽度
const RULE_WIDTH: usize = 60;

/// 状态行种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Error,
    Fail,
    Warn,
    Info,
    Skip,
}

impl Status {
    fn tag(self) -> ColoredString {
        match self {
            Status::Ok => "[OK]".green().bold(),
            Status::Error => "[ERR]".red().bold(),
            Status::Fail => "[FAIL]".red().bold(),
            Status::Warn => "[WARN]".yellow().bold(),
            Status::Info => "[*]".blue().bold(),
            Status::Skip => "[SKIP]".dimmed(),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Status::Error | Status::Fail)
    }
}

fn emit(status: Status, msg: &str) {
    if status.to_stderr() {
        eprintln!("{} {}", status.tag(), msg);
    } else {
        println!("{} {}", status.tag(), msg);
    }
}

pub fn print_success(msg: &str) {
    emit(Status::Ok, msg);
}

pub fn print_error(msg: &str) {
    emit(Status::Error, msg);
}

pub fn print_warning(msg: &str) {
    emit(Status::Warn, msg);
}

pub fn print_info(msg: &str) {
    emit(Status::Info, msg);
}

/// 被跳过的数据行
pub fn print_skip(msg: &str) {
    emit(Status::Skip, msg);
}

/// 单个组合验证成功
pub fn print_combination(label: &str, rmse: f64, max_ae: f64) {
    emit(
        Status::Ok,
        &format!(
            "{:<24} RMSE {}  MaxAE {}",
            label,
            format!("{:.4}", rmse).cyan(),
            format!("{:.4}", max_ae).cyan()
        ),
    );
}

/// 单个组合失败
pub fn print_failure(label: &str, reason: &str) {
    emit(Status::Fail, &format!("{} {}", label.bold(), reason));
}

pub fn print_header(title: &str) {
    println!("\n{}", rule());
    println!("  {}", title.bold());
    println!("{}\n", rule());
}

pub fn print_separator() {
    println!("{}", rule());
}

fn rule() -> ColoredString {
    "─".repeat(RULE_WIDTH).dimmed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_go_to_stderr() {
        assert!(Status::Fail.to_stderr());
        assert!(Status::Error.to_stderr());
        assert!(!Status::Skip.to_stderr());
        assert!(!Status::Ok.to_stderr());
    }

    #[test]
    fn test_status_tags() {
        colored::control::set_override(false);
        assert_eq!(Status::Fail.tag().to_string(), "[FAIL]");
        assert_eq!(Status::Info.tag().to_string(), "[*]");
        assert_eq!(Status::Skip.tag().to_string(), "[SKIP]");
    }
}
