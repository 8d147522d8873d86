//! # 统一错误处理模块
//!
//! 定义 sissoval 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分级
//! - 致命错误（I/O、配置、参数）：终止整个运行
//! - 局部错误（模型格式、表达式、路由）：只终止当前 (rung, dimension) 组合
//! - 行错误（求值失败）：终止当前组合，或在 `skip_bad_rows` 下跳过该行
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// sissoval 统一错误类型
#[derive(Error, Debug)]
pub enum SissoError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed SISSO output {path} (line {line}): {reason}")]
    FormatError {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Malformed validation data {path} (line {line}): {reason}")]
    DataError {
        path: String,
        line: usize,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 表达式错误
    // ─────────────────────────────────────────────────────────────
    #[error("Syntax error in descriptor '{expr}' at column {position}: {reason}")]
    ExpressionSyntax {
        expr: String,
        position: usize,
        reason: String,
    },

    #[error("Descriptor '{expr}' references unknown feature '{name}'")]
    UnknownFeature { name: String, expr: String },

    #[error("Feature '{name}' appears more than once in the data header")]
    AmbiguousFeature { name: String },

    #[error("Cannot evaluate '{expr}': {reason}")]
    EvaluationError { expr: String, reason: String },

    #[error("Sample '{sample}' (line {line}) failed: {reason}")]
    RowFailed {
        sample: String,
        line: usize,
        reason: String,
    },

    #[error("Data row {row} is not covered by any task boundary")]
    RoutingError { row: usize },

    // ─────────────────────────────────────────────────────────────
    // 参数与配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl SissoError {
    /// 是否应终止整个扫描（而不仅是当前组合）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SissoError::FileReadError { .. }
                | SissoError::FileWriteError { .. }
                | SissoError::DirectoryNotFound { .. }
                | SissoError::FileNotFound { .. }
                | SissoError::ConfigError(_)
                | SissoError::InvalidArgument(_)
                | SissoError::InvalidRange(_)
        )
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SissoError>;
