//! # 验证数据文件解析器
//!
//! 解析 SISSO 特征表格式的验证集：
//!
//! ```text
//! materials  property  feat_a  feat_b  ...
//! Pt111_O    1.234     2.0     3.0     ...
//! ```
//!
//! 第一行是表头，之后每行 `样本名 观测值 特征...`，以空白分隔。
//!
//! ## 依赖关系
//! - 被 `commands/validate.rs`, `commands/sweep.rs`, `commands/split.rs` 使用
//! - 使用 `models/dataset.rs`

use crate::error::{Result, SissoError};
use crate::models::{ValidationSample, ValidationSet};

use std::fs;
use std::path::Path;

/// 读取验证集文件
///
/// `lenient` 为真时格式错误的行被丢弃并记录在 `dropped` 中，否则立即报错。
pub fn read_validation_file(path: &Path, lenient: bool) -> Result<ValidationSet> {
    let content = read_table_text(path)?;
    parse_validation_content(&content, &path.display().to_string(), lenient)
}

/// 从字符串内容解析验证集
pub fn parse_validation_content(content: &str, source: &str, lenient: bool) -> Result<ValidationSet> {
    let mut lines = content.lines().enumerate();

    let header: Vec<String> = match lines.next() {
        Some((_, line)) => line.split_whitespace().map(str::to_string).collect(),
        None => Vec::new(),
    };
    if header.len() < 2 {
        return Err(SissoError::DataError {
            path: source.to_string(),
            line: 1,
            reason: "header needs at least a sample column and a property column".to_string(),
        });
    }

    let mut set = ValidationSet {
        path: source.to_string(),
        header,
        samples: Vec::new(),
        dropped: Vec::new(),
    };

    let mut row = 0;
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        row += 1;
        let line_no = idx + 1;

        match parse_row(line, &set.header, row, line_no) {
            Ok(sample) => set.samples.push(sample),
            Err(reason) if lenient => {
                log::warn!("{}:{}: dropping row: {}", source, line_no, reason);
                set.dropped.push((line_no, reason));
            }
            Err(reason) => {
                return Err(SissoError::DataError {
                    path: source.to_string(),
                    line: line_no,
                    reason,
                })
            }
        }
    }

    Ok(set)
}

fn parse_row(
    line: &str,
    header: &[String],
    row: usize,
    line_no: usize,
) -> std::result::Result<ValidationSample, String> {
    let values: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if values.len() != header.len() {
        return Err(format!(
            "expected {} columns, found {}",
            header.len(),
            values.len()
        ));
    }

    let observed_value: f64 = values[1]
        .parse()
        .map_err(|_| format!("cannot parse property value '{}'", values[1]))?;

    Ok(ValidationSample {
        sample_id: values[0].clone(),
        observed_value,
        feature_values: values,
        row,
        line: line_no,
    })
}

/// 按行读取表格：返回表头行与非空数据行（保持原文）
pub fn read_raw_table(path: &Path) -> Result<(String, Vec<String>)> {
    let content = read_table_text(path)?;
    let mut lines = content.lines();
    let header = lines
        .next()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| SissoError::DataError {
            path: path.display().to_string(),
            line: 1,
            reason: "missing header line".to_string(),
        })?
        .to_string();
    let rows = lines
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect();
    Ok((header, rows))
}

fn read_table_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SissoError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| SissoError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}
