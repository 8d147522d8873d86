//! # SISSO.out 输出解析器
//!
//! 从 SISSO 求解器的文本输出中提取指定维度的模型：训练误差、描述符、
//! 以及每个任务的系数与截距。
//!
//! SISSO.out 是定宽格式，解析依赖固定的列偏移和标记文本，
//! 所有偏移都集中在本文件，求解器格式变化时只需修改这里。
//!
//! ```text
//!   2D descriptor (model):
//!   RMSE and MaxAE:   0.181598  0.467531          <- 第 20 列起
//! @@@descriptor:
//!                      25:[((chi_A*IE_B)/sqrt(r_s))]   <- 第 24 列起
//!                     138:[(log(N_d)-exp-(E_gap))]
//!        coefficients_001:     0.15E+01   -0.33E+00  <- 每任务三行一组
//!           Intercept_001:    -0.21E+01
//!          RMSE,MaxAE_001:     0.18E+00    0.46E+00
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/validate.rs`, `commands/sweep.rs`, `commands/inspect.rs` 使用
//! - 使用 `models/sisso.rs`

use crate::error::{Result, SissoError};
use crate::models::{SissoModel, TaskFit};

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// 训练误差行中数值的起始列
pub const ERROR_COLUMN: usize = 20;

/// 描述符行中表达式的起始列
pub const DESCRIPTOR_COLUMN: usize = 24;

/// 系数行与截距行中数值的起始列
pub const COEFFICIENT_COLUMN: usize = 24;

/// 每个任务的系数块行数（系数、截距、误差）
const TASK_BLOCK_LINES: usize = 3;

/// SISSO 输出文件的默认文件名
pub const SISSO_OUT: &str = "SISSO.out";

/// 指定维度模型块的起始标记
pub fn model_marker(dimension: usize) -> String {
    format!("  {}D descriptor (model):", dimension)
}

/// 目录则补上 SISSO.out，文件则原样返回
pub fn resolve_model_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(SISSO_OUT)
    } else {
        path.to_path_buf()
    }
}

/// 读取 SISSO.out 全文
pub fn read_sisso_file(path: &Path) -> Result<String> {
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

/// 解析 SISSO.out 文件中 `dimension` 维、`task_count` 个任务的模型
pub fn parse_sisso_file(path: &Path, dimension: usize, task_count: usize) -> Result<SissoModel> {
    let content = read_sisso_file(path)?;
    parse_sisso_content(&content, &path.display().to_string(), dimension, task_count)
}

/// 从字符串内容解析模型
///
/// `source` 只用于错误信息。
pub fn parse_sisso_content(
    content: &str,
    source: &str,
    dimension: usize,
    task_count: usize,
) -> Result<SissoModel> {
    if dimension == 0 {
        return Err(SissoError::InvalidArgument(
            "model dimension must be at least 1".to_string(),
        ));
    }
    if task_count == 0 {
        return Err(SissoError::InvalidArgument(
            "at least one task is required".to_string(),
        ));
    }

    let lines: Vec<&str> = content.lines().collect();
    let format_error = |index: usize, reason: String| SissoError::FormatError {
        path: source.to_string(),
        line: index + 1,
        reason,
    };

    // 标记行之后的第一行（0 起索引）
    let marker = model_marker(dimension);
    let error_begin = lines
        .iter()
        .position(|line| line.starts_with(&marker))
        .map(|idx| idx + 1)
        .ok_or_else(|| SissoError::FormatError {
            path: source.to_string(),
            line: lines.len(),
            reason: format!("marker '{}' not found", marker.trim()),
        })?;

    let line_at = |index: usize| -> Result<&str> {
        lines
            .get(index)
            .copied()
            .ok_or_else(|| format_error(index, "unexpected end of file".to_string()))
    };

    // 训练误差
    let errors = parse_floats(column_from(line_at(error_begin)?, ERROR_COLUMN))
        .map_err(|reason| format_error(error_begin, reason))?;
    let (training_rmse, training_max_ae) = match errors.as_slice() {
        [rmse, max_ae] => (*rmse, *max_ae),
        _ => {
            return Err(format_error(
                error_begin,
                format!("expected RMSE and MaxAE, found {} values", errors.len()),
            ))
        }
    };

    // 描述符
    let mut descriptors = Vec::with_capacity(dimension);
    for k in 0..dimension {
        let index = error_begin + 2 + k;
        let text = extract_descriptor(line_at(index)?).map_err(|reason| format_error(index, reason))?;
        descriptors.push(text);
    }

    // 每个任务的系数与截距
    let mut fits = Vec::with_capacity(task_count);
    for task in 0..task_count {
        let coef_index = error_begin + dimension + 2 + task * TASK_BLOCK_LINES;
        let coefficients = parse_floats(column_from(line_at(coef_index)?, COEFFICIENT_COLUMN))
            .map_err(|reason| format_error(coef_index, reason))?;
        if coefficients.len() != dimension {
            return Err(format_error(
                coef_index,
                format!(
                    "expected {} coefficients for task {}, found {}",
                    dimension,
                    task + 1,
                    coefficients.len()
                ),
            ));
        }

        let intercept_index = coef_index + 1;
        let intercept_text = column_from(line_at(intercept_index)?, COEFFICIENT_COLUMN).trim();
        let intercept: f64 = intercept_text.parse().map_err(|_| {
            format_error(
                intercept_index,
                format!("cannot parse intercept '{}'", intercept_text),
            )
        })?;

        fits.push(TaskFit::new(coefficients, intercept));
    }

    Ok(SissoModel {
        dimension,
        descriptors,
        fits,
        training_rmse,
        training_max_ae,
    })
}

/// 列出文件中出现的所有模型维度（按出现顺序）
pub fn available_dimensions(content: &str) -> Vec<usize> {
    let re = Regex::new(r"^  (\d+)D descriptor \(model\):").unwrap();
    content
        .lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// 第 `offset` 个字符起的子串，行不够长时为空
fn column_from(line: &str, offset: usize) -> &str {
    match line.char_indices().nth(offset) {
        Some((byte, _)) => &line[byte..],
        None => "",
    }
}

/// 去掉描述符列的首字符和行尾注记字符
fn extract_descriptor(line: &str) -> std::result::Result<String, String> {
    let raw = column_from(line, DESCRIPTOR_COLUMN);
    let mut chars = raw.chars();
    if chars.next().is_none() || chars.next_back().is_none() {
        return Err("descriptor line is too short".to_string());
    }
    let text = chars.as_str().trim();
    if text.is_empty() {
        return Err("empty descriptor expression".to_string());
    }
    Ok(text.to_string())
}

fn parse_floats(text: &str) -> std::result::Result<Vec<f64>, String> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| format!("cannot parse '{}' as a number", tok))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SINGLE_TASK: &str = "\
 Total number of features in the space phi02:        1234
================================================================================
  1D descriptor (model): 
  RMSE and MaxAE:   0.284523  0.713190
@@@descriptor: 
                     25:[((chi_A*IE_B)/sqrt(r_s))]
       coefficients_001:     0.1234567890E+01
          Intercept_001:    -0.4567890123E+01
         RMSE,MaxAE_001:     0.2845230000E+00    0.7131900000E+00
================================================================================
  2D descriptor (model): 
  RMSE and MaxAE:   0.181598  0.467531
@@@descriptor: 
                     25:[((chi_A*IE_B)/sqrt(r_s))]
                    138:[(log(N_d)-exp-(E_gap))]
       coefficients_001:     0.1520000000E+01   -0.3300000000E+00
          Intercept_001:    -0.2100000000E+01
         RMSE,MaxAE_001:     0.1815980000E+00    0.4675310000E+00
================================================================================
";

    const MULTI_TASK: &str = "\
================================================================================
  2D descriptor (model): 
  RMSE and MaxAE:   0.120000  0.350000
@@@descriptor: 
                      7:[(feat_a+feat_b)]
                     42:[(feat_a*feat_b)]
       coefficients_001:     0.1000000000E+01    0.2000000000E+01
          Intercept_001:     0.5000000000E+00
         RMSE,MaxAE_001:     0.1000000000E+00    0.3000000000E+00
       coefficients_002:    -0.1000000000E+01    0.5000000000E+00
          Intercept_002:     0.3000000000E+01
         RMSE,MaxAE_002:     0.1100000000E+00    0.3200000000E+00
       coefficients_003:     0.2500000000E+00    0.7500000000E+00
          Intercept_003:    -0.1000000000E+01
         RMSE,MaxAE_003:     0.1300000000E+00    0.3500000000E+00
================================================================================
";

    #[test]
    fn test_parse_one_dimensional_model() {
        let model = parse_sisso_content(SINGLE_TASK, "SISSO.out", 1, 1).unwrap();
        assert_eq!(model.dimension, 1);
        assert_eq!(model.descriptors, vec!["((chi_A*IE_B)/sqrt(r_s))"]);
        assert_relative_eq!(model.training_rmse, 0.284523);
        assert_relative_eq!(model.training_max_ae, 0.713190);
        assert_eq!(model.fits.len(), 1);
        assert_relative_eq!(model.fits[0].coefficients[0], 1.23456789);
        assert_relative_eq!(model.fits[0].intercept, -4.567890123);
    }

    #[test]
    fn test_parse_two_dimensional_model() {
        let model = parse_sisso_content(SINGLE_TASK, "SISSO.out", 2, 1).unwrap();
        assert_eq!(
            model.descriptors,
            vec!["((chi_A*IE_B)/sqrt(r_s))", "(log(N_d)-exp-(E_gap))"]
        );
        assert_relative_eq!(model.training_rmse, 0.181598);
        assert_relative_eq!(model.training_max_ae, 0.467531);
        assert_eq!(model.fits[0].coefficients, vec![1.52, -0.33]);
        assert_relative_eq!(model.fits[0].intercept, -2.1);
    }

    #[test]
    fn test_parse_multi_task_blocks() {
        let model = parse_sisso_content(MULTI_TASK, "SISSO.out", 2, 3).unwrap();
        assert_eq!(model.descriptors, vec!["(feat_a+feat_b)", "(feat_a*feat_b)"]);
        assert_eq!(model.task_count(), 3);
        assert_eq!(model.fits[0].coefficients, vec![1.0, 2.0]);
        assert_relative_eq!(model.fits[0].intercept, 0.5);
        assert_eq!(model.fits[1].coefficients, vec![-1.0, 0.5]);
        assert_relative_eq!(model.fits[1].intercept, 3.0);
        assert_eq!(model.fits[2].coefficients, vec![0.25, 0.75]);
        assert_relative_eq!(model.fits[2].intercept, -1.0);
    }

    #[test]
    fn test_missing_marker() {
        let err = parse_sisso_content(SINGLE_TASK, "SISSO.out", 3, 1).unwrap_err();
        assert!(matches!(err, SissoError::FormatError { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_too_many_tasks_runs_off_block() {
        // 第二个任务读到分隔线，系数无法解析
        let err = parse_sisso_content(SINGLE_TASK, "SISSO.out", 2, 2).unwrap_err();
        match err {
            SissoError::FormatError { line, .. } => assert_eq!(line, 19),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncated_file() {
        let truncated: String = SINGLE_TASK.lines().take(6).collect::<Vec<_>>().join("\n");
        let err = parse_sisso_content(&truncated, "SISSO.out", 1, 1).unwrap_err();
        assert!(matches!(err, SissoError::FormatError { line: 7, .. }));
    }

    #[test]
    fn test_coefficient_count_mismatch() {
        let broken = MULTI_TASK.replace(
            "     0.1000000000E+01    0.2000000000E+01",
            "     0.1000000000E+01",
        );
        let err = parse_sisso_content(&broken, "SISSO.out", 2, 1).unwrap_err();
        assert!(matches!(err, SissoError::FormatError { line: 7, .. }));
    }

    #[test]
    fn test_available_dimensions() {
        assert_eq!(available_dimensions(SINGLE_TASK), vec![1, 2]);
        assert_eq!(available_dimensions(MULTI_TASK), vec![2]);
    }

    #[test]
    fn test_column_from_short_line() {
        assert_eq!(column_from("short", 24), "");
        assert_eq!(column_from("abcdef", 2), "cdef");
    }
}
