//! # 结果日志
//!
//! 追加写入的纯文本结果日志，每条记录一行：`label  v1  v2 ...`（两个空格分隔）。
//! 浮点数保留 4 位小数并以最短形式输出。
//!
//! ## 依赖关系
//! - 被 `commands/validate.rs`, `commands/sweep.rs` 使用
//! - 使用 `models/report.rs`

use crate::error::{Result, SissoError};
use crate::models::ValidationReport;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

const SEPARATOR: &str = "  ";

/// 结果记录的去处
pub trait ResultSink {
    /// 写入一条完整记录
    fn write_record(&mut self, label: &str, fields: &[String]) -> Result<()>;
}

/// 内存中的记录，按写入顺序
impl ResultSink for Vec<String> {
    fn write_record(&mut self, label: &str, fields: &[String]) -> Result<()> {
        self.push(record_line(label, fields));
        Ok(())
    }
}

/// 追加写入的结果日志文件
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultSink for ResultsLog {
    fn write_record(&mut self, label: &str, fields: &[String]) -> Result<()> {
        let write_err = |e: std::io::Error| SissoError::FileWriteError {
            path: self.path.display().to_string(),
            source: e,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        // 整行一次写入
        let mut line = record_line(label, fields);
        line.push('\n');
        file.write_all(line.as_bytes()).map_err(write_err)
    }
}

/// 拼接一条记录（不含换行）
pub fn record_line(label: &str, fields: &[String]) -> String {
    let mut line = String::from(label);
    for field in fields {
        line.push_str(SEPARATOR);
        line.push_str(field);
    }
    line
}

/// 四舍五入到 4 位小数，输出最短形式（整数值保留 `.0`）
pub fn format_value(value: f64) -> String {
    let rounded = (value * 1e4).round() / 1e4;
    // -0.0 统一为 0.0
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = rounded.to_string();
    if rounded.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// `val/{label}  rmse  maxae`
pub fn write_validation(sink: &mut dyn ResultSink, label: &str, report: &ValidationReport) -> Result<()> {
    sink.write_record(
        &format!("val/{}", label),
        &[format_value(report.rmse), format_value(report.max_ae)],
    )
}

/// 每个误差最大样本一行：`opt/{label}  sample  abs_err`
pub fn write_offenders(sink: &mut dyn ResultSink, label: &str, offenders: &[(String, f64)]) -> Result<()> {
    let record = format!("opt/{}", label);
    for (sample, error) in offenders {
        sink.write_record(&record, &[sample.clone(), format_value(*error)])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(rmse: f64, max_ae: f64) -> ValidationReport {
        ValidationReport {
            rmse,
            max_ae,
            max_ae_sample: "s1".to_string(),
            max_ae_line: 2,
            samples: 3,
            skipped: 0,
            worst_offenders: None,
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(2.160246899469287), "2.1602");
        assert_eq!(format_value(0.123456), "0.1235");
        assert_eq!(format_value(3.0), "3.0");
        assert_eq!(format_value(0.1), "0.1");
        assert_eq!(format_value(-0.00001), "0.0");
        assert_eq!(format_value(-1.25), "-1.25");
    }

    #[test]
    fn test_record_layout() {
        let mut sink: Vec<String> = Vec::new();
        write_validation(&mut sink, "O_OH_0r_2d", &report(2.160246899469287, 3.0)).unwrap();
        write_offenders(
            &mut sink,
            "O_OH_0r_2d",
            &[("Pt111".to_string(), 3.0), ("Cu100".to_string(), 0.52)],
        )
        .unwrap();
        assert_eq!(
            sink,
            vec![
                "val/O_OH_0r_2d  2.1602  3.0",
                "opt/O_OH_0r_2d  Pt111  3.0",
                "opt/O_OH_0r_2d  Cu100  0.52",
            ]
        );
    }

    #[test]
    fn test_results_log_appends() {
        let dir = std::env::temp_dir().join(format!("sissoval_log_{}", std::process::id()));
        let path = dir.join("nested").join("SISSO");
        let _ = fs::remove_dir_all(&dir);

        let mut log = ResultsLog::new(&path);
        log.write_record("val/a", &["1.0".to_string()]).unwrap();
        log.write_record("val/b", &["2.0".to_string(), "3.0".to_string()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "val/a  1.0\nval/b  2.0  3.0\n");
        let _ = fs::remove_dir_all(&dir);
    }
}
