//! # 验证结果数据模型
//!
//! 单样本预测记录与一次验证运行的汇总报告。
//!
//! ## 依赖关系
//! - 被 `validation/` 构造
//! - 被 `commands/` 和 `utils/results_log.rs` 使用

use serde::Serialize;

/// 单个样本的预测结果（同时作为 CSV 导出行）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub sample_id: String,
    pub line: usize,
    /// 所用任务序号（0 起）
    pub task: usize,
    pub observed: f64,
    pub predicted: f64,
    /// predicted - observed
    pub residual: f64,
}

impl Prediction {
    pub fn abs_error(&self) -> f64 {
        self.residual.abs()
    }
}

/// 一次验证运行的汇总
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// 残差均方根
    pub rmse: f64,

    /// 最大绝对残差
    pub max_ae: f64,

    /// 最大误差样本名
    pub max_ae_sample: String,

    /// 最大误差样本所在文件行
    pub max_ae_line: usize,

    /// 参与统计的样本数
    pub samples: usize,

    /// 因求值失败被跳过的行数
    pub skipped: usize,

    /// 按绝对误差降序的 (样本名, |残差|)，仅最优维度才生成
    pub worst_offenders: Option<Vec<(String, f64)>>,
}
