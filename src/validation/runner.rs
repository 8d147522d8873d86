//! # 验证执行器
//!
//! 对验证集的每一行：求出所有描述符的值，选取该行所属任务的系数，
//! 计算预测值与残差，最后汇总为 `ValidationReport`。
//!
//! ## 依赖关系
//! - 被 `commands/validate.rs`, `commands/sweep.rs` 使用
//! - 使用 `expr/` 求值描述符
//! - 使用 `validation/routing.rs`, `validation/stats.rs`

use super::routing::TaskRouter;
use super::stats;
use crate::error::{Result, SissoError};
use crate::expr::{FeatureExpression, FeatureTable};
use crate::models::{Prediction, SissoModel, ValidationReport, ValidationSample, ValidationSet};

/// 行求值失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// 终止当前组合
    #[default]
    Abort,
    /// 跳过该行，不计入统计
    Skip,
}

/// 被跳过的行：(样本名, 文件行号, 原因)
pub type SkippedRow = (String, usize, String);

/// 一次验证的完整结果
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// 所有成功预测的样本，按文件顺序
    pub predictions: Vec<Prediction>,
    /// 参与统计的预测下标
    pub scored: Vec<usize>,
    pub skipped: Vec<SkippedRow>,
    pub report: ValidationReport,
}

impl ValidationOutcome {
    /// 计算并附加误差最大样本列表（最优维度才需要）
    pub fn attach_worst_offenders(&mut self) {
        let scored: Vec<&Prediction> = self.scored.iter().map(|&i| &self.predictions[i]).collect();
        self.report.worst_offenders = Some(stats::worst_offenders(&scored));
    }
}

/// 验证执行器
pub struct ValidationRunner<'m> {
    model: &'m SissoModel,
    header: Vec<String>,
    descriptors: Vec<FeatureExpression>,
    /// 所有描述符引用到的列（去重）
    columns: Vec<usize>,
    router: Option<TaskRouter>,
    scored_tasks: Option<Vec<usize>>,
    policy: RowPolicy,
}

impl<'m> ValidationRunner<'m> {
    /// 针对验证集表头编译模型的全部描述符
    pub fn new(model: &'m SissoModel, header: &[String]) -> Result<Self> {
        if model.fits.is_empty() {
            return Err(SissoError::Other("model has no coefficient block".to_string()));
        }

        let table = FeatureTable::new(header);
        let descriptors = model
            .descriptors
            .iter()
            .map(|d| FeatureExpression::compile(d, &table))
            .collect::<Result<Vec<_>>>()?;
        for d in &descriptors {
            log::debug!("compiled '{}' (columns {:?})", d.text(), d.columns());
        }

        let mut columns: Vec<usize> = descriptors
            .iter()
            .flat_map(|d| d.columns().iter().copied())
            .collect();
        columns.sort_unstable();
        columns.dedup();

        Ok(ValidationRunner {
            model,
            header: header.to_vec(),
            descriptors,
            columns,
            router: None,
            scored_tasks: None,
            policy: RowPolicy::default(),
        })
    }

    /// 启用多任务路由
    pub fn with_router(mut self, router: TaskRouter) -> Result<Self> {
        for range in router.ranges() {
            if !range.is_empty() && range.task >= self.model.fits.len() {
                return Err(SissoError::ConfigError(format!(
                    "task '{}' has no coefficient block in the model ({} found)",
                    range.name,
                    self.model.fits.len()
                )));
            }
        }
        self.router = Some(router);
        Ok(self)
    }

    /// 只统计指定任务的样本
    pub fn with_scored_tasks(mut self, tasks: Vec<usize>) -> Self {
        self.scored_tasks = Some(tasks);
        self
    }

    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 单个样本的预测
    pub fn predict(&self, sample: &ValidationSample) -> Result<Prediction> {
        let task = match &self.router {
            Some(router) => router.route(sample.row)?,
            None => 0,
        };

        let row_failed = |reason: String| SissoError::RowFailed {
            sample: sample.sample_id.clone(),
            line: sample.line,
            reason,
        };

        // 只解析被引用的列，其余保持 NaN
        let mut row = vec![f64::NAN; self.header.len()];
        for &col in &self.columns {
            let text = sample.value(col).unwrap_or("");
            row[col] = text.parse().map_err(|_| {
                row_failed(format!(
                    "feature '{}' has non-numeric value '{}'",
                    self.header[col], text
                ))
            })?;
        }

        let values = self
            .descriptors
            .iter()
            .map(|d| d.evaluate(&row))
            .collect::<Result<Vec<f64>>>()
            .map_err(|e| row_failed(e.to_string()))?;

        let predicted = self.model.fits[task].predict(&values);
        let residual = predicted - sample.observed_value;
        log::debug!(
            "{} (task {}): descriptors {:?} predicted {:.6} observed {:.6}",
            sample.sample_id,
            task,
            values,
            predicted,
            sample.observed_value
        );

        Ok(Prediction {
            sample_id: sample.sample_id.clone(),
            line: sample.line,
            task,
            observed: sample.observed_value,
            predicted,
            residual,
        })
    }

    /// 验证整个数据集
    pub fn run(&self, data: &ValidationSet) -> Result<ValidationOutcome> {
        let mut predictions = Vec::with_capacity(data.len());
        let mut skipped = Vec::new();

        for sample in &data.samples {
            match self.predict(sample) {
                Ok(p) => predictions.push(p),
                Err(SissoError::RowFailed {
                    sample,
                    line,
                    reason,
                }) if self.policy == RowPolicy::Skip => {
                    log::warn!("skipping sample '{}' (line {}): {}", sample, line, reason);
                    skipped.push((sample, line, reason));
                }
                Err(e) => return Err(e),
            }
        }

        let scored: Vec<usize> = predictions
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                self.scored_tasks
                    .as_ref()
                    .map_or(true, |tasks| tasks.contains(&p.task))
            })
            .map(|(i, _)| i)
            .collect();

        let residuals: Vec<f64> = scored.iter().map(|&i| predictions[i].residual).collect();
        let (rmse, (max_idx, max_ae)) = match (stats::rmse(&residuals), stats::max_abs(&residuals)) {
            (Some(rmse), Some(max)) => (rmse, max),
            _ => {
                return Err(SissoError::DataError {
                    path: data.path.clone(),
                    line: 0,
                    reason: "no samples left to score".to_string(),
                })
            }
        };
        let worst = &predictions[scored[max_idx]];

        let report = ValidationReport {
            rmse,
            max_ae,
            max_ae_sample: worst.sample_id.clone(),
            max_ae_line: worst.line,
            samples: scored.len(),
            skipped: skipped.len(),
            worst_offenders: None,
        };

        Ok(ValidationOutcome {
            predictions,
            scored,
            skipped,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskFit;
    use crate::parsers::dataset::parse_validation_content;
    use approx::assert_relative_eq;

    const DATA: &str = "\
materials  dG  feat_a  feat_b
s1         4.0  1.0     1.0
s2         9.0  2.0     1.0
s3         1.0  0.0     3.0
s4         2.0  1.0     2.0
";

    fn model(fits: Vec<TaskFit>) -> SissoModel {
        SissoModel {
            dimension: 2,
            descriptors: vec!["(feat_a+feat_b)".to_string(), "(feat_a*feat_b)".to_string()],
            fits,
            training_rmse: 0.0,
            training_max_ae: 0.0,
        }
    }

    fn data() -> ValidationSet {
        parse_validation_content(DATA, "validation_data", false).unwrap()
    }

    #[test]
    fn test_single_task_residuals() {
        // predicted = (a+b) + 2ab + 0.5
        let model = model(vec![TaskFit::new(vec![1.0, 2.0], 0.5)]);
        let data = data();
        let outcome = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .run(&data)
            .unwrap();

        let residuals: Vec<f64> = outcome.predictions.iter().map(|p| p.residual).collect();
        // s1: 2+2+0.5-4 = 0.5, s2: 3+4+0.5-9 = -1.5, s3: 3+0+0.5-1 = 2.5, s4: 3+4+0.5-2 = 5.5
        assert_eq!(residuals, vec![0.5, -1.5, 2.5, 5.5]);

        let expected_rmse = ((0.25 + 2.25 + 6.25 + 30.25) / 4.0f64).sqrt();
        assert_relative_eq!(outcome.report.rmse, expected_rmse, epsilon = 1e-12);
        assert_relative_eq!(outcome.report.max_ae, 5.5);
        assert_eq!(outcome.report.max_ae_sample, "s4");
        assert_eq!(outcome.report.max_ae_line, 5);
        assert_eq!(outcome.report.samples, 4);
        assert!(outcome.report.worst_offenders.is_none());
    }

    #[test]
    fn test_routed_tasks_use_their_coefficients() {
        let model = model(vec![
            TaskFit::new(vec![1.0, 0.0], 0.0),
            TaskFit::new(vec![0.0, 1.0], 0.0),
            TaskFit::new(vec![0.0, 0.0], 100.0),
        ]);
        let data = data();
        let names: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let router = TaskRouter::new(&names, &[2, 5]).unwrap();
        let runner = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .with_router(router)
            .unwrap();

        let outcome = runner.run(&data).unwrap();
        let tasks: Vec<usize> = outcome.predictions.iter().map(|p| p.task).collect();
        assert_eq!(tasks, vec![0, 1, 1, 1]);
        // s1 用 A：a+b = 2；s3 用 B：a*b = 0
        assert_eq!(outcome.predictions[0].predicted, 2.0);
        assert_eq!(outcome.predictions[2].predicted, 0.0);
    }

    #[test]
    fn test_scored_subset() {
        let model = model(vec![
            TaskFit::new(vec![1.0, 0.0], 0.0),
            TaskFit::new(vec![0.0, 1.0], 0.0),
        ]);
        let data = data();
        let names: Vec<String> = ["O", "OH"].iter().map(|s| s.to_string()).collect();
        let outcome = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .with_router(TaskRouter::new(&names, &[2, 5]).unwrap())
            .unwrap()
            .with_scored_tasks(vec![1])
            .run(&data)
            .unwrap();
        assert_eq!(outcome.predictions.len(), 4);
        assert_eq!(outcome.report.samples, 3);
        assert_eq!(outcome.scored, vec![1, 2, 3]);
    }

    #[test]
    fn test_row_outside_boundaries_aborts() {
        let model = model(vec![TaskFit::new(vec![1.0, 0.0], 0.0); 2]);
        let data = data();
        let names: Vec<String> = ["O", "OH"].iter().map(|s| s.to_string()).collect();
        let err = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .with_router(TaskRouter::new(&names, &[2, 4]).unwrap())
            .unwrap()
            .run(&data)
            .unwrap_err();
        assert!(matches!(err, SissoError::RoutingError { row: 4 }));
    }

    #[test]
    fn test_router_needs_coefficient_blocks() {
        let model = model(vec![TaskFit::new(vec![1.0, 0.0], 0.0)]);
        let data = data();
        let names: Vec<String> = ["O", "OH"].iter().map(|s| s.to_string()).collect();
        let result = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .with_router(TaskRouter::new(&names, &[2, 5]).unwrap());
        assert!(matches!(result, Err(SissoError::ConfigError(_))));
    }

    #[test]
    fn test_evaluation_failure_policy() {
        let mut model = model(vec![TaskFit::new(vec![1.0, 1.0], 0.0)]);
        model.descriptors[1] = "log(feat_a)".to_string();
        let data = data();

        // s3 的 feat_a = 0，log 定义域错误
        let err = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .run(&data)
            .unwrap_err();
        assert!(matches!(err, SissoError::RowFailed { line: 4, .. }));

        let outcome = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .with_policy(RowPolicy::Skip)
            .run(&data)
            .unwrap();
        assert_eq!(outcome.report.samples, 3);
        assert_eq!(outcome.report.skipped, 1);
        assert_eq!(outcome.skipped[0].0, "s3");
    }

    #[test]
    fn test_non_numeric_feature_is_row_failure() {
        let model = model(vec![TaskFit::new(vec![1.0, 1.0], 0.0)]);
        let data = parse_validation_content(
            &DATA.replace("s2         9.0  2.0", "s2         9.0  n/a"),
            "validation_data",
            false,
        )
        .unwrap();
        let err = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .run(&data)
            .unwrap_err();
        assert!(matches!(err, SissoError::RowFailed { line: 3, .. }));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let model = model(vec![TaskFit::new(vec![0.3, -1.7], 0.25)]);
        let data = data();
        let runner = ValidationRunner::new(&model, &data.header).unwrap();

        let mut first = runner.run(&data).unwrap();
        let mut second = runner.run(&data).unwrap();
        first.attach_worst_offenders();
        second.attach_worst_offenders();
        assert_eq!(first.report, second.report);
        assert_eq!(first.predictions, second.predictions);

        let fresh = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .run(&data)
            .unwrap();
        assert_eq!(fresh.predictions, first.predictions);
    }

    #[test]
    fn test_worst_offenders_attached() {
        let model = model(vec![TaskFit::new(vec![1.0, 2.0], 0.5)]);
        let data = data();
        let mut outcome = ValidationRunner::new(&model, &data.header)
            .unwrap()
            .run(&data)
            .unwrap();
        outcome.attach_worst_offenders();
        let worst = outcome.report.worst_offenders.unwrap();
        let ids: Vec<&str> = worst.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["s4", "s3", "s2", "s1"]);
    }

    #[test]
    fn test_unknown_feature_fails_compilation() {
        let mut model = model(vec![TaskFit::new(vec![1.0, 1.0], 0.0)]);
        model.descriptors[0] = "(feat_c+1)".to_string();
        let data = data();
        assert!(matches!(
            ValidationRunner::new(&model, &data.header),
            Err(SissoError::UnknownFeature { .. })
        ));
    }
}
