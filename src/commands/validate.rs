//! # validate 命令实现
//!
//! 验证单个 SISSO 模型。
//!
//! ## 功能
//! - 读取指定维度的模型（可选 mixID 或多任务路由）
//! - 逐样本预测并汇总 RMSE / MaxAE
//! - 终端表格显示误差最大样本
//! - 可选导出预测 CSV、追加结果日志
//!
//! ## 依赖关系
//! - 使用 `cli/validate.rs` 定义的参数
//! - 使用 `parsers/`, `validation/`, `utils/results_log.rs`

use crate::cli::validate::ValidateArgs;
use crate::config::{parse_boundaries, split_names};
use crate::error::{Result, SissoError};
use crate::models::{Prediction, SissoModel, ValidationSet};
use crate::parsers::{parse_sisso_file, read_validation_file, resolve_model_path};
use crate::utils::output;
use crate::utils::results_log::{self, ResultsLog};
use crate::validation::{RowPolicy, TaskRouter, ValidationOutcome, ValidationRunner};

use std::path::Path;
use tabled::{Table, Tabled};

/// 误差排行行
#[derive(Debug, Clone, Tabled)]
struct OffenderRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Sample")]
    sample: String,
    #[tabled(rename = "Line")]
    line: usize,
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "Observed")]
    observed: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
    #[tabled(rename = "|Error|")]
    error: String,
}

/// 执行 validate 命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    output::print_header("SISSO Model Validation");

    let model_path = resolve_model_path(&args.model);
    let task_names = args.tasks.as_deref().map(split_names);

    // 需要读取的系数块数
    let task_count = match (&task_names, args.mix_id) {
        (Some(names), _) => names.len().max(1),
        (None, Some(mix_id)) => mix_id.max(1),
        (None, None) => 1,
    };

    let model = parse_sisso_file(&model_path, args.dimension, task_count)?;
    output::print_info(&format!(
        "Loaded {}D model from '{}' (training RMSE {:.6}, MaxAE {:.6})",
        model.dimension,
        model_path.display(),
        model.training_rmse,
        model.training_max_ae
    ));
    for (i, descriptor) in model.descriptors.iter().enumerate() {
        log::info!("d{} = {}", i + 1, descriptor);
    }

    let model = match args.mix_id {
        Some(mix_id) => select_mix_id(&model, mix_id)?,
        None => model,
    };

    let data = read_validation_file(&args.data, args.skip_bad_rows)?;
    report_dropped(&data);
    output::print_info(&format!(
        "Loaded {} samples from '{}'",
        data.len(),
        args.data.display()
    ));

    let policy = if args.skip_bad_rows {
        RowPolicy::Skip
    } else {
        RowPolicy::Abort
    };
    let mut runner = ValidationRunner::new(&model, &data.header)?.with_policy(policy);

    if let Some(names) = &task_names {
        let boundaries = parse_boundaries(args.boundaries.as_deref().unwrap_or(""))?;
        let router = TaskRouter::new(names, &boundaries)?;
        let scored = match &args.score {
            Some(score) => Some(task_indices(&router, &split_names(score))?),
            None => None,
        };
        runner = runner.with_router(router)?;
        if let Some(tasks) = scored {
            runner = runner.with_scored_tasks(tasks);
        }
    }

    let outcome = runner.run(&data)?;
    print_report(&outcome, task_names.as_deref(), args.top);

    if let Some(csv_path) = &args.predictions {
        save_predictions_csv(&outcome.predictions, csv_path)?;
        output::print_success(&format!("Predictions saved to '{}'", csv_path.display()));
    }

    if let Some(results) = &args.results {
        let label = args
            .label
            .clone()
            .unwrap_or_else(|| default_label(&args.model, args.dimension));
        let mut log = ResultsLog::new(results);
        results_log::write_validation(&mut log, &label, &outcome.report)?;
        output::print_success(&format!("Appended 'val/{}' to '{}'", label, results.display()));
    }

    Ok(())
}

/// 按 mixID 取出单个系数块
fn select_mix_id(model: &SissoModel, mix_id: usize) -> Result<SissoModel> {
    model.for_mix_id(mix_id).ok_or_else(|| {
        SissoError::InvalidArgument(format!(
            "mix id {} is out of range ({} coefficient blocks)",
            mix_id,
            model.task_count()
        ))
    })
}

/// 任务名到序号
fn task_indices(router: &TaskRouter, selected: &[String]) -> Result<Vec<usize>> {
    selected
        .iter()
        .map(|s| {
            router.task_index(s).ok_or_else(|| {
                let known: Vec<&str> = router.ranges().iter().map(|r| r.name.as_str()).collect();
                SissoError::InvalidArgument(format!(
                    "unknown task '{}' (tasks: {})",
                    s,
                    known.join(" ")
                ))
            })
        })
        .collect()
}

/// 宽松模式下丢弃的行
pub(crate) fn report_dropped(data: &ValidationSet) {
    if data.dropped.is_empty() {
        return;
    }
    output::print_warning(&format!(
        "Dropped {} malformed row(s) from '{}'",
        data.dropped.len(),
        data.path
    ));
    for (line, reason) in data.dropped.iter().take(10) {
        output::print_skip(&format!("line {}: {}", line, reason));
    }
}

/// 模型目录名作为默认标签
fn default_label(model: &Path, dimension: usize) -> String {
    let dir = if model.is_dir() {
        Some(model)
    } else {
        model.parent()
    };
    dir.and_then(|d| d.file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("model_{}d", dimension))
}

/// 参与统计的预测，按 |残差| 降序（并列保持文件顺序）
fn ranked_predictions(outcome: &ValidationOutcome) -> Vec<&Prediction> {
    let mut ranked: Vec<&Prediction> = outcome
        .scored
        .iter()
        .map(|&i| &outcome.predictions[i])
        .collect();
    ranked.sort_by(|a, b| {
        b.abs_error()
            .partial_cmp(&a.abs_error())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

fn print_report(outcome: &ValidationOutcome, task_names: Option<&[String]>, top: usize) {
    let report = &outcome.report;

    if !outcome.skipped.is_empty() {
        output::print_warning(&format!("Skipped {} row(s) that failed to evaluate", report.skipped));
        for (sample, line, reason) in outcome.skipped.iter().take(10) {
            output::print_skip(&format!("{} (line {}): {}", sample, line, reason));
        }
    }

    let rows: Vec<OffenderRow> = ranked_predictions(outcome)
        .into_iter()
        .take(top)
        .enumerate()
        .map(|(i, p)| OffenderRow {
            rank: i + 1,
            sample: p.sample_id.clone(),
            line: p.line,
            task: task_names
                .and_then(|names| names.get(p.task))
                .cloned()
                .unwrap_or_else(|| "-".to_string()),
            observed: format!("{:.4}", p.observed),
            predicted: format!("{:.4}", p.predicted),
            error: format!("{:.4}", p.abs_error()),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("Top {} Samples by Absolute Error", rows.len()));
        println!("{}", Table::new(&rows));
    }

    output::print_separator();
    output::print_success(&format!(
        "{} samples: RMSE {:.6}, MaxAE {:.6} ({} at line {})",
        report.samples, report.rmse, report.max_ae, report.max_ae_sample, report.max_ae_line
    ));
}

/// 保存逐样本预测到 CSV
fn save_predictions_csv(predictions: &[Prediction], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for p in predictions {
        wtr.serialize(p)?;
    }

    wtr.flush().map_err(|e| SissoError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
