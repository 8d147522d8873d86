//! # sweep 命令实现
//!
//! 按配置对每个 (rung, dimension) 组合验证模型并写入结果日志。
//!
//! ## 功能
//! - INI 配置 + 命令行覆盖
//! - 固定范围或自动发现模型目录
//! - 组合之间相互隔离：失败被记录，扫描继续（`--fail-fast` 除外）
//! - 每个 rung 结束后写出最优维度的误差排行
//! - 可并行，结果按扫描顺序写出
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `config.rs`, `batch/`, `parsers/`, `validation/`
//! - 使用 `utils/output.rs`, `utils/results_log.rs`

use crate::batch::{BatchResult, BatchRunner, ModelCollector, ProcessResult};
use crate::cli::sweep::SweepArgs;
use crate::commands::validate::report_dropped;
use crate::config::{self, SweepConfig, DEFAULT_CONFIG};
use crate::error::{Result, SissoError};
use crate::models::{ValidationReport, ValidationSet};
use crate::parsers::{parse_sisso_file, read_validation_file};
use crate::parsers::sisso_out::SISSO_OUT;
use crate::utils::output;
use crate::utils::results_log::{self, ResultSink, ResultsLog};
use crate::validation::{RowPolicy, TaskRouter, ValidationOutcome, ValidationRunner};

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 一个待验证的组合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub rung: usize,
    pub dimension: usize,
    pub label: String,
    pub model_path: PathBuf,
}

/// 汇总表行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "RMSE")]
    rmse: String,
    #[tabled(rename = "MaxAE")]
    max_ae: String,
    #[tabled(rename = "Worst sample")]
    worst: String,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
}

/// 扫描结果
#[derive(Debug, Default)]
pub struct SweepSummary {
    pub batch: BatchResult,
    /// 成功组合的 (标签, 报告)，按扫描顺序
    pub reports: Vec<(String, ValidationReport)>,
}

/// 执行 sweep 命令
pub fn execute(args: SweepArgs) -> Result<()> {
    output::print_header("SISSO Validation Sweep");

    let config = load_config(&args)?;
    config.validate()?;
    log::debug!("{:?}", config);

    output::print_info(&format!(
        "Models '{}' under '{}', data '{}'",
        config.root_name,
        config.pathway.display(),
        config.val_name.display()
    ));

    let mut log = ResultsLog::new(&config.results);
    let summary = run_sweep(&config, &mut log)?;

    print_summary(&summary);
    output::print_info(&format!("Results appended to '{}'", config.results.display()));

    Ok(())
}

/// 读取配置文件并应用命令行覆盖
fn load_config(args: &SweepArgs) -> Result<SweepConfig> {
    let mut config = if args.config.exists() {
        output::print_info(&format!("Using configuration '{}'", args.config.display()));
        SweepConfig::from_ini_file(&args.config)?
    } else if args.config == Path::new(DEFAULT_CONFIG) && args.root_name.is_some() {
        // 没有配置文件时完全由命令行给出
        SweepConfig::default()
    } else {
        return Err(SissoError::FileNotFound {
            path: args.config.display().to_string(),
        });
    };

    if let Some(pathway) = &args.pathway {
        config.pathway = pathway.clone();
    }
    if let Some(data) = &args.data {
        config.val_name = data.clone();
    }
    if let Some(root_name) = &args.root_name {
        config.root_name = root_name.clone();
    }
    if let Some(opt) = args.opt_dimension {
        config.opt_dimension = opt;
    }
    if let Some(tasks) = &args.tasks {
        config.type_ads = config::split_names(tasks);
    }
    if let Some(boundaries) = &args.boundaries {
        config.length_ads = config::parse_boundaries(boundaries)?;
    }
    if let Some(rungs) = &args.rungs {
        config.rungs = config::parse_index_list(rungs)?;
    }
    if let Some(dimensions) = &args.dimensions {
        config.dimensions = config::parse_index_list(dimensions)?;
    }
    if let Some(results) = &args.results {
        config.results = results.clone();
    }
    if let Some(score) = &args.score {
        config.score_ads = Some(config::split_names(score));
    }

    config.discover |= args.discover;
    config.recursive |= args.recursive;
    config.fail_fast |= args.fail_fast;
    config.skip_bad_rows |= args.skip_bad_rows;
    config.jobs = args.jobs;

    Ok(config)
}

/// 按扫描顺序列出组合
pub fn plan_combinations(config: &SweepConfig) -> Result<Vec<Combination>> {
    if config.discover {
        let found = ModelCollector::new(config.pathway.clone(), &config.root_name)
            .recursive(config.recursive)
            .collect()?;
        return Ok(found
            .into_iter()
            .map(|m| Combination {
                rung: m.rung,
                dimension: m.dimension,
                label: config.label(m.rung, m.dimension),
                model_path: m.path.join(SISSO_OUT),
            })
            .collect());
    }

    let mut combos = Vec::with_capacity(config.rungs.len() * config.dimensions.len());
    for &rung in &config.rungs {
        for &dimension in &config.dimensions {
            combos.push(Combination {
                rung,
                dimension,
                label: config.label(rung, dimension),
                model_path: config.model_dir(rung, dimension).join(SISSO_OUT),
            });
        }
    }
    Ok(combos)
}

/// 验证一个组合
fn validate_combination(
    config: &SweepConfig,
    combo: &Combination,
    data: &ValidationSet,
    router: Option<&TaskRouter>,
    scored: Option<&[usize]>,
) -> Result<ValidationOutcome> {
    let model = parse_sisso_file(&combo.model_path, combo.dimension, config.task_count())?;

    let policy = if config.skip_bad_rows {
        RowPolicy::Skip
    } else {
        RowPolicy::Abort
    };
    let mut runner = ValidationRunner::new(&model, &data.header)?.with_policy(policy);
    if let Some(router) = router {
        runner = runner.with_router(router.clone())?;
    }
    if let Some(tasks) = scored {
        runner = runner.with_scored_tasks(tasks.to_vec());
    }

    let outcome = runner.run(data)?;
    log::info!(
        "{}: {} samples, RMSE {:.6}, MaxAE {:.6}",
        combo.label,
        outcome.report.samples,
        outcome.report.rmse,
        outcome.report.max_ae
    );
    Ok(outcome)
}

/// 执行扫描，把记录写入 `sink`
///
/// 致命错误（缺失或不可读的文件、结果日志、配置）直接返回，之后的组合不再验证；
/// 其他错误只使当前组合失败，除非 `fail_fast`。
pub fn run_sweep(config: &SweepConfig, sink: &mut dyn ResultSink) -> Result<SweepSummary> {
    let combos = plan_combinations(config)?;
    if combos.is_empty() {
        output::print_warning(&format!(
            "No model directories matching '{}_<rung>r_<dim>d' under '{}'",
            config.root_name,
            config.pathway.display()
        ));
        return Ok(SweepSummary::default());
    }
    output::print_info(&format!("{} combination(s) to validate", combos.len()));

    // 数据只读一次，所有组合共享
    let data = read_validation_file(&config.val_name, config.skip_bad_rows)?;
    report_dropped(&data);

    let router = config.router()?;
    let scored = config.score_tasks()?;

    // 致命错误或 fail_fast 下的首个失败之后不再验证后续组合
    let halts = |outcome: &Result<ValidationOutcome>| match outcome {
        Err(e) => e.is_fatal() || config.fail_fast,
        Ok(_) => false,
    };
    let runner = BatchRunner::new(config.jobs);
    let outcomes = runner.run_until(
        &combos,
        "Validating",
        |combo| validate_combination(config, combo, &data, router.as_ref(), scored.as_deref()),
        halts,
    )?;

    let mut summary = SweepSummary::default();
    let mut opt_offenders: Option<(String, Vec<(String, f64)>)> = None;

    for (i, (combo, outcome)) in combos.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(mut outcome) => {
                results_log::write_validation(sink, &combo.label, &outcome.report)?;
                output::print_combination(&combo.label, outcome.report.rmse, outcome.report.max_ae);
                if outcome.report.skipped > 0 {
                    output::print_warning(&format!(
                        "{}: skipped {} row(s)",
                        combo.label, outcome.report.skipped
                    ));
                }

                if combo.dimension == config.opt_dimension {
                    outcome.attach_worst_offenders();
                    if let Some(worst) = outcome.report.worst_offenders.clone() {
                        opt_offenders = Some((combo.label.clone(), worst));
                    }
                }

                summary.batch.merge(ProcessResult::Success(combo.label.clone()));
                summary.reports.push((combo.label.clone(), outcome.report));
            }
            Err(e) if e.is_fatal() || config.fail_fast => {
                output::print_failure(&combo.label, &e.to_string());
                return Err(e);
            }
            Err(e) => {
                output::print_failure(&combo.label, &e.to_string());
                summary
                    .batch
                    .merge(ProcessResult::Failed(combo.label.clone(), e.to_string()));
            }
        }

        // rung 的最后一个组合之后写出最优维度排行
        let rung_done = combos.get(i + 1).map_or(true, |next| next.rung != combo.rung);
        if rung_done {
            if let Some((label, worst)) = opt_offenders.take() {
                results_log::write_offenders(sink, &label, &worst)?;
            }
        }
    }

    Ok(summary)
}

fn print_summary(summary: &SweepSummary) {
    if !summary.reports.is_empty() {
        let rows: Vec<SummaryRow> = summary
            .reports
            .iter()
            .map(|(label, r)| SummaryRow {
                model: label.clone(),
                rmse: format!("{:.4}", r.rmse),
                max_ae: format!("{:.4}", r.max_ae),
                worst: format!("{} (line {})", r.max_ae_sample, r.max_ae_line),
                samples: r.samples,
                skipped: r.skipped,
            })
            .collect();
        output::print_header("Validation Summary");
        println!("{}", Table::new(&rows));
    }

    let batch = &summary.batch;
    output::print_separator();
    output::print_success(&format!(
        "Sweep complete: {} combination(s), {} validated, {} failed",
        batch.total(),
        batch.success,
        batch.failed
    ));

    if !batch.failures.is_empty() {
        output::print_warning("Failed combinations:");
        for (label, err) in batch.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", label, err));
        }
        if batch.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", batch.failures.len() - 10));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{scratch_dir, MULTI_TASK_OUT, VALIDATION_DATA};
    use std::fs;

    /// 2d 模型有效，1d 目录缺少 1D 模型块
    fn setup(name: &str) -> (PathBuf, SweepConfig) {
        let dir = scratch_dir(name);
        for label in ["X_0r_1d", "X_0r_2d", "X_1r_1d", "X_1r_2d"] {
            let model_dir = dir.join(label);
            fs::create_dir_all(&model_dir).unwrap();
            fs::write(model_dir.join(SISSO_OUT), MULTI_TASK_OUT).unwrap();
        }
        fs::write(dir.join("validation_data"), VALIDATION_DATA).unwrap();

        let content = format!(
            "[root]\npathway = {}\nval_name = {}\nroot_name = X\nopt_dimension = 2\n\
             type_ads = O OH OOH\nlength_ads = 2 4 6\nrungs = 0-1\ndimensions = 1-2\n",
            dir.display(),
            dir.join("validation_data").display()
        );
        let config = SweepConfig::from_ini_str(&content, "config_validation").unwrap();
        (dir, config)
    }

    const EXPECTED_OPT: [&str; 5] = [
        "  s4  2.0",
        "  s2  1.0",
        "  s1  0.5",
        "  s5  0.25",
        "  s3  0.0",
    ];

    fn expected_log() -> Vec<String> {
        let mut lines = vec!["val/X_0r_2d  1.0308  2.0".to_string()];
        lines.extend(EXPECTED_OPT.iter().map(|s| format!("opt/X_0r_2d{}", s)));
        lines.push("val/X_1r_2d  1.0308  2.0".to_string());
        lines.extend(EXPECTED_OPT.iter().map(|s| format!("opt/X_1r_2d{}", s)));
        lines
    }

    #[test]
    fn test_sweep_isolates_failures() {
        let (dir, config) = setup("sweep_isolate");
        let mut sink: Vec<String> = Vec::new();
        let summary = run_sweep(&config, &mut sink).unwrap();

        assert_eq!(sink, expected_log());
        assert_eq!(summary.batch.success, 2);
        assert_eq!(summary.batch.failed, 2);
        assert_eq!(summary.batch.failures[0].0, "X_0r_1d");
        assert_eq!(summary.batch.failures[1].0, "X_1r_1d");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let (dir, mut config) = setup("sweep_missing_model");
        config.dimensions = vec![1, 2, 3];
        let mut sink: Vec<String> = Vec::new();
        let err = run_sweep(&config, &mut sink).unwrap_err();

        match err {
            SissoError::FileNotFound { path } => assert!(path.contains("X_0r_3d")),
            other => panic!("unexpected error: {:?}", other),
        }
        // 0r_2d 已写出，rung 0 未完成所以没有排行，rung 1 没有开始
        assert_eq!(sink, vec!["val/X_0r_2d  1.0308  2.0".to_string()]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_parallel_fail_fast_reports_first_failure() {
        let (dir, mut config) = setup("sweep_fail_fast_parallel");
        config.fail_fast = true;
        config.jobs = 4;
        let mut sink: Vec<String> = Vec::new();
        let err = run_sweep(&config, &mut sink).unwrap_err();
        assert!(matches!(err, SissoError::FormatError { .. }));
        assert!(sink.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_parallel_sweep_matches_sequential() {
        let (dir, mut config) = setup("sweep_parallel");
        config.jobs = 4;
        let mut sink: Vec<String> = Vec::new();
        run_sweep(&config, &mut sink).unwrap();
        assert_eq!(sink, expected_log());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let (dir, mut config) = setup("sweep_fail_fast");
        config.fail_fast = true;
        let mut sink: Vec<String> = Vec::new();
        let err = run_sweep(&config, &mut sink).unwrap_err();
        assert!(matches!(err, SissoError::FormatError { .. }));
        assert!(sink.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_discover_mode() {
        let (dir, mut config) = setup("sweep_discover");
        config.discover = true;
        config.rungs = vec![7];

        let combos = plan_combinations(&config).unwrap();
        let labels: Vec<&str> = combos.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["X_0r_1d", "X_0r_2d", "X_1r_1d", "X_1r_2d"]);

        // 发现模式只产生存在的目录，不受 dimensions 影响
        config.dimensions = vec![1, 2, 3];
        let mut sink: Vec<String> = Vec::new();
        let summary = run_sweep(&config, &mut sink).unwrap();
        assert_eq!(sink, expected_log());
        assert_eq!(summary.batch.total(), 4);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_data_is_fatal() {
        let (dir, mut config) = setup("sweep_no_data");
        config.val_name = dir.join("missing_data");
        let mut sink: Vec<String> = Vec::new();
        assert!(matches!(
            run_sweep(&config, &mut sink),
            Err(SissoError::FileNotFound { .. })
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_plan_fixed_ranges() {
        let (dir, config) = setup("sweep_plan");
        let combos = plan_combinations(&config).unwrap();
        assert_eq!(combos.len(), 4);
        assert_eq!((combos[0].rung, combos[0].dimension), (0, 1));
        assert_eq!((combos[3].rung, combos[3].dimension), (1, 2));
        assert_eq!(combos[1].model_path, dir.join("X_0r_2d").join(SISSO_OUT));

        let _ = fs::remove_dir_all(&dir);
    }
}
