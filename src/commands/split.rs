//! # split / kfold 命令实现
//!
//! 把 SISSO 特征表随机划分为训练、验证、测试集，或做 k 折划分。
//! 每个输出文件都保留原表头，行内容原样写出。
//!
//! ## 功能
//! - `split`: 默认 50% / 25% / 其余 -> training_data / validation_data / test_data
//! - `kfold`: k 折（默认 5）-> train{i} / test{i}，可按连续任务分组分层
//! - `--seed` 使划分可复现
//!
//! ## 依赖关系
//! - 使用 `cli/split.rs` 定义的参数
//! - 使用 `parsers/dataset.rs` 读取原始表格
//! - 使用 `rand` 打乱顺序

use crate::cli::split::{KfoldArgs, SplitArgs};
use crate::config::parse_boundaries;
use crate::error::{Result, SissoError};
use crate::parsers::read_raw_table;
use crate::utils::output;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

/// 执行 split 命令
pub fn execute_split(args: SplitArgs) -> Result<()> {
    output::print_header("Split Feature Table");

    let (header, rows) = read_raw_table(&args.input)?;
    let (n_train, n_validation, n_test) = split_sizes(rows.len(), args.train, args.validation)?;

    let mut rng = make_rng(args.seed);
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(&mut rng);

    ensure_dir(&args.out_dir)?;
    let parts = [
        ("training_data", &order[..n_train]),
        ("validation_data", &order[n_train..n_train + n_validation]),
        ("test_data", &order[n_train + n_validation..]),
    ];
    for (name, indices) in parts {
        let path = args.out_dir.join(name);
        write_table(&path, &header, indices.iter().map(|&i| rows[i].as_str()))?;
        output::print_success(&format!("{} rows -> '{}'", indices.len(), path.display()));
    }

    output::print_success(&format!(
        "Split {} rows into {} / {} / {}",
        rows.len(),
        n_train,
        n_validation,
        n_test
    ));
    Ok(())
}

/// 执行 kfold 命令
pub fn execute_kfold(args: KfoldArgs) -> Result<()> {
    output::print_header("K-Fold Split");

    let (header, rows) = read_raw_table(&args.input)?;
    let groups = match &args.groups {
        Some(text) => parse_boundaries(text)?,
        None => vec![rows.len()],
    };

    let mut rng = make_rng(args.seed);
    let assignment = assign_folds(rows.len(), args.folds, &groups, &mut rng)?;

    ensure_dir(&args.out_dir)?;
    for fold in 0..args.folds {
        let train = rows
            .iter()
            .enumerate()
            .filter(|(i, _)| assignment[*i] != fold)
            .map(|(_, r)| r.as_str());
        let test = rows
            .iter()
            .enumerate()
            .filter(|(i, _)| assignment[*i] == fold)
            .map(|(_, r)| r.as_str());

        let train_path = args.out_dir.join(format!("train{}", fold + 1));
        let test_path = args.out_dir.join(format!("test{}", fold + 1));
        write_table(&train_path, &header, train)?;
        write_table(&test_path, &header, test)?;

        let n_test = assignment.iter().filter(|&&f| f == fold).count();
        output::print_success(&format!(
            "Fold {}: {} train / {} test",
            fold + 1,
            rows.len() - n_test,
            n_test
        ));
    }

    output::print_success(&format!(
        "Wrote {} folds to '{}'",
        args.folds,
        args.out_dir.display()
    ));
    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// 训练/验证/测试行数：前两者四舍五入，测试集取余
pub fn split_sizes(total: usize, train: f64, validation: f64) -> Result<(usize, usize, usize)> {
    let valid_fraction = |f: f64| (0.0..=1.0).contains(&f);
    if !valid_fraction(train) || !valid_fraction(validation) || train + validation > 1.0 {
        return Err(SissoError::InvalidArgument(format!(
            "fractions must lie in [0, 1] and sum to at most 1 (train {}, validation {})",
            train, validation
        )));
    }

    let n_train = ((total as f64) * train).round() as usize;
    let n_validation = (((total as f64) * validation).round() as usize).min(total - n_train);
    Ok((n_train, n_validation, total - n_train - n_validation))
}

/// 每行所属的折（0 起）
///
/// `groups` 是连续分组的行数，各组内部打乱后轮流分配到各折，
/// 计数在组间延续，使各折大小最多相差 1。
pub fn assign_folds(total: usize, folds: usize, groups: &[usize], rng: &mut StdRng) -> Result<Vec<usize>> {
    if folds < 2 {
        return Err(SissoError::InvalidArgument("at least 2 folds are required".to_string()));
    }
    if folds > total {
        return Err(SissoError::InvalidArgument(format!(
            "{} folds requested for {} rows",
            folds, total
        )));
    }
    let grouped: usize = groups.iter().sum();
    if grouped != total {
        return Err(SissoError::InvalidArgument(format!(
            "group sizes add up to {} but the table has {} rows",
            grouped, total
        )));
    }

    let mut assignment = vec![0; total];
    let mut start = 0;
    let mut next = 0;
    for &size in groups {
        let mut members: Vec<usize> = (start..start + size).collect();
        members.shuffle(rng);
        for row in members {
            assignment[row] = next % folds;
            next += 1;
        }
        start += size;
    }
    Ok(assignment)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| SissoError::FileWriteError {
        path: dir.display().to_string(),
        source: e,
    })
}

/// 写出表头与数据行
fn write_table<'a>(path: &Path, header: &str, rows: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut content = String::from(header);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| SissoError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
