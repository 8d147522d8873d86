//! # 扫描配置
//!
//! 从 INI 文件的 `[root]` 段读取验证扫描配置：
//!
//! ```ini
//! [root]
//! pathway = /scratch/sisso/O_OH
//! val_name = validation_data
//! root_name = O_OH
//! opt_dimension = 3
//! type_ads = O OH
//! length_ads = 190 375
//! ```
//!
//! 可选键：`results`, `rungs`, `dimensions`, `score_ads`, `skip_bad_rows`, `fail_fast`。
//! 命令行参数可以覆盖任意键（见 `commands/sweep.rs`）。
//!
//! ## 依赖关系
//! - 被 `commands/sweep.rs` 使用
//! - 使用 `configparser` 读取 INI
//! - 使用 `validation/routing.rs` 构造任务路由

use crate::error::{Result, SissoError};
use crate::validation::TaskRouter;

use configparser::ini::Ini;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件名
pub const DEFAULT_CONFIG: &str = "config_validation";

/// 默认结果日志
pub const DEFAULT_RESULTS: &str = "validation_results";

const SECTION: &str = "root";

type Section = HashMap<String, Option<String>>;

/// 一次 (rung, dimension) 扫描所需的全部配置
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// 模型目录所在的根目录
    pub pathway: PathBuf,
    /// 验证集文件
    pub val_name: PathBuf,
    /// 模型目录名前缀
    pub root_name: String,
    /// 任务名（多任务 SISSO），单任务时可以为空或只有一个
    pub type_ads: Vec<String>,
    /// 任务边界（数据行序号，1 起）
    pub length_ads: Vec<usize>,
    /// 需要输出误差最大样本的维度
    pub opt_dimension: usize,
    pub rungs: Vec<usize>,
    pub dimensions: Vec<usize>,
    /// 结果日志（追加写入）
    pub results: PathBuf,
    /// 只统计这些任务的样本
    pub score_ads: Option<Vec<String>>,
    pub skip_bad_rows: bool,
    pub fail_fast: bool,
    /// 扫描 `pathway` 下已有的模型目录而不是固定范围
    pub discover: bool,
    /// 发现模式下递归搜索
    pub recursive: bool,
    /// 并行组合数，1 为顺序执行，0 为全部核心
    pub jobs: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            pathway: PathBuf::from("."),
            val_name: PathBuf::from("validation_data"),
            root_name: String::new(),
            type_ads: Vec::new(),
            length_ads: Vec::new(),
            opt_dimension: 1,
            rungs: vec![0, 1, 2],
            dimensions: (1..=8).collect(),
            results: PathBuf::from(DEFAULT_RESULTS),
            score_ads: None,
            skip_bad_rows: false,
            fail_fast: false,
            discover: false,
            recursive: false,
            jobs: 1,
        }
    }
}

impl SweepConfig {
    /// 从 INI 文件加载
    pub fn from_ini_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SissoError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| SissoError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_ini_str(&content, &path.display().to_string())
    }

    /// 从 INI 文本加载
    pub fn from_ini_str(content: &str, source: &str) -> Result<Self> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|e| SissoError::ConfigError(format!("{}: {}", source, e)))?;

        let section = ini.get_map_ref().get(SECTION).ok_or_else(|| {
            SissoError::ConfigError(format!("{}: missing [{}] section", source, SECTION))
        })?;

        let mut config = SweepConfig {
            pathway: PathBuf::from(required(section, "pathway")?),
            val_name: PathBuf::from(required(section, "val_name")?),
            root_name: required(section, "root_name")?.to_string(),
            opt_dimension: parse_number(required(section, "opt_dimension")?, "opt_dimension")?,
            ..SweepConfig::default()
        };

        if let Some(value) = optional(section, "type_ads") {
            config.type_ads = split_names(value);
        }
        if let Some(value) = optional(section, "length_ads") {
            config.length_ads = parse_boundaries(value)?;
        }
        if let Some(value) = optional(section, "results") {
            config.results = PathBuf::from(value);
        }
        if let Some(value) = optional(section, "rungs") {
            config.rungs = parse_index_list(value)?;
        }
        if let Some(value) = optional(section, "dimensions") {
            config.dimensions = parse_index_list(value)?;
        }
        if let Some(value) = optional(section, "score_ads") {
            config.score_ads = Some(split_names(value));
        }
        if let Some(value) = optional(section, "skip_bad_rows") {
            config.skip_bad_rows = parse_bool(value, "skip_bad_rows")?;
        }
        if let Some(value) = optional(section, "fail_fast") {
            config.fail_fast = parse_bool(value, "fail_fast")?;
        }

        Ok(config)
    }

    /// 检查配置的内部一致性
    pub fn validate(&self) -> Result<()> {
        if self.root_name.is_empty() {
            return Err(SissoError::ConfigError("root_name must not be empty".to_string()));
        }
        if !self.discover && (self.rungs.is_empty() || self.dimensions.is_empty()) {
            return Err(SissoError::ConfigError(
                "at least one rung and one dimension are required".to_string(),
            ));
        }
        if self.dimensions.contains(&0) || self.opt_dimension == 0 {
            return Err(SissoError::ConfigError("dimensions start at 1".to_string()));
        }
        if self.type_ads.len() > 1 && self.length_ads.is_empty() {
            return Err(SissoError::ConfigError(format!(
                "{} tasks configured but length_ads is empty",
                self.type_ads.len()
            )));
        }
        self.router()?;
        self.score_tasks()?;
        Ok(())
    }

    /// 模型中的系数块数
    pub fn task_count(&self) -> usize {
        self.type_ads.len().max(1)
    }

    /// 多任务路由；没有边界时为单任务
    pub fn router(&self) -> Result<Option<TaskRouter>> {
        if self.length_ads.is_empty() {
            return Ok(None);
        }
        let names = if self.type_ads.is_empty() {
            vec!["task1".to_string()]
        } else {
            self.type_ads.clone()
        };
        TaskRouter::new(&names, &self.length_ads).map(Some)
    }

    /// `score_ads` 对应的任务序号
    pub fn score_tasks(&self) -> Result<Option<Vec<usize>>> {
        let Some(names) = &self.score_ads else {
            return Ok(None);
        };
        names
            .iter()
            .map(|name| {
                self.type_ads
                    .iter()
                    .position(|t| t == name)
                    .ok_or_else(|| {
                        SissoError::ConfigError(format!(
                            "score_ads entry '{}' is not one of type_ads ({})",
                            name,
                            self.type_ads.join(" ")
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// 组合标签，如 `O_OH_1r_3d`
    pub fn label(&self, rung: usize, dimension: usize) -> String {
        format!("{}_{}r_{}d", self.root_name, rung, dimension)
    }

    /// 组合对应的模型目录
    pub fn model_dir(&self, rung: usize, dimension: usize) -> PathBuf {
        self.pathway.join(self.label(rung, dimension))
    }
}

fn optional<'a>(section: &'a Section, key: &str) -> Option<&'a str> {
    match section.get(key) {
        Some(Some(value)) if !value.trim().is_empty() => Some(value.trim()),
        _ => None,
    }
}

fn required<'a>(section: &'a Section, key: &str) -> Result<&'a str> {
    optional(section, key)
        .ok_or_else(|| SissoError::ConfigError(format!("missing key '{}' in [{}]", key, SECTION)))
}

fn parse_number(value: &str, key: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| SissoError::ConfigError(format!("invalid {}: '{}'", key, value)))
}

fn parse_bool(value: &str, key: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SissoError::ConfigError(format!(
            "invalid {}: '{}' (expected true/false)",
            key, value
        ))),
    }
}

/// 任务边界列表，如 `190 375 560`（保持给定顺序）
pub fn parse_boundaries(value: &str) -> Result<Vec<usize>> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|v| parse_number(v, "task boundary"))
        .collect()
}

/// 以空白或逗号分隔的名字列表
pub fn split_names(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 解析序号列表，如 `0-2`、`1,3,5`、`1 2 3`、`1-4,8`
///
/// 结果升序去重。
pub fn parse_index_list(expr: &str) -> Result<Vec<usize>> {
    let mut items = Vec::new();

    for chunk in expr.split(|c: char| c == ',' || c.is_whitespace()) {
        if chunk.is_empty() {
            continue;
        }

        if let Some((a, b)) = chunk.split_once('-') {
            let a: usize = a
                .parse()
                .map_err(|_| SissoError::InvalidRange(chunk.to_string()))?;
            let b: usize = b
                .parse()
                .map_err(|_| SissoError::InvalidRange(chunk.to_string()))?;
            if b < a {
                return Err(SissoError::InvalidRange(chunk.to_string()));
            }
            items.extend(a..=b);
        } else {
            let v: usize = chunk
                .parse()
                .map_err(|_| SissoError::InvalidRange(chunk.to_string()))?;
            items.push(v);
        }
    }

    if items.is_empty() {
        return Err(SissoError::InvalidRange(expr.to_string()));
    }

    items.sort_unstable();
    items.dedup();
    Ok(items)
}
