//! # 模型目录收集器
//!
//! 在根目录下查找 `{root_name}_{rung}r_{dimension}d` 形式的 SISSO 模型目录。
//!
//! ## 功能
//! - glob 模式预筛选目录名
//! - 正则解析 rung / dimension
//! - 只保留包含 `SISSO.out` 的目录
//!
//! ## 依赖关系
//! - 被 `commands/sweep.rs` 调用
//! - 使用 `walkdir` 遍历目录

use crate::error::{Result, SissoError};
use crate::parsers::sisso_out::SISSO_OUT;

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 发现的模型目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDir {
    pub rung: usize,
    pub dimension: usize,
    pub path: PathBuf,
}

/// 模型目录收集器
pub struct ModelCollector {
    /// 根目录
    root: PathBuf,
    /// 目录名前缀
    root_name: String,
    /// 是否递归
    recursive: bool,
}

impl ModelCollector {
    /// 创建新的收集器
    pub fn new(root: PathBuf, root_name: &str) -> Self {
        Self {
            root,
            root_name: root_name.to_string(),
            recursive: false,
        }
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有模型目录，按 (rung, dimension) 排序
    pub fn collect(&self) -> Result<Vec<ModelDir>> {
        if !self.root.is_dir() {
            return Err(SissoError::DirectoryNotFound {
                path: self.root.display().to_string(),
            });
        }

        let pattern_text = format!("{}_*r_*d", glob::Pattern::escape(&self.root_name));
        let glob_pattern = glob::Pattern::new(&pattern_text).map_err(|e| {
            SissoError::InvalidArgument(format!("Invalid pattern '{}': {}", pattern_text, e))
        })?;
        let name_re = Regex::new(&format!(r"^{}_(\d+)r_(\d+)d$", regex::escape(&self.root_name)))
            .map_err(|e| SissoError::InvalidArgument(e.to_string()))?;

        // 根目录自身不计入
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir());

        let mut found = Vec::new();
        for entry in walker {
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !glob_pattern.matches(name) {
                continue;
            }
            let Some(caps) = name_re.captures(name) else {
                continue;
            };
            if !has_model_file(entry.path()) {
                log::debug!("{}: no {}, ignored", entry.path().display(), SISSO_OUT);
                continue;
            }
            // \d+ 保证解析成功，溢出的数字直接忽略
            let (Ok(rung), Ok(dimension)) = (caps[1].parse::<usize>(), caps[2].parse::<usize>()) else {
                continue;
            };
            found.push(ModelDir {
                rung,
                dimension,
                path: entry.path().to_path_buf(),
            });
        }

        found.sort_by(|a, b| (a.rung, a.dimension, &a.path).cmp(&(b.rung, b.dimension, &b.path)));
        Ok(found)
    }
}

fn has_model_file(dir: &Path) -> bool {
    dir.join(SISSO_OUT).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::scratch_dir as scratch;
    use std::fs;

    fn model_dir(root: &Path, name: &str, with_output: bool) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        if with_output {
            fs::write(dir.join(SISSO_OUT), "").unwrap();
        }
    }

    #[test]
    fn test_collect_model_dirs() {
        let root = scratch("collect");
        model_dir(&root, "O_OH_1r_2d", true);
        model_dir(&root, "O_OH_0r_10d", true);
        model_dir(&root, "O_OH_0r_3d", true);
        model_dir(&root, "O_OH_0r_4d", false);
        model_dir(&root, "O_OOH_0r_1d", true);
        model_dir(&root, "O_OH_xr_1d", true);

        let found = ModelCollector::new(root.clone(), "O_OH").collect().unwrap();
        let keys: Vec<(usize, usize)> = found.iter().map(|m| (m.rung, m.dimension)).collect();
        assert_eq!(keys, vec![(0, 3), (0, 10), (1, 2)]);
        assert_eq!(found[0].path, root.join("O_OH_0r_3d"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_recursive_search() {
        let root = scratch("collect_rec");
        model_dir(&root.join("batch1"), "Pt_2r_1d", true);

        let flat = ModelCollector::new(root.clone(), "Pt").collect().unwrap();
        assert!(flat.is_empty());
        let deep = ModelCollector::new(root.clone(), "Pt")
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(deep.len(), 1);
        assert_eq!((deep[0].rung, deep[0].dimension), (2, 1));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_root() {
        let result = ModelCollector::new(PathBuf::from("/nonexistent/sisso"), "O").collect();
        assert!(matches!(result, Err(SissoError::DirectoryNotFound { .. })));
    }
}
