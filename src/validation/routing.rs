//! # 多任务行路由
//!
//! 多个任务（如 O / OH / OOH）的样本连续存放在同一验证文件中，
//! 以 `length_ads` 边界区分：数据行序号 `r`（1 起）属于第一个满足
//! `r < b_j` 的任务 `j`。
//!
//! 边界在构造时转换为半开区间 `[start_j, end_j)`，`end_j = max(b_0..=b_j)`，
//! 查询用二分查找，与逐个扫描的"首个命中"规则等价。

use crate::error::{Result, SissoError};

/// 任务的行区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRange {
    pub task: usize,
    pub name: String,
    /// 起始行（含）
    pub start: usize,
    /// 结束行（不含）
    pub end: usize,
}

impl TaskRange {
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// 行 → 任务路由表
#[derive(Debug, Clone)]
pub struct TaskRouter {
    ranges: Vec<TaskRange>,
}

impl TaskRouter {
    /// 由任务名与边界列表构造
    ///
    /// 边界数可以少于任务数（多余的任务不会被路由到），但不能多于任务数。
    pub fn new(names: &[String], boundaries: &[usize]) -> Result<Self> {
        if boundaries.is_empty() {
            return Err(SissoError::ConfigError(
                "multi-task routing needs at least one boundary".to_string(),
            ));
        }
        if boundaries.len() > names.len() {
            return Err(SissoError::ConfigError(format!(
                "{} boundaries given for {} tasks",
                boundaries.len(),
                names.len()
            )));
        }

        let mut ranges = Vec::with_capacity(boundaries.len());
        let mut start = 1;
        for (task, (&bound, name)) in boundaries.iter().zip(names).enumerate() {
            let end = bound.max(start);
            ranges.push(TaskRange {
                task,
                name: name.clone(),
                start,
                end,
            });
            start = end;
        }

        Ok(TaskRouter { ranges })
    }

    /// 数据行 `row`（1 起）所属的任务序号
    pub fn route(&self, row: usize) -> Result<usize> {
        let idx = self.ranges.partition_point(|r| r.end <= row);
        match self.ranges.get(idx) {
            Some(range) if range.start <= row => Ok(range.task),
            _ => Err(SissoError::RoutingError { row }),
        }
    }

    pub fn ranges(&self) -> &[TaskRange] {
        &self.ranges
    }

    /// 按名字查找任务序号
    pub fn task_index(&self, name: &str) -> Option<usize> {
        self.ranges.iter().find(|r| r.name == name).map(|r| r.task)
    }
}
