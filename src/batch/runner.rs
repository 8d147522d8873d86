//! # 批量执行器
//!
//! 并行执行相互独立的 (rung, dimension) 组合。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，结果保持输入顺序
//! - 进度条显示
//! - 遇到致命结果时提前停止
//! - 成功/失败统计与汇总
//!
//! ## 依赖关系
//! - 被 `commands/sweep.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{Result, SissoError};
use crate::utils::progress;

use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 单个组合的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    /// 处理成功
    Success(String),
    /// 处理失败
    Failed(String, String), // (组合标签, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Failed(label, err) => {
                self.failed += 1;
                self.failures.push((label, err));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs == 0` 时使用全部核心
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 按顺序处理任务，直到某个结果满足 `stop`
    ///
    /// 返回 `items` 的前缀对应的结果，最后一个元素可能是触发停止的结果。
    /// 停止点之后的任务不会再被处理；并行时，停止点之前的任务总会被处理。
    pub fn run_until<I, T, F, S>(
        &self,
        items: &[I],
        message: &str,
        processor: F,
        stop: S,
    ) -> Result<Vec<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> T + Sync + Send,
        S: Fn(&T) -> bool + Sync + Send,
    {
        let pb = progress::create_progress_bar(items.len() as u64, message);

        let results: Vec<T> = if self.jobs <= 1 {
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                let result = processor(item);
                pb.inc(1);
                let halt = stop(&result);
                results.push(result);
                if halt {
                    break;
                }
            }
            results
        } else {
            // 配置 rayon 线程池
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|e| SissoError::Other(format!("Failed to build thread pool: {}", e)))?;

            // 已知最早的停止位置，只会变小
            let stop_at = AtomicUsize::new(usize::MAX);
            let slots: Vec<Option<T>> = pool.install(|| {
                items
                    .par_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        if i > stop_at.load(Ordering::SeqCst) {
                            return None;
                        }
                        let result = processor(item);
                        pb.inc(1);
                        if stop(&result) {
                            stop_at.fetch_min(i, Ordering::SeqCst);
                        }
                        Some(result)
                    })
                    .collect()
            });

            let last = stop_at.into_inner();
            slots
                .into_iter()
                .enumerate()
                .take_while(|(i, _)| *i <= last)
                .filter_map(|(_, slot)| slot)
                .collect()
        };

        pb.finish_and_clear();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_results_keep_order() {
        let items: Vec<usize> = (0..64).collect();
        let sequential = BatchRunner::new(1)
            .run_until(&items, "seq", |i| i * i, |_| false)
            .unwrap();
        let parallel = BatchRunner::new(4)
            .run_until(&items, "par", |i| i * i, |_| false)
            .unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.len(), 64);
        assert_eq!(parallel[7], 49);
    }

    #[test]
    fn test_sequential_stops_at_first_match() {
        let calls = AtomicUsize::new(0);
        let items: Vec<usize> = (0..5).collect();
        let results = BatchRunner::new(1)
            .run_until(
                &items,
                "seq",
                |&i| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if i == 0 { Err(i) } else { Ok(i) }
                },
                |r| r.is_err(),
            )
            .unwrap();
        assert_eq!(results, vec![Err(0)]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parallel_stops_at_first_match_in_order() {
        let items: Vec<usize> = (0..32).collect();
        let results = BatchRunner::new(4)
            .run_until(&items, "par", |&i| i, |&i| i == 5 || i == 20)
            .unwrap();
        assert_eq!(results, (0..=5).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_result_tally() {
        let mut result = BatchResult::default();
        result.merge(ProcessResult::Success("a_0r_1d".to_string()));
        result.merge(ProcessResult::Failed("a_0r_3d".to_string(), "bad".to_string()));
        assert_eq!(result.total(), 2);
        assert_eq!(result.failures, vec![("a_0r_3d".to_string(), "bad".to_string())]);
    }

    #[test]
    fn test_zero_jobs_uses_all_cores() {
        assert_eq!(BatchRunner::new(0).jobs, num_cpus::get());
    }
}
