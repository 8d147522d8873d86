//! # SISSO 模型数据模型
//!
//! 存储从 SISSO.out 中提取的某一维度的线性模型。
//!
//! ## 依赖关系
//! - 被 `parsers/sisso_out.rs` 构造
//! - 被 `validation/` 和 `commands/` 使用

/// 单个任务（吸附物类别 / mixID）的拟合系数
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFit {
    /// 与描述符按位置对齐的线性系数
    pub coefficients: Vec<f64>,

    /// 截距
    pub intercept: f64,
}

impl TaskFit {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        TaskFit {
            coefficients,
            intercept,
        }
    }

    /// 线性模型预测：dot(coefficients, values) + intercept
    pub fn predict(&self, descriptor_values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(descriptor_values)
            .map(|(c, d)| c * d)
            .sum::<f64>()
            + self.intercept
    }
}

/// 某一维度的 SISSO 模型
///
/// 多任务拟合时每个任务一组系数，共享同一描述符列表；
/// 单任务模型即 `fits.len() == 1`。
#[derive(Debug, Clone, PartialEq)]
pub struct SissoModel {
    /// 模型维度（描述符个数）
    pub dimension: usize,

    /// 描述符表达式，顺序与系数对齐
    pub descriptors: Vec<String>,

    /// 各任务的系数与截距
    pub fits: Vec<TaskFit>,

    /// 求解器报告的训练 RMSE（仅供参考）
    pub training_rmse: f64,

    /// 求解器报告的训练最大绝对误差（仅供参考）
    pub training_max_ae: f64,
}

impl SissoModel {
    /// 第 `index` 个任务的拟合（0 起）
    pub fn fit(&self, index: usize) -> Option<&TaskFit> {
        self.fits.get(index)
    }

    /// 任务数
    pub fn task_count(&self) -> usize {
        self.fits.len()
    }

    /// 按 mixID 选择系数块：0 与 1 都指第一块，k 指第 k 块
    pub fn fit_for_mix_id(&self, mix_id: usize) -> Option<&TaskFit> {
        self.fit(mix_id.saturating_sub(1))
    }

    /// 只保留 mixID 对应的系数块，得到单任务模型
    pub fn for_mix_id(&self, mix_id: usize) -> Option<SissoModel> {
        let fit = self.fit_for_mix_id(mix_id)?.clone();
        Some(SissoModel {
            dimension: self.dimension,
            descriptors: self.descriptors.clone(),
            fits: vec![fit],
            training_rmse: self.training_rmse,
            training_max_ae: self.training_max_ae,
        })
    }
}
