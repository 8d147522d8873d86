//! # 验证数据集数据模型
//!
//! 验证集每行一个样本：样本名、观测值、以及与表头对齐的特征值。
//! 特征值保留原始文本，只有被描述符引用的列才会在求值时解析为浮点数。
//!
//! ## 依赖关系
//! - 被 `parsers/dataset.rs` 构造
//! - 被 `validation/` 和 `commands/split.rs` 使用

/// 验证集中的一个样本
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSample {
    /// 样本名（第一列）
    pub sample_id: String,

    /// 观测性质值（第二列）
    pub observed_value: f64,

    /// 与表头对齐的整行原始文本
    pub feature_values: Vec<String>,

    /// 数据行序号（1 起，不计表头和空行），用于任务路由
    pub row: usize,

    /// 文件行号（1 起），用于报告
    pub line: usize,
}

impl ValidationSample {
    /// 第 `column` 列的原始文本
    pub fn value(&self, column: usize) -> Option<&str> {
        self.feature_values.get(column).map(String::as_str)
    }
}

/// 整个验证集
#[derive(Debug, Clone, Default)]
pub struct ValidationSet {
    /// 来源文件
    pub path: String,

    /// 表头特征名
    pub header: Vec<String>,

    /// 样本，按文件顺序
    pub samples: Vec<ValidationSample>,

    /// 宽松模式下被丢弃的行：(文件行号, 原因)
    pub dropped: Vec<(usize, String)>,
}

impl ValidationSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }
}
