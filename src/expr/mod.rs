//! # 描述符表达式求值模块
//!
//! 把 SISSO 描述符文本编译为表达式树，再逐行按列号求值。
//!
//! ## 流程
//! 1. `FeatureTable`：由验证集表头建立特征名 → 列号映射
//! 2. `Lexer`：特征名最长匹配 + 边界检查，识别固定的运算符/函数集合
//! 3. `Parser`：递归下降生成 `Expr`
//! 4. `FeatureExpression::evaluate`：对一行数值求值，定义域错误报错
//!
//! 编译结果只依赖描述符文本和表头，可在所有行之间复用，
//! 每行都从同一棵未被修改的树开始求值。
//!
//! ## 依赖关系
//! - 被 `validation/runner.rs` 使用
//! - 子模块: ast, lexer, parser

pub mod ast;
pub mod lexer;
pub mod parser;

use crate::error::{Result, SissoError};
use ast::Expr;
use lexer::{LexError, Lexer};
use parser::Parser;

use std::collections::HashSet;

/// 表头特征名表
#[derive(Debug, Clone)]
pub struct FeatureTable {
    names: Vec<String>,
    chars: Vec<Vec<char>>,
    /// 按名字长度降序排列的列号
    by_length: Vec<usize>,
    duplicates: HashSet<String>,
}

impl FeatureTable {
    pub fn new(header: &[String]) -> Self {
        let mut seen = HashSet::new();
        let duplicates = header
            .iter()
            .filter(|name| !seen.insert(name.as_str()))
            .cloned()
            .collect();

        let chars: Vec<Vec<char>> = header.iter().map(|n| n.chars().collect()).collect();
        let mut by_length: Vec<usize> = (0..header.len()).collect();
        by_length.sort_by(|&a, &b| chars[b].len().cmp(&chars[a].len()));

        FeatureTable {
            names: header.to_vec(),
            chars,
            by_length,
            duplicates,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_duplicated(&self, name: &str) -> bool {
        self.duplicates.contains(name)
    }

    fn by_length(&self) -> &[usize] {
        &self.by_length
    }

    fn chars_of(&self, index: usize) -> &[char] {
        &self.chars[index]
    }
}

/// 编译后的描述符
#[derive(Debug, Clone)]
pub struct FeatureExpression {
    text: String,
    tree: Expr,
    columns: Vec<usize>,
}

impl FeatureExpression {
    /// 针对给定表头编译描述符文本
    pub fn compile(text: &str, features: &FeatureTable) -> Result<Self> {
        let tokens = Lexer::new(text, features)
            .tokenize()
            .map_err(|e| lex_error(text, e))?;

        let end = text.chars().count();
        let tree = Parser::new(&tokens, end)
            .parse()
            .map_err(|e| SissoError::ExpressionSyntax {
                expr: text.to_string(),
                position: e.pos + 1,
                reason: e.reason,
            })?;

        let columns = tree.columns();
        Ok(FeatureExpression {
            text: text.to_string(),
            tree,
            columns,
        })
    }

    /// 原始描述符文本
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 引用到的表头列号
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// 对一行求值，`row[i]` 为表头第 i 列的数值
    pub fn evaluate(&self, row: &[f64]) -> Result<f64> {
        self.tree
            .eval(row)
            .map_err(|reason| SissoError::EvaluationError {
                expr: self.text.clone(),
                reason,
            })
    }
}

fn lex_error(text: &str, err: LexError) -> SissoError {
    match err {
        LexError::UnknownName { name, .. } => SissoError::UnknownFeature {
            name,
            expr: text.to_string(),
        },
        LexError::AmbiguousName { name } => SissoError::AmbiguousFeature { name },
        LexError::UnexpectedChar { pos, ch } => SissoError::ExpressionSyntax {
            expr: text.to_string(),
            position: pos + 1,
            reason: format!("unexpected character '{}'", ch),
        },
        LexError::BadNumber { pos, text: number } => SissoError::ExpressionSyntax {
            expr: text.to_string(),
            position: pos + 1,
            reason: format!("malformed number '{}'", number),
        },
    }
}
