//! # 描述符表达式树
//!
//! 叶子为数值常量或特征列号，内部节点为四则运算、乘方与固定的函数集合。
//! 求值时按列号查表，不做任何文本替换。

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// 支持的一元函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Exp,
    Log,
    Sqrt,
    Sin,
    Cos,
    /// 保号立方根
    Cbrt,
    /// 1 / (π (1 + x²))
    Scd,
    Abs,
}

impl Function {
    /// 按 SISSO 运算符名查找函数
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exp" => Some(Function::Exp),
            "log" => Some(Function::Log),
            "sqrt" => Some(Function::Sqrt),
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "cbrt" => Some(Function::Cbrt),
            "scd" => Some(Function::Scd),
            "abs" => Some(Function::Abs),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sqrt => "sqrt",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Cbrt => "cbrt",
            Function::Scd => "scd",
            Function::Abs => "abs",
        }
    }

    fn apply(&self, x: f64) -> Result<f64, String> {
        match self {
            Function::Exp => Ok(x.exp()),
            Function::Log if x <= 0.0 => {
                Err(format!("{} of non-positive value {}", self.name(), x))
            }
            Function::Log => Ok(x.ln()),
            Function::Sqrt if x < 0.0 => {
                Err(format!("{} of negative value {}", self.name(), x))
            }
            Function::Sqrt => Ok(x.sqrt()),
            Function::Sin => Ok(x.sin()),
            Function::Cos => Ok(x.cos()),
            Function::Cbrt => Ok(x.cbrt()),
            Function::Scd => Ok(1.0 / (std::f64::consts::PI * (1.0 + x * x))),
            Function::Abs => Ok(x.abs()),
        }
    }
}

/// 表达式树节点
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// 表头列号
    Feature(usize),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    /// 对一行数据求值，`row[i]` 为第 i 列的数值
    pub fn eval(&self, row: &[f64]) -> Result<f64, String> {
        let value = match self {
            Expr::Number(v) => *v,
            Expr::Feature(col) => *row
                .get(*col)
                .ok_or_else(|| format!("feature column {} out of range", col))?,
            Expr::Neg(inner) => -inner.eval(row)?,
            Expr::Call(func, arg) => func.apply(arg.eval(row)?)?,
            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval(row)?;
                let b = rhs.eval(row)?;
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div if b == 0.0 => return Err("division by zero".to_string()),
                    BinOp::Div => a / b,
                    BinOp::Pow => {
                        let p = a.powf(b);
                        if p.is_nan() {
                            return Err(format!("invalid power {}^{}", a, b));
                        }
                        p
                    }
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(format!("non-finite intermediate value {}", value))
        }
    }

    /// 收集引用到的列号（去重、升序）
    pub fn columns(&self) -> Vec<usize> {
        let mut cols = Vec::new();
        self.collect_columns(&mut cols);
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    fn collect_columns(&self, out: &mut Vec<usize>) {
        match self {
            Expr::Number(_) => {}
            Expr::Feature(col) => out.push(*col),
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.collect_columns(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_columns(out);
                rhs.collect_columns(out);
            }
        }
    }
}
