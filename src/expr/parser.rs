//! # 描述符表达式语法分析
//!
//! 递归下降，运算符优先级如下：
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?
//! primary := NUMBER | FEATURE | FUNC '(' expr ')' | 'exp-(' expr ')' | '(' expr ')'
//! ```
//!
//! 乘方右结合，且一元负号优先级低于乘方（`-x^2 == -(x^2)`）。

use super::ast::{BinOp, Expr, Function};
use super::lexer::{Token, TokenKind};

/// 语法错误：(字符位置, 原因)
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub pos: usize,
    pub reason: String,
}

pub struct Parser<'t> {
    tokens: &'t [Token],
    cursor: usize,
    /// 表达式总字符数，用于报告结尾处的错误
    end: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], end: usize) -> Self {
        Parser {
            tokens,
            cursor: 0,
            end,
        }
    }

    /// 解析完整表达式，要求消费全部词法单元
    pub fn parse(mut self) -> Result<Expr, SyntaxError> {
        let expr = self.expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(tok) => Err(SyntaxError {
                pos: tok.pos,
                reason: "unexpected trailing input".to_string(),
            }),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().map_or(false, |t| t.kind == kind)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), SyntaxError> {
        if self.at(kind) {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.error_here(format!("expected {}", what)))
        }
    }

    fn error_here(&self, reason: String) -> SyntaxError {
        SyntaxError {
            pos: self.peek().map_or(self.end, |t| t.pos),
            reason,
        }
    }

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.cursor += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => break,
            };
            self.cursor += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Minus) => {
                self.cursor += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(TokenKind::Plus) => {
                self.cursor += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.primary()?;
        if self.at(TokenKind::Caret) {
            self.cursor += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = match self.advance() {
            Some(tok) => tok,
            None => return Err(self.error_here("unexpected end of expression".to_string())),
        };

        match tok.kind {
            TokenKind::Number(v) => Ok(Expr::Number(v)),
            TokenKind::Feature(col) => Ok(Expr::Feature(col)),
            TokenKind::Func(func) => {
                let arg = self.parenthesized()?;
                Ok(Expr::Call(func, Box::new(arg)))
            }
            TokenKind::ExpNeg => {
                let arg = self.parenthesized()?;
                Ok(Expr::Call(Function::Exp, Box::new(Expr::Neg(Box::new(arg)))))
            }
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(SyntaxError {
                pos: tok.pos,
                reason: "expected a number, feature, function or '('".to_string(),
            }),
        }
    }

    fn parenthesized(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(TokenKind::LParen, "'(' after function name")?;
        let inner = self.expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(inner)
    }
}
