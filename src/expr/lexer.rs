//! # 描述符表达式词法分析
//!
//! 特征名按表头做最长匹配，并要求匹配后紧跟非标识符字符，
//! 因此一个特征名是另一个特征名的前缀或子串时不会被误切分。

use super::ast::Function;
use super::FeatureTable;

/// 词法单元类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Feature(usize),
    Func(Function),
    /// `exp-(`：参数取负的指数，左括号单独成为 LParen
    ExpNeg,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

/// 带位置的词法单元（位置为字符序号，0 起）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

/// 词法错误
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedChar { pos: usize, ch: char },
    BadNumber { pos: usize, text: String },
    UnknownName { pos: usize, name: String },
    AmbiguousName { name: String },
}

pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    features: &'a FeatureTable,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Lexer<'a> {
    pub fn new(text: &str, features: &'a FeatureTable) -> Self {
        Lexer {
            chars: text.chars().collect(),
            pos: 0,
            features,
        }
    }

    /// 切分全部词法单元
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        while self.peek(0).map_or(false, char::is_whitespace) {
            self.pos += 1;
        }
        let start = self.pos;
        let c = match self.peek(0) {
            Some(c) => c,
            None => return Ok(None),
        };

        // 表头特征名优先
        if let Some((index, len)) = self.match_feature() {
            let name = &self.features.names()[index];
            if self.features.is_duplicated(name) {
                return Err(LexError::AmbiguousName { name: name.clone() });
            }
            self.pos += len;
            return Ok(Some(Token {
                kind: TokenKind::Feature(index),
                pos: start,
            }));
        }

        let kind = match c {
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '/' => self.single(TokenKind::Slash),
            '^' => self.single(TokenKind::Caret),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '*' if self.peek(1) == Some('*') => {
                self.pos += 2;
                TokenKind::Caret
            }
            '*' => self.single(TokenKind::Star),
            c if c.is_ascii_digit() || c == '.' => self.number()?,
            c if c.is_ascii_alphabetic() || c == '_' => self.word()?,
            ch => return Err(LexError::UnexpectedChar { pos: start, ch }),
        };

        Ok(Some(Token { kind, pos: start }))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// 当前位置能匹配的最长特征名：(列号, 字符数)
    fn match_feature(&self) -> Option<(usize, usize)> {
        let rest = &self.chars[self.pos..];
        for &index in self.features.by_length() {
            let name = self.features.chars_of(index);
            if rest.len() >= name.len()
                && rest[..name.len()] == name[..]
                && !rest.get(name.len()).copied().map_or(false, is_ident_char)
            {
                return Some((index, name.len()));
            }
        }
        None
    }

    fn number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        while self.peek(0).map_or(false, |c| c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        // 指数部分，仅当 e 后面确实跟着数字
        if matches!(self.peek(0), Some('e') | Some('E')) {
            let sign = matches!(self.peek(1), Some('+') | Some('-')) as usize;
            if self.peek(1 + sign).map_or(false, |c| c.is_ascii_digit()) {
                self.pos += 1 + sign;
                while self.peek(0).map_or(false, |c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| LexError::BadNumber { pos: start, text })
    }

    fn word(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        while self.peek(0).map_or(false, is_ident_char) {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();

        if word == "exp" && self.peek(0) == Some('-') && self.peek(1) == Some('(') {
            self.pos += 1;
            return Ok(TokenKind::ExpNeg);
        }
        match Function::from_name(&word) {
            Some(func) => Ok(TokenKind::Func(func)),
            None => Err(LexError::UnknownName {
                pos: start,
                name: word,
            }),
        }
    }
}
