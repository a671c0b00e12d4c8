//! 计算器工具：字符白名单 + 递归下降算术求值
//!
//! 仅允许 `0-9 + - * / ( ) . % 空格`；不做任何通用表达式求值。
//! 数值语义：整数运算保持整数，`/` 为真除法（结果为浮点），`//` 为向下取整除法，
//! `%` 为向下取整取模，`**` 为右结合乘方。
//!
//! 文法：
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/' | '//' | '%') unary)*
//! unary  := ('+' | '-') unary | power
//! power  := atom ('**' unary)?
//! atom   := number | '(' expr ')'
//! ```

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::tools::Tool;

const ALLOWED_CHARS: &str = "0123456789+-*/().% ";

/// 一元运算与括号的最大嵌套层数；递归下降超过此深度直接报错
const MAX_NESTING: usize = 200;

/// 表达式求值错误；Display 即返回给用户的错误描述
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("invalid syntax: {0}")]
    Syntax(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("0.0 cannot be raised to a negative power")]
    ZeroToNegativePower,

    #[error("integer overflow")]
    IntegerOverflow,

    #[error("numerical result out of range")]
    OutOfRange,

    #[error("complex results are not supported")]
    ComplexResult,

    #[error("too many nested parentheses")]
    TooDeeplyNested,
}

/// 求值结果：整数或浮点
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// 浮点输出：整数值补 ".0"，极大/极小值用科学计数法且指数至少两位（如 1e+20、1.5e-05）
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = x.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{x:e}");
        if let Some((mantissa, exp)) = s.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{mantissa}e{sign}{:02}", exp.abs());
            }
        }
        return s;
    }
    let s = format!("{x}");
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
}

fn lex(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let token = match c {
            ' ' => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '*' if next == Some('*') => {
                i += 1;
                Token::DoubleStar
            }
            '*' => Token::Star,
            '/' if next == Some('/') => {
                i += 1;
                Token::DoubleSlash
            }
            '/' => Token::Slash,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let mut is_float = false;
                if i < chars.len() && chars[i] == '.' {
                    is_float = true;
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_number(&literal, is_float)?));
                continue;
            }
            other => return Err(CalcError::Syntax(format!("unexpected character '{other}'"))),
        };
        tokens.push(token);
        i += 1;
    }
    Ok(tokens)
}

fn parse_number(literal: &str, is_float: bool) -> Result<Number, CalcError> {
    if literal == "." {
        return Err(CalcError::Syntax("unexpected '.'".to_string()));
    }
    if is_float {
        return literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| CalcError::Syntax(format!("bad number '{literal}'")));
    }
    if literal.len() > 1 && literal.starts_with('0') && literal.chars().any(|c| c != '0') {
        return Err(CalcError::Syntax(
            "leading zeros in decimal integer literals are not permitted".to_string(),
        ));
    }
    literal
        .parse::<i64>()
        .map(Number::Int)
        .map_err(|_| CalcError::IntegerOverflow)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Result<Number, CalcError> {
        let mut left = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let right = self.term()?;
            left = if op == Token::Plus {
                add(left, right)?
            } else {
                sub(left, right)?
            };
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Number, CalcError> {
        let mut left = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) =
            self.peek()
        {
            self.pos += 1;
            let right = self.unary()?;
            left = match op {
                Token::Star => mul(left, right)?,
                Token::Slash => div(left, right)?,
                Token::DoubleSlash => floor_div(left, right)?,
                _ => modulo(left, right)?,
            };
        }
        Ok(left)
    }

    // 所有递归路径（一元符号链、括号、乘方指数）都经过 unary
    fn unary(&mut self) -> Result<Number, CalcError> {
        if self.depth >= MAX_NESTING {
            return Err(CalcError::TooDeeplyNested);
        }
        self.depth += 1;
        let value = match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.unary().and_then(neg)
            }
            _ => self.power(),
        };
        self.depth -= 1;
        value
    }

    fn power(&mut self) -> Result<Number, CalcError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::DoubleStar) {
            self.pos += 1;
            let exp = self.unary()?;
            return pow(base, exp);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, CalcError> {
        match self.bump() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(CalcError::Syntax("'(' was never closed".to_string())),
                }
            }
            Some(Token::RParen) => Err(CalcError::Syntax("unmatched ')'".to_string())),
            Some(_) => Err(CalcError::Syntax("unexpected operator".to_string())),
            None => Err(CalcError::Syntax("unexpected end of expression".to_string())),
        }
    }
}

fn finite(x: f64) -> Result<Number, CalcError> {
    if x.is_finite() {
        Ok(Number::Float(x))
    } else {
        Err(CalcError::OutOfRange)
    }
}

fn add(a: Number, b: Number) -> Result<Number, CalcError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_add(y).map(Number::Int).ok_or(CalcError::IntegerOverflow)
        }
        _ => Ok(Number::Float(a.as_f64() + b.as_f64())),
    }
}

fn sub(a: Number, b: Number) -> Result<Number, CalcError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_sub(y).map(Number::Int).ok_or(CalcError::IntegerOverflow)
        }
        _ => Ok(Number::Float(a.as_f64() - b.as_f64())),
    }
}

fn mul(a: Number, b: Number) -> Result<Number, CalcError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_mul(y).map(Number::Int).ok_or(CalcError::IntegerOverflow)
        }
        _ => Ok(Number::Float(a.as_f64() * b.as_f64())),
    }
}

fn div(a: Number, b: Number) -> Result<Number, CalcError> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    Ok(Number::Float(a.as_f64() / b.as_f64()))
}

fn floor_div(a: Number, b: Number) -> Result<Number, CalcError> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            let q = x.checked_div(y).ok_or(CalcError::IntegerOverflow)?;
            let adjust = x % y != 0 && ((x < 0) != (y < 0));
            Ok(Number::Int(if adjust { q - 1 } else { q }))
        }
        _ => Ok(Number::Float((a.as_f64() / b.as_f64()).floor())),
    }
}

fn modulo(a: Number, b: Number) -> Result<Number, CalcError> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            let r = x.checked_rem(y).ok_or(CalcError::IntegerOverflow)?;
            Ok(Number::Int(if r != 0 && ((r < 0) != (y < 0)) { r + y } else { r }))
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            let r = x % y;
            Ok(Number::Float(if r != 0.0 && ((r < 0.0) != (y < 0.0)) { r + y } else { r }))
        }
    }
}

fn neg(a: Number) -> Result<Number, CalcError> {
    match a {
        Number::Int(x) => x.checked_neg().map(Number::Int).ok_or(CalcError::IntegerOverflow),
        Number::Float(x) => Ok(Number::Float(-x)),
    }
}

fn pow(base: Number, exp: Number) -> Result<Number, CalcError> {
    if base.is_zero() && exp.as_f64() < 0.0 {
        return Err(CalcError::ZeroToNegativePower);
    }
    match (base, exp) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| CalcError::IntegerOverflow)?;
            b.checked_pow(e).map(Number::Int).ok_or(CalcError::IntegerOverflow)
        }
        _ => {
            let (b, e) = (base.as_f64(), exp.as_f64());
            if b < 0.0 && e.fract() != 0.0 {
                return Err(CalcError::ComplexResult);
            }
            finite(b.powf(e))
        }
    }
}

/// 对已通过白名单校验的表达式求值
pub fn evaluate(expression: &str) -> Result<Number, CalcError> {
    let tokens = lex(expression)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(CalcError::Syntax("unexpected token".to_string()));
    }
    Ok(value)
}

/// 工具入口：返回 "Result: ..." 或 "Error: ..."，永不 panic
pub fn calculate(expression: &str) -> String {
    if !expression.chars().all(|c| ALLOWED_CHARS.contains(c)) {
        return "Error: Invalid characters in expression".to_string();
    }
    match evaluate(expression) {
        Ok(value) => format!("Result: {value}"),
        Err(e) => format!("Error: {e}"),
    }
}

/// 计算器工具
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Calculate mathematical expressions. Supports + - * / // % ** and parentheses."
    }

    fn input_name(&self) -> Option<&str> {
        Some("expression")
    }

    async fn invoke(&self, input: &str) -> String {
        calculate(input)
    }
}
