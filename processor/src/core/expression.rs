//! Arithmetic expression evaluator
//!
//! Supports: numbers (with fraction and exponent), + - * / % ^, unary signs
//! and parentheses. Anything else, identifiers included, is rejected at
//! tokenization, so evaluation can never reach beyond arithmetic.

use thiserror::Error;

/// Longest accepted expression, in bytes
pub const MAX_EXPRESSION_LEN: usize = 256;
/// Deepest accepted nesting of parentheses and unary signs
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Empty expression")]
    Empty,

    #[error("Expression too long: {len} bytes (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String },

    #[error("Unexpected token '{token}'")]
    UnexpectedToken { token: String },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NonFinite,

    #[error("Expression nested deeper than {max} levels")]
    TooDeep { max: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Parsed arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    BinaryOp {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn evaluate(&self) -> Result<f64, ExpressionError> {
        let value = match self {
            Expr::Number(n) => *n,
            Expr::Neg(inner) => -inner.evaluate()?,
            Expr::BinaryOp { op, left, right } => {
                let l = left.evaluate()?;
                let r = right.evaluate()?;
                match op {
                    Op::Add => l + r,
                    Op::Sub => l - r,
                    Op::Mul => l * r,
                    Op::Div => {
                        if r == 0.0 {
                            return Err(ExpressionError::DivisionByZero);
                        }
                        l / r
                    }
                    Op::Rem => {
                        if r == 0.0 {
                            return Err(ExpressionError::DivisionByZero);
                        }
                        l % r
                    }
                    Op::Pow => l.powf(r),
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExpressionError::NonFinite)
        }
    }
}

/// Parse and evaluate an arithmetic expression
pub fn evaluate(input: &str) -> Result<f64, ExpressionError> {
    parse(input)?.evaluate()
}

/// Parse an arithmetic expression into an AST
pub fn parse(input: &str) -> Result<Expr, ExpressionError> {
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(ExpressionError::TooLong {
            len: input.len(),
            max: MAX_EXPRESSION_LEN,
        });
    }

    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let (expr, pos) = parse_add_sub(&tokens, 0, 0)?;
    match tokens.get(pos) {
        None => Ok(expr),
        Some(token) => Err(ExpressionError::UnexpectedToken {
            token: token.to_string(),
        }),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => { chars.next(); }
            '+' => { tokens.push(Token::Plus); chars.next(); }
            '-' => { tokens.push(Token::Minus); chars.next(); }
            '*' => { tokens.push(Token::Star); chars.next(); }
            '/' => { tokens.push(Token::Slash); chars.next(); }
            '%' => { tokens.push(Token::Percent); chars.next(); }
            '^' => { tokens.push(Token::Caret); chars.next(); }
            '(' => { tokens.push(Token::LParen); chars.next(); }
            ')' => { tokens.push(Token::RParen); chars.next(); }
            '0'..='9' | '.' => {
                let mut text = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        text.push(d);
                        chars.next();
                    } else if (d == 'e' || d == 'E') && !text.contains(['e', 'E']) {
                        text.push(d);
                        chars.next();
                        // Exponent sign
                        if let Some(&(_, s)) = chars.peek() {
                            if s == '+' || s == '-' {
                                text.push(s);
                                chars.next();
                            }
                        }
                    } else {
                        break;
                    }
                }
                let number = text
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::InvalidNumber { text: text.clone() })?;
                tokens.push(Token::Number(number));
            }
            other => return Err(ExpressionError::UnexpectedChar { ch: other, pos }),
        }
    }

    Ok(tokens)
}

fn check_depth(depth: usize) -> Result<(), ExpressionError> {
    if depth > MAX_NESTING_DEPTH {
        Err(ExpressionError::TooDeep { max: MAX_NESTING_DEPTH })
    } else {
        Ok(())
    }
}

// Lowest precedence: + and -
fn parse_add_sub(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), ExpressionError> {
    let (mut left, mut pos) = parse_mul_div(tokens, pos, depth)?;

    while let Some(token) = tokens.get(pos) {
        let op = match token {
            Token::Plus => Op::Add,
            Token::Minus => Op::Sub,
            _ => break,
        };
        let (right, new_pos) = parse_mul_div(tokens, pos + 1, depth)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

fn parse_mul_div(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), ExpressionError> {
    let (mut left, mut pos) = parse_power(tokens, pos, depth)?;

    while let Some(token) = tokens.get(pos) {
        let op = match token {
            Token::Star => Op::Mul,
            Token::Slash => Op::Div,
            Token::Percent => Op::Rem,
            _ => break,
        };
        let (right, new_pos) = parse_power(tokens, pos + 1, depth)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

// Exponentiation (^) - right-associative, binds tighter than * /
fn parse_power(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), ExpressionError> {
    let (base, pos) = parse_unary(tokens, pos, depth)?;

    if let Some(Token::Caret) = tokens.get(pos) {
        check_depth(depth + 1)?;
        let (exponent, new_pos) = parse_power(tokens, pos + 1, depth + 1)?;
        return Ok((
            Expr::BinaryOp {
                op: Op::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            },
            new_pos,
        ));
    }

    Ok((base, pos))
}

fn parse_unary(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), ExpressionError> {
    match tokens.get(pos) {
        Some(Token::Minus) => {
            check_depth(depth + 1)?;
            let (inner, new_pos) = parse_unary(tokens, pos + 1, depth + 1)?;
            Ok((Expr::Neg(Box::new(inner)), new_pos))
        }
        Some(Token::Plus) => {
            check_depth(depth + 1)?;
            parse_unary(tokens, pos + 1, depth + 1)
        }
        _ => parse_primary(tokens, pos, depth),
    }
}

fn parse_primary(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), ExpressionError> {
    match tokens.get(pos) {
        None => Err(ExpressionError::UnexpectedEnd),
        Some(Token::Number(n)) => Ok((Expr::Number(*n), pos + 1)),
        Some(Token::LParen) => {
            check_depth(depth + 1)?;
            let (inner, new_pos) = parse_add_sub(tokens, pos + 1, depth + 1)?;
            match tokens.get(new_pos) {
                Some(Token::RParen) => Ok((inner, new_pos + 1)),
                Some(token) => Err(ExpressionError::UnexpectedToken {
                    token: token.to_string(),
                }),
                None => Err(ExpressionError::UnexpectedEnd),
            }
        }
        Some(token) => Err(ExpressionError::UnexpectedToken {
            token: token.to_string(),
        }),
    }
}
