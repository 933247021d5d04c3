//! Arithmetic expressions: lexer, recursive-descent parser and evaluator.
//!
//! Formulas that are not function calls have their cell references replaced
//! by the referenced values and are then handed to this module.
//!
//! GRAMMAR:
//!   expr   --> term ( ("+" | "-") term )*
//!   term   --> unary ( ("*" | "/") unary )*
//!   unary  --> ("-" | "+") unary | atom
//!   atom   --> NUMBER | "(" expr ")"

use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Nesting limit for parentheses and unary operators.
const MAX_DEPTH: usize = 256;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArithError {
    #[error("Unexpected character '{0}'")]
    IllegalChar(char),

    #[error("Malformed number '{0}'")]
    BadNumber(String),

    #[error("Expected {expected}, found {found:?}")]
    Unexpected { expected: &'static str, found: Token },

    #[error("Expression nested too deeply")]
    TooDeep,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NotFinite,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn apply(self, l: f64, r: f64) -> Result<f64, ArithError> {
        match self {
            BinaryOp::Add => Ok(l + r),
            BinaryOp::Sub => Ok(l - r),
            BinaryOp::Mul => Ok(l * r),
            BinaryOp::Div if r == 0.0 => Err(ArithError::DivisionByZero),
            BinaryOp::Div => Ok(l / r),
        }
    }
}

/// Syntax tree. Operator chains of one precedence level are kept flat
/// (`1-2+3` is one `Chain`), so tree depth only grows with parentheses and
/// unary signs, both bounded by `MAX_DEPTH`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    /// First operand, then each `(op, operand)` applied left to right.
    Chain(Box<Expr>, Vec<(BinaryOp, Expr)>),
}

struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    fn next_token(&mut self) -> Result<Token, ArithError> {
        while self.input.peek().is_some_and(|c| c.is_whitespace()) {
            self.input.next();
        }

        match self.input.next() {
            Some('+') => Ok(Token::Plus),
            Some('-') => Ok(Token::Minus),
            Some('*') => Ok(Token::Star),
            Some('/') => Ok(Token::Slash),
            Some('(') => Ok(Token::LParen),
            Some(')') => Ok(Token::RParen),
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),
            Some(ch) => Err(ArithError::IllegalChar(ch)),
            None => Ok(Token::Eof),
        }
    }

    /// Digits with an optional fraction and exponent (`1`, `2.5`, `.5`, `1e-3`).
    fn read_number(&mut self, first: char) -> Result<Token, ArithError> {
        let mut text = String::from(first);
        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.input.next();
            } else {
                break;
            }
        }
        if matches!(self.input.peek(), Some('e') | Some('E')) {
            text.push('e');
            self.input.next();
            if let Some(&sign) = self.input.peek() {
                if sign == '+' || sign == '-' {
                    text.push(sign);
                    self.input.next();
                }
            }
            while let Some(&ch) = self.input.peek() {
                if !ch.is_ascii_digit() {
                    break;
                }
                text.push(ch);
                self.input.next();
            }
        }
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ArithError::BadNumber(text))
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ArithError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ArithError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn parse(mut self) -> Result<Expr, ArithError> {
        let expr = self.parse_expr()?;
        if self.current != Token::Eof {
            return Err(ArithError::Unexpected {
                expected: "end of expression",
                found: self.current,
            });
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr, ArithError> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.current {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            rest.push((op, self.parse_term()?));
        }
        Ok(chain(first, rest))
    }

    fn parse_term(&mut self) -> Result<Expr, ArithError> {
        let first = self.parse_unary()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.current {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance()?;
            rest.push((op, self.parse_unary()?));
        }
        Ok(chain(first, rest))
    }

    fn parse_unary(&mut self) -> Result<Expr, ArithError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ArithError::TooDeep);
        }
        let expr = match self.current {
            Token::Minus => {
                self.advance()?;
                Expr::Neg(Box::new(self.parse_unary()?))
            }
            Token::Plus => {
                self.advance()?;
                self.parse_unary()?
            }
            _ => self.parse_atom()?,
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expr, ArithError> {
        match self.current {
            Token::Number(n) => {
                self.advance()?;
                Ok(Expr::Number(n))
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                if self.current != Token::RParen {
                    return Err(ArithError::Unexpected {
                        expected: "')'",
                        found: self.current.clone(),
                    });
                }
                self.advance()?;
                Ok(inner)
            }
            _ => Err(ArithError::Unexpected {
                expected: "a number or '('",
                found: self.current.clone(),
            }),
        }
    }
}

fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Chain(Box::new(first), rest)
    }
}

/// Parse an arithmetic expression into its syntax tree.
pub fn parse_expression(input: &str) -> Result<Expr, ArithError> {
    Parser::new(input)?.parse()
}

impl Expr {
    pub fn eval(&self) -> Result<f64, ArithError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Neg(inner) => Ok(-inner.eval()?),
            Expr::Chain(first, rest) => rest
                .iter()
                .try_fold(first.eval()?, |acc, (op, operand)| op.apply(acc, operand.eval()?)),
        }
    }
}

/// Parse and evaluate `input`, rejecting non-finite results.
pub fn eval_arithmetic(input: &str) -> Result<f64, ArithError> {
    let value = parse_expression(input)?.eval()?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArithError::NotFinite)
    }
}
