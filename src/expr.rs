//! Arithmetic expression parsing and vectorized evaluation.
//!
//! Thickness specs may be given as a pure arithmetic formula over field
//! names and numeric literals (`+ - * /`, parentheses). The formula is
//! parsed once, at plan-load time, into an [`Expr`] tree; evaluation against
//! a mesh happens once per `drape` call and is fully vectorized.

use ndarray::Array1;

use crate::error::{DrapeError, DrapeResult};
use crate::mesh::Mesh;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Field(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parses a formula string into an expression tree.
    pub fn parse(source: &str) -> DrapeResult<Expr> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            source,
        };
        let expr = parser.parse_expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(DrapeError::ParseError {
                expr: source.to_string(),
                reason: "trailing tokens after a complete expression".to_string(),
            });
        }
        Ok(expr)
    }

    /// Every field name referenced anywhere in the expression tree.
    pub fn referenced_fields(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<String>) {
        match self {
            Expr::Const(_) => {}
            Expr::Field(name) => out.push(name.clone()),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) => {
                l.collect_fields(out);
                r.collect_fields(out);
            }
        }
    }

    /// Vectorized evaluation over a mesh's cell fields.
    pub fn evaluate(&self, mesh: &dyn Mesh) -> DrapeResult<Array1<f64>> {
        match self {
            Expr::Const(v) => Ok(Array1::from_elem(mesh.num_cells(), *v)),
            Expr::Field(name) => mesh.cell_field(name),
            Expr::Add(l, r) => Ok(l.evaluate(mesh)? + r.evaluate(mesh)?),
            Expr::Sub(l, r) => Ok(l.evaluate(mesh)? - r.evaluate(mesh)?),
            Expr::Mul(l, r) => Ok(l.evaluate(mesh)? * r.evaluate(mesh)?),
            Expr::Div(l, r) => {
                // Division by zero is surfaced as +/-inf or NaN, not masked.
                Ok(l.evaluate(mesh)? / r.evaluate(mesh)?)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> DrapeResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| DrapeError::ParseError {
                    expr: source.to_string(),
                    reason: format!("invalid numeric literal '{text}'"),
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(text));
            }
            other => {
                return Err(DrapeError::ParseError {
                    expr: source.to_string(),
                    reason: format!("unexpected character '{other}'"),
                })
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn fail(&self, reason: &str) -> DrapeError {
        DrapeError::ParseError {
            expr: self.source.to_string(),
            reason: reason.to_string(),
        }
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> DrapeResult<Expr> {
        let mut node = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    node = Expr::Add(Box::new(node), Box::new(rhs));
                }
                Some(Token::Minus) => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    node = Expr::Sub(Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    // term := factor (('*' | '/') factor)*
    fn parse_term(&mut self) -> DrapeResult<Expr> {
        let mut node = self.parse_factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    let rhs = self.parse_factor()?;
                    node = Expr::Mul(Box::new(node), Box::new(rhs));
                }
                Some(Token::Slash) => {
                    self.bump();
                    let rhs = self.parse_factor()?;
                    node = Expr::Div(Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    // factor := '-' factor | number | ident | '(' expr ')'
    fn parse_factor(&mut self) -> DrapeResult<Expr> {
        match self.bump().cloned() {
            Some(Token::Number(v)) => Ok(Expr::Const(v)),
            Some(Token::Ident(name)) => Ok(Expr::Field(name)),
            Some(Token::Minus) => {
                let inner = self.parse_factor()?;
                Ok(Expr::Sub(Box::new(Expr::Const(0.0)), Box::new(inner)))
            }
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.fail("expected closing parenthesis")),
                }
            }
            _ => Err(self.fail("expected a number, field name, or '('")),
        }
    }
}
