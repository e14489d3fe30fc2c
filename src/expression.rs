// src/expression.rs
use crate::errors::{FormulaError, Result};
use crate::parser::Parser;

/// Deepest nesting of parentheses and unary signs accepted.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Neg(Box<Expr>),
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
}

impl Expr {
    /// IEEE-754 evaluation. Division by zero yields an infinity or NaN,
    /// rejecting those is the caller's job.
    pub fn eval(&self) -> f64 {
        match self {
            Expr::Num(n) => *n,
            Expr::Neg(inner) => -inner.eval(),
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (lhs.eval(), rhs.eval());
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                }
            }
        }
    }
}

/// Parse a purely numeric arithmetic string such as `100 - (40 * 2)`.
pub fn parse_expr(input: &str) -> Result<Expr> {
    let mut p = EParser::new(input);
    let node = p.parse_sum()?;
    p.parser.skip_ws();
    if !p.parser.eof() {
        return Err(p.parser.error("unexpected trailing input"));
    }
    Ok(node)
}

/// Parse and evaluate in one step.
pub fn eval_str(input: &str) -> Result<f64> {
    Ok(parse_expr(input)?.eval())
}

struct EParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> EParser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            parser: Parser::new(s),
            depth: 0,
        }
    }

    // sum := product (('+' | '-') product)*
    fn parse_sum(&mut self) -> Result<Expr> {
        let mut left = self.parse_product()?;
        loop {
            self.parser.skip_ws();
            let op = if self.parser.consume_char('+') {
                BinOp::Add
            } else if self.parser.consume_char('-') {
                BinOp::Sub
            } else {
                break;
            };
            let right = self.parse_product()?;
            left = Expr::Binary { op, lhs: Box::new(left), rhs: Box::new(right) };
        }
        Ok(left)
    }

    // product := unary (('*' | '/') unary)*
    fn parse_product(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            self.parser.skip_ws();
            let op = if self.parser.consume_char('*') {
                BinOp::Mul
            } else if self.parser.consume_char('/') {
                BinOp::Div
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expr::Binary { op, lhs: Box::new(left), rhs: Box::new(right) };
        }
        Ok(left)
    }

    // unary := ('+' | '-') unary | primary
    fn parse_unary(&mut self) -> Result<Expr> {
        self.parser.skip_ws();
        if self.parser.consume_char('-') {
            let inner = self.nested(Self::parse_unary)?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.parser.consume_char('+') {
            return self.nested(Self::parse_unary);
        }
        self.parse_primary()
    }

    // primary := number | '(' sum ')'
    fn parse_primary(&mut self) -> Result<Expr> {
        self.parser.skip_ws();
        if self.parser.consume_char('(') {
            let inner = self.nested(Self::parse_sum)?;
            self.parser.skip_ws();
            if !self.parser.consume_char(')') {
                return Err(self.parser.error("unbalanced parentheses: expected ')'"));
            }
            return Ok(inner);
        }
        match self.parser.peek_char() {
            Some(c) if c.is_ascii_digit() || c == '.' => Ok(Expr::Num(self.parser.parse_number_literal()?)),
            Some(_) => Err(self.parser.error("expected a number or '('")),
            None => Err(self.parser.error("unexpected end of formula")),
        }
    }

    fn nested(&mut self, f: fn(&mut Self) -> Result<Expr>) -> Result<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::Syntax(format!("nesting deeper than {MAX_DEPTH}")));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }
}
