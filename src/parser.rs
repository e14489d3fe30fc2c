// src/parser.rs
use crate::errors::{FormulaError, Result};

/// Byte cursor over an ASCII arithmetic string.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Unsigned decimal literal: `12`, `1.5`, `.5` or `5.`.
    /// Signs are unary operators and handled by the expression parser.
    pub fn parse_number_literal(&mut self) -> Result<f64> {
        let start = self.i;
        let int_digits = self.skip_digits();
        let mut frac_digits = 0;
        if self.peek_char() == Some('.') {
            self.i += 1;
            frac_digits = self.skip_digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            self.i = start;
            return Err(self.error("number expected"));
        }
        let s = &self.s[start..self.i];
        // `str::parse::<f64>` rejects a bare trailing dot.
        let s = s.strip_suffix('.').unwrap_or(s);
        s.parse::<f64>()
            .map_err(|_| FormulaError::Syntax(format!("bad number `{s}`")))
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        self.i - start
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Syntax error annotated with the current position.
    pub fn error(&self, msg: &str) -> FormulaError {
        match self.peek_char() {
            Some(c) => FormulaError::Syntax(format!("{msg} at offset {}, found '{c}'", self.i)),
            None => FormulaError::Syntax(format!("{msg} at end of input")),
        }
    }
}
