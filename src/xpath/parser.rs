//! Parser for the path expression language.
//!
//! The language is a bounded XPath subset: location paths built from
//! element-name steps (`/title`, `//channel/item`, `*`, a final `@attr`,
//! `.` for the context node) plus a handful of scalar functions
//! (`count`, `boolean`, `not`, `string`, `number`, `concat`, `true`,
//! `false`) with string and numeric literals as arguments.
//!
//! Anything outside the subset, notably predicates (`[...]`), is rejected
//! at compile time.

use super::ScalarValue;

/// A compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Path(LocationPath),
    Call(Function, Vec<Expr>),
    Literal(ScalarValue),
}

/// A location path: ordered steps applied from the context node.
///
/// A leading `/` is context-relative (matching the reference mappings,
/// where `/title` selects a child of the row node).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocationPath {
    pub steps: Vec<Step>,
}

/// One step of a location path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    /// `.` - the context node itself. Only valid as the first step.
    Current,
    /// `/name` or a bare leading `name`.
    Child(NameTest),
    /// `//name` - any descendant.
    Descendant(NameTest),
    /// `@name` - an attribute. Only valid as the last step.
    Attribute(String),
}

/// Element name test for a step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NameTest {
    Name(String),
    Any,
}

impl NameTest {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Name(n) => n == name,
            Self::Any => true,
        }
    }
}

/// Scalar functions of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Count,
    Boolean,
    Not,
    String,
    Number,
    Concat,
    True,
    False,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Self::Count),
            "boolean" => Some(Self::Boolean),
            "not" => Some(Self::Not),
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "concat" => Some(Self::Concat),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Boolean => "boolean",
            Self::Not => "not",
            Self::String => "string",
            Self::Number => "number",
            Self::Concat => "concat",
            Self::True => "true",
            Self::False => "false",
        }
    }

    /// Check the argument count, returning a cause message on mismatch.
    fn check_arity(&self, argc: usize) -> Result<(), String> {
        let ok = match self {
            Self::True | Self::False => argc == 0,
            Self::Concat => argc >= 2,
            _ => argc == 1,
        };
        if ok {
            Ok(())
        } else {
            Err(match self {
                Self::True | Self::False => {
                    format!("{}() takes no arguments", self.name())
                }
                Self::Concat => "concat() requires at least two arguments".to_string(),
                _ => format!("{}() requires exactly one argument", self.name()),
            })
        }
    }
}

/// Parse an expression, returning a cause message on failure.
///
/// The caller wraps the cause together with the expression text into
/// [`crate::error::ExpressionError::Invalid`].
pub(crate) fn parse(src: &str) -> Result<Expr, String> {
    let mut parser = Parser { src, pos: 0 };
    parser.skip_ws();
    if parser.at_end() {
        return Err("empty expression".to_string());
    }
    let expr = parser.parse_expr()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(format!("unexpected character `{c}` at position {}", parser.pos));
    }
    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.skip_ws();
        match self.peek() {
            None => Err("unexpected end of expression".to_string()),
            Some('\'') | Some('"') => self.parse_string_literal(),
            Some(c) if c.is_ascii_digit() => self.parse_number_literal(),
            Some('/') | Some('@') | Some('.') | Some('*') => {
                Ok(Expr::Path(self.parse_path(None)?))
            }
            Some(c) if is_name_start(c) => {
                let name = self.parse_name();
                self.skip_ws();
                if self.peek() == Some('(') {
                    self.parse_call(&name)
                } else {
                    Ok(Expr::Path(self.parse_path(Some(name))?))
                }
            }
            Some(c) => Err(format!("unexpected character `{c}` at position {}", self.pos)),
        }
    }

    fn parse_string_literal(&mut self) -> Result<Expr, String> {
        let quote = self.bump().unwrap_or('\'');
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let text = self.src[start..self.pos].to_string();
                self.bump();
                return Ok(Expr::Literal(ScalarValue::Text(text)));
            }
            self.bump();
        }
        Err("unterminated string literal".to_string())
    }

    fn parse_number_literal(&mut self) -> Result<Expr, String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = &self.src[start..self.pos];
        let value: f64 = text
            .parse()
            .map_err(|_| format!("invalid number literal `{text}`"))?;
        Ok(Expr::Literal(ScalarValue::Number(value)))
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr, String> {
        let func = Function::lookup(name).ok_or_else(|| format!("unknown function `{name}`"))?;

        // Opening paren already peeked by the caller.
        self.bump();
        let mut args = Vec::new();
        self.skip_ws();
        if !self.eat(')') {
            loop {
                args.push(self.parse_expr()?);
                self.skip_ws();
                if self.eat(')') {
                    break;
                }
                if !self.eat(',') {
                    return Err(format!("expected `,` or `)` in {name}() arguments"));
                }
            }
        }
        func.check_arity(args.len())?;
        Ok(Expr::Call(func, args))
    }

    /// Parse a location path. `first` is a bare leading name already
    /// consumed by the caller.
    fn parse_path(&mut self, first: Option<String>) -> Result<LocationPath, String> {
        let mut steps = Vec::new();

        if let Some(name) = first {
            steps.push(Step::Child(NameTest::Name(name)));
        } else if self.eat('.') {
            steps.push(Step::Current);
        } else if self.peek() == Some('@') || self.peek() == Some('*') {
            steps.push(self.parse_step(false)?);
        }

        loop {
            if steps.is_empty() {
                // Leading separator of the whole path.
                if !self.eat('/') {
                    return Err("expected a path step".to_string());
                }
                let descendant = self.eat('/');
                steps.push(self.parse_step(descendant)?);
                continue;
            }
            if !self.eat('/') {
                break;
            }
            let descendant = self.eat('/');
            if matches!(steps.last(), Some(Step::Attribute(_))) {
                return Err("attribute step must be the last step".to_string());
            }
            steps.push(self.parse_step(descendant)?);
        }

        Ok(LocationPath { steps })
    }

    fn parse_step(&mut self, descendant: bool) -> Result<Step, String> {
        if self.eat('@') {
            if descendant {
                return Err("`//` cannot be followed by an attribute step".to_string());
            }
            if !matches!(self.peek(), Some(c) if is_name_start(c)) {
                return Err("expected an attribute name after `@`".to_string());
            }
            return Ok(Step::Attribute(self.parse_name()));
        }

        let test = if self.eat('*') {
            NameTest::Any
        } else if matches!(self.peek(), Some(c) if is_name_start(c)) {
            NameTest::Name(self.parse_name())
        } else {
            return Err(match self.peek() {
                Some(c) => format!("unexpected character `{c}` in path step"),
                None => "expected a step after `/`".to_string(),
            });
        };

        Ok(if descendant {
            Step::Descendant(test)
        } else {
            Step::Child(test)
        })
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == ':'
}
