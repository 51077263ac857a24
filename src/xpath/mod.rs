//! Path expression compilation and evaluation.
//!
//! Expressions come in two modes:
//!
//! - **Node-set mode** ([`PathExpr::select`]): a location path resolved
//!   relative to a context element, returning matches in document order.
//!   No match is an empty result, not an error.
//! - **Scalar mode** ([`PathExpr::evaluate`]): the full expression
//!   language including aggregate functions, returning a single
//!   [`ScalarValue`].
//!
//! Compilation failures and evaluation failures both carry the original
//! expression text, see [`crate::error::ExpressionError`].

pub(crate) mod eval;
pub(crate) mod parser;

use std::fmt;

use crate::error::{ExpressionError, ExpressionResult};
use crate::xml::{Attribute, Element};

/// A typed scalar result from evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ScalarValue {
    /// Canonical textual form, fixed across platforms: booleans are
    /// lowercase `true`/`false`, numbers use the shortest decimal form
    /// (`2`, not `2.0`).
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(t) => t.clone(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

/// A reference to a selected node: an element or one of its attributes.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Element(&'a Element),
    Attribute(&'a Attribute),
}

impl NodeRef<'_> {
    /// Flattened text content of the node: the subtree text of an
    /// element, or the value of an attribute.
    pub fn text(&self) -> String {
        match self {
            Self::Element(el) => el.inner_text(),
            Self::Attribute(attr) => attr.value.clone(),
        }
    }
}

/// A compiled path expression.
///
/// Immutable once compiled; shared read-only across all rows of a run.
#[derive(Debug, Clone)]
pub struct PathExpr {
    text: String,
    pub(crate) expr: parser::Expr,
}

impl PathExpr {
    /// Compile an expression string.
    pub fn compile(text: &str) -> ExpressionResult<Self> {
        let expr = parser::parse(text).map_err(|cause| ExpressionError::invalid(text, cause))?;
        Ok(Self {
            text: text.to_string(),
            expr,
        })
    }

    /// The original expression text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Node-set mode: matches in document order relative to `context`.
    pub fn select<'a>(&self, context: &'a Element) -> ExpressionResult<Vec<NodeRef<'a>>> {
        eval::select(&self.expr, context)
            .map_err(|cause| ExpressionError::evaluation(&self.text, cause))
    }

    /// Scalar mode: evaluate to a single typed value.
    pub fn evaluate(&self, context: &Element) -> ExpressionResult<ScalarValue> {
        eval::evaluate(&self.expr, context)
            .map_err(|cause| ExpressionError::evaluation(&self.text, cause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_bool() {
        assert_eq!(ScalarValue::Bool(true).to_canonical_string(), "true");
        assert_eq!(ScalarValue::Bool(false).to_canonical_string(), "false");
    }

    #[test]
    fn test_canonical_number() {
        assert_eq!(ScalarValue::Number(2.0).to_canonical_string(), "2");
        assert_eq!(ScalarValue::Number(2.5).to_canonical_string(), "2.5");
        assert_eq!(ScalarValue::Number(0.0).to_canonical_string(), "0");
        assert_eq!(ScalarValue::Number(f64::NAN).to_canonical_string(), "NaN");
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(
            ScalarValue::Text("value2,xx".into()).to_canonical_string(),
            "value2,xx"
        );
    }

    #[test]
    fn test_compile_failure_carries_expression() {
        let err = PathExpr::compile("item[").unwrap_err();
        assert!(matches!(err, ExpressionError::Invalid { .. }));
        assert!(err.to_string().contains("item["));
    }

    #[test]
    fn test_compile_keeps_text() {
        let expr = PathExpr::compile("//item/title").unwrap();
        assert_eq!(expr.as_str(), "//item/title");
    }
}
