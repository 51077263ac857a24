//! Error types for the XML to CSV conversion pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ConfigError`] - mapping configuration errors
//! - [`ExpressionError`] - path expression compile/evaluation errors
//! - [`DocumentError`] - malformed XML input errors
//! - [`SourceError`] - input resolution and transport errors
//! - [`ConvertError`] - top-level conversion errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Mapping Configuration Errors
// =============================================================================

/// Errors while loading or parsing the mapping configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Mapping location could not be read.
    #[error("Failed to read mapping: {0}")]
    Source(#[from] SourceError),

    /// Mapping bytes could not be read.
    #[error("Failed to read mapping: {0}")]
    Io(#[from] std::io::Error),

    /// Mapping is not valid JSON or does not match the expected shape.
    #[error("Malformed mapping configuration: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Path Expression Errors
// =============================================================================

/// Errors from compiling or evaluating a path expression.
///
/// Both variants carry the offending expression text so the failure can be
/// traced back to the mapping entry that declared it.
#[derive(Debug, Error)]
pub enum ExpressionError {
    /// Expression failed to compile.
    #[error("Invalid expression `{expr}`: {cause}")]
    Invalid { expr: String, cause: String },

    /// Compiled expression failed against a concrete node.
    #[error("Cannot evaluate `{expr}`: {cause}")]
    Evaluation { expr: String, cause: String },
}

impl ExpressionError {
    pub fn invalid(expr: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Invalid {
            expr: expr.into(),
            cause: cause.into(),
        }
    }

    pub fn evaluation(expr: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Evaluation {
            expr: expr.into(),
            cause: cause.into(),
        }
    }

    /// The expression text the error refers to.
    pub fn expr(&self) -> &str {
        match self {
            Self::Invalid { expr, .. } | Self::Evaluation { expr, .. } => expr,
        }
    }
}

// =============================================================================
// Document Errors
// =============================================================================

/// Errors while streaming rows out of an XML document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Input bytes are not well-formed XML (or the underlying read failed).
    #[error("Malformed XML in `{input}`: {cause}")]
    Malformed { input: String, cause: String },
}

impl DocumentError {
    pub fn malformed(input: impl Into<String>, cause: impl ToString) -> Self {
        Self::Malformed {
            input: input.into(),
            cause: cause.to_string(),
        }
    }
}

// =============================================================================
// Input Source Errors
// =============================================================================

/// Errors while resolving or opening input locations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Local path could not be accessed.
    #[error("Cannot read `{path}`: {message}")]
    Io { path: String, message: String },

    /// HTTP request failed.
    #[error("HTTP request failed for `{url}`: {message}")]
    Http { url: String, message: String },
}

impl SourceError {
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn http(url: impl Into<String>, err: impl ToString) -> Self {
        Self::Http {
            url: url.into(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the main error type returned by [`crate::convert::convert`].
/// It wraps all lower-level errors and adds conversion-specific variants.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Mapping configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Expression compile error.
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// A column expression failed against a row of a specific document.
    #[error("Failed to project row from `{input}`: {source}")]
    Projection {
        input: String,
        source: ExpressionError,
    },

    /// Malformed XML input.
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Input source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// CSV serialization error.
    #[error("Failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),

    /// Sink write error.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for expression operations.
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Result type for row streaming.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Result type for source resolution.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for conversion runs.
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ExpressionError -> ConvertError
        let expr_err = ExpressionError::invalid("item[", "unexpected character `[`");
        let convert_err: ConvertError = expr_err.into();
        assert!(convert_err.to_string().contains("item["));

        // DocumentError -> ConvertError
        let doc_err = DocumentError::malformed("feed.xml", "unclosed tag");
        let convert_err: ConvertError = doc_err.into();
        assert!(convert_err.to_string().contains("feed.xml"));

        // SourceError -> ConfigError -> ConvertError
        let src_err = SourceError::Io {
            path: "mapping.json".into(),
            message: "not found".into(),
        };
        let config_err: ConfigError = src_err.into();
        let convert_err: ConvertError = config_err.into();
        assert!(convert_err.to_string().contains("mapping.json"));
    }

    #[test]
    fn test_expression_error_carries_text() {
        let err = ExpressionError::evaluation("count('x')", "requires a node-set argument");
        assert_eq!(err.expr(), "count('x')");
        let msg = err.to_string();
        assert!(msg.contains("count('x')"));
        assert!(msg.contains("node-set"));
    }

    #[test]
    fn test_projection_error_format() {
        let err = ConvertError::Projection {
            input: "a.xml".into(),
            source: ExpressionError::evaluation("/title", "boom"),
        };
        let msg = err.to_string();
        assert!(msg.contains("a.xml"));
        assert!(msg.contains("/title"));
    }
}
