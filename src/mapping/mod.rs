//! Mapping configuration: which nodes become rows and which expressions
//! become columns.
//!
//! A mapping is loaded once per run from a JSON document:
//!
//! ```json
//! {
//!   "rowsPath": "//item",
//!   "columns": [
//!     { "header": "title", "valuePath": "/title" },
//!     { "header": "has_value", "valuePath": "boolean(/value)", "useEvaluate": true }
//!   ]
//! }
//! ```
//!
//! It is compiled into a [`CompiledMapping`] before any document is
//! opened, so malformed expressions abort the run up front. The compiled
//! form is immutable and shared read-only across all documents and rows.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, ExpressionResult};
use crate::source;
use crate::xml::stream::RowPattern;
use crate::xpath::PathExpr;

/// One output column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Header text, emitted verbatim. Uniqueness is not enforced.
    pub header: String,

    /// Extraction expression, relative to the row node.
    pub value_path: String,

    /// When true, `valuePath` is evaluated as a scalar function
    /// (count, boolean, ...) instead of selecting a node.
    #[serde(default)]
    pub use_evaluate: bool,
}

impl Column {
    /// Create a node-text column.
    pub fn new(header: impl Into<String>, value_path: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            value_path: value_path.into(),
            use_evaluate: false,
        }
    }

    /// Mark the column as scalar-evaluated.
    pub fn evaluated(mut self) -> Self {
        self.use_evaluate = true;
        self
    }
}

/// A complete mapping: row selection plus ordered columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Path selecting the row nodes.
    pub rows_path: String,

    /// Ordered output columns. May be empty, producing a header-only
    /// record per row.
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Mapping {
    pub fn new(rows_path: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            rows_path: rows_path.into(),
            columns,
        }
    }

    /// Parse a mapping from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Header record, in column order.
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    /// Compile the rows path and every column expression.
    ///
    /// Any malformed expression fails here, before a single document is
    /// read.
    pub fn compile(&self) -> ExpressionResult<CompiledMapping> {
        let rows = RowPattern::compile(&self.rows_path)?;
        let columns = self
            .columns
            .iter()
            .map(|c| {
                Ok(CompiledColumn {
                    header: c.header.clone(),
                    expr: PathExpr::compile(&c.value_path)?,
                    use_evaluate: c.use_evaluate,
                })
            })
            .collect::<ExpressionResult<Vec<_>>>()?;
        Ok(CompiledMapping { rows, columns })
    }
}

/// A column with its expression compiled.
#[derive(Debug, Clone)]
pub struct CompiledColumn {
    pub header: String,
    pub expr: PathExpr,
    pub use_evaluate: bool,
}

/// A mapping ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledMapping {
    pub rows: RowPattern,
    pub columns: Vec<CompiledColumn>,
}

/// Load a mapping from a local path or an HTTP(S) URL.
pub fn load_mapping(location: &str) -> ConfigResult<Mapping> {
    let mut reader = source::open(location)?;
    let mut json = String::new();
    reader.read_to_string(&mut json)?;
    Mapping::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RSS_MAPPING: &str = r#"{
        "rowsPath": "//item",
        "columns": [
            { "header": "title", "valuePath": "/title" },
            { "header": "link", "valuePath": "/link" },
            { "header": "has_value", "valuePath": "boolean(/value)", "useEvaluate": true }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let mapping = Mapping::from_json(RSS_MAPPING).unwrap();
        assert_eq!(mapping.rows_path, "//item");
        assert_eq!(mapping.columns.len(), 3);
        assert_eq!(mapping.headers(), vec!["title", "link", "has_value"]);
        assert!(!mapping.columns[0].use_evaluate);
        assert!(mapping.columns[2].use_evaluate);
    }

    #[test]
    fn test_use_evaluate_defaults_to_false() {
        let mapping =
            Mapping::from_json(r#"{"rowsPath": "//a", "columns": [{"header": "h", "valuePath": "/b"}]}"#)
                .unwrap();
        assert!(!mapping.columns[0].use_evaluate);
    }

    #[test]
    fn test_columns_may_be_empty() {
        let mapping = Mapping::from_json(r#"{"rowsPath": "//a"}"#).unwrap();
        assert!(mapping.columns.is_empty());
        assert!(mapping.compile().is_ok());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(Mapping::from_json("{").is_err());
        assert!(Mapping::from_json(r#"{"columns": []}"#).is_err());
    }

    #[test]
    fn test_compile_rejects_bad_rows_path() {
        let mapping = Mapping::new("item[", vec![]);
        let err = mapping.compile().unwrap_err();
        assert!(err.to_string().contains("item["));
    }

    #[test]
    fn test_compile_rejects_bad_column_path() {
        let mapping = Mapping::new("//item", vec![Column::new("h", "count(")]);
        let err = mapping.compile().unwrap_err();
        assert!(err.to_string().contains("count("));
    }

    #[test]
    fn test_load_mapping_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RSS_MAPPING.as_bytes()).unwrap();

        let mapping = load_mapping(file.path().to_str().unwrap()).unwrap();
        assert_eq!(mapping.rows_path, "//item");
        assert_eq!(mapping.columns.len(), 3);
    }

    #[test]
    fn test_load_mapping_missing_file() {
        assert!(load_mapping("/nonexistent/mapping.json").is_err());
    }
}
