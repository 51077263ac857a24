//! # xml2csv - project XML documents into CSV records
//!
//! xml2csv flattens semi-structured XML into delimited text according to
//! a declarative JSON mapping: a row-selecting path plus an ordered list
//! of column extraction expressions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  XML input  │────▶│  Row stream  │────▶│  Projector  │────▶│  CSV output │
//! │ (file/URL)  │     │ (streaming)  │     │ (mapping)   │     │ (CRLF/BOM)  │
//! └─────────────┘     └──────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! Documents are never parsed whole: the row stream materializes one row
//! subtree at a time, so memory use stays bounded for arbitrarily large
//! inputs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use xml2csv::{convert, Column, Mapping};
//!
//! let mapping = Mapping::new(
//!     "//item",
//!     vec![Column::new("title", "/title"), Column::new("link", "/link")],
//! );
//! let mut out = Vec::new();
//! convert(&["feed.xml".to_string()], &mapping, &mut out, false)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - hierarchical error types
//! - [`mapping`] - mapping configuration and compilation
//! - [`xpath`] - path expression compiler and evaluator
//! - [`xml`] - element trees and the streaming row selector
//! - [`writer`] - CSV record writer
//! - [`convert`] - record projection and conversion pipeline
//! - [`source`] - input resolution (file, directory, URL)

// Core modules
pub mod error;

// Mapping configuration
pub mod mapping;

// Path expressions
pub mod xpath;

// XML trees and streaming
pub mod xml;

// CSV output
pub mod writer;

// Conversion pipeline
pub mod convert;

// Input resolution
pub mod source;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConvertError, ConvertResult, DocumentError, ExpressionError, SourceError,
};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{load_mapping, Column, CompiledColumn, CompiledMapping, Mapping};

// =============================================================================
// Re-exports - Expressions
// =============================================================================

pub use xpath::{NodeRef, PathExpr, ScalarValue};

// =============================================================================
// Re-exports - XML
// =============================================================================

pub use xml::stream::{RowPattern, RowStream};
pub use xml::Element;

// =============================================================================
// Re-exports - Writer
// =============================================================================

pub use writer::RecordWriter;

// =============================================================================
// Re-exports - Conversion
// =============================================================================

pub use convert::{convert, project_record, ConvertSummary};
