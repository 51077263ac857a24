//! Conversion: projecting row nodes into records and driving whole
//! documents through the writer.

pub mod pipeline;
pub mod project;

pub use pipeline::{convert, ConvertSummary};
pub use project::project_record;
