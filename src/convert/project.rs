//! Record projection: one row node in, one ordered record out.

use crate::error::ExpressionResult;
use crate::mapping::CompiledColumn;
use crate::xml::Element;

/// Evaluate every column against a row node, in column order.
///
/// Node-text columns take the flattened text of the first match (empty
/// string when nothing matches); evaluate columns return the canonical
/// string of their scalar result. The first failing column aborts the
/// row; no partial record is produced.
pub fn project_record(row: &Element, columns: &[CompiledColumn]) -> ExpressionResult<Vec<String>> {
    columns
        .iter()
        .map(|column| project_field(row, column))
        .collect()
}

fn project_field(row: &Element, column: &CompiledColumn) -> ExpressionResult<String> {
    if column.use_evaluate {
        Ok(column.expr.evaluate(row)?.to_canonical_string())
    } else {
        Ok(column
            .expr
            .select(row)?
            .first()
            .map(|node| node.text())
            .unwrap_or_default())
    }
}
