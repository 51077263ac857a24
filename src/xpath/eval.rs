//! Evaluation of compiled expressions against a context element.
//!
//! Functions here return bare cause strings; [`super::PathExpr`] wraps
//! them with the expression text.

use super::parser::{Expr, Function, LocationPath, Step};
use super::{NodeRef, ScalarValue};
use crate::xml::Element;

/// Node-set mode. Only location paths select node-sets; function calls
/// and literals are scalar-only.
pub(crate) fn select<'a>(expr: &Expr, context: &'a Element) -> Result<Vec<NodeRef<'a>>, String> {
    match expr {
        Expr::Path(path) => Ok(select_path(path, context)),
        Expr::Call(func, _) => Err(format!(
            "{}() yields a scalar, not a node-set",
            func.name()
        )),
        Expr::Literal(_) => Err("a literal does not select a node-set".to_string()),
    }
}

/// Scalar mode. Location paths coerce to the flattened text of their
/// first match (empty string if none), matching the string() coercion of
/// a node-set.
pub(crate) fn evaluate(expr: &Expr, context: &Element) -> Result<ScalarValue, String> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path(path) => Ok(ScalarValue::Text(first_text(path, context))),
        Expr::Call(func, args) => evaluate_call(*func, args, context),
    }
}

fn evaluate_call(func: Function, args: &[Expr], context: &Element) -> Result<ScalarValue, String> {
    match func {
        Function::True => Ok(ScalarValue::Bool(true)),
        Function::False => Ok(ScalarValue::Bool(false)),
        Function::Count => match &args[0] {
            Expr::Path(path) => Ok(ScalarValue::Number(select_path(path, context).len() as f64)),
            _ => Err("count() requires a node-set argument".to_string()),
        },
        Function::Boolean => Ok(ScalarValue::Bool(boolean_of(&args[0], context)?)),
        Function::Not => Ok(ScalarValue::Bool(!boolean_of(&args[0], context)?)),
        Function::String => {
            let value = evaluate(&args[0], context)?;
            Ok(ScalarValue::Text(value.to_canonical_string()))
        }
        Function::Number => Ok(ScalarValue::Number(number_of(&args[0], context)?)),
        Function::Concat => {
            let mut out = String::new();
            for arg in args {
                out.push_str(&evaluate(arg, context)?.to_canonical_string());
            }
            Ok(ScalarValue::Text(out))
        }
    }
}

/// Boolean coercion: a node-set is true when non-empty; a number when
/// non-zero and not NaN; a string when non-empty.
fn boolean_of(expr: &Expr, context: &Element) -> Result<bool, String> {
    if let Expr::Path(path) = expr {
        return Ok(!select_path(path, context).is_empty());
    }
    Ok(match evaluate(expr, context)? {
        ScalarValue::Bool(b) => b,
        ScalarValue::Number(n) => n != 0.0 && !n.is_nan(),
        ScalarValue::Text(t) => !t.is_empty(),
    })
}

/// Numeric coercion: strings parse as decimal (NaN on failure), booleans
/// map to 1 and 0.
fn number_of(expr: &Expr, context: &Element) -> Result<f64, String> {
    Ok(match evaluate(expr, context)? {
        ScalarValue::Number(n) => n,
        ScalarValue::Bool(true) => 1.0,
        ScalarValue::Bool(false) => 0.0,
        ScalarValue::Text(t) => t.trim().parse().unwrap_or(f64::NAN),
    })
}

fn first_text(path: &LocationPath, context: &Element) -> String {
    select_path(path, context)
        .first()
        .map(|n| n.text())
        .unwrap_or_default()
}

/// Walk a location path from the context element, in document order.
fn select_path<'a>(path: &LocationPath, context: &'a Element) -> Vec<NodeRef<'a>> {
    let mut current: Vec<&'a Element> = vec![context];

    for step in &path.steps {
        match step {
            Step::Current => {}
            Step::Child(test) => {
                current = current
                    .iter()
                    .flat_map(|el| el.child_elements())
                    .filter(|el| test.matches(&el.name))
                    .collect();
            }
            Step::Descendant(test) => {
                current = current
                    .iter()
                    .flat_map(|el| el.descendants())
                    .filter(|el| test.matches(&el.name))
                    .collect();
            }
            // The parser guarantees an attribute step is last.
            Step::Attribute(name) => {
                return current
                    .iter()
                    .flat_map(|el| el.attributes.iter().filter(|a| &a.name == name))
                    .map(NodeRef::Attribute)
                    .collect();
            }
        }
    }

    current.into_iter().map(NodeRef::Element).collect()
}
