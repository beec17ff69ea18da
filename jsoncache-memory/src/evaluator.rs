//! Query expression evaluation for in-memory document filtering.
//!
//! This module provides the evaluation engine for query expressions. Every stored document
//! is checked in turn; there are no indexes.

use thiserror::Error;
use tracing::trace;

use jsoncache_core::{
    error::DocumentStoreError,
    query::{Expr, FieldOp, QueryVisitor},
    value::{Map, Value},
};

/// A value could not be read as a number for an operator clause.
///
/// Never leaves this module: a failed coercion simply fails the clause.
#[derive(Error, Debug, PartialEq)]
#[error("cannot coerce {0} to a number")]
pub(crate) struct CoercionError(&'static str);

/// Reads a value as a number for `$eq`, `$lte` and `$gte`.
///
/// Numbers are taken as is. Strings are read like a scanf `%f`: leading whitespace is
/// skipped, the longest leading decimal token is parsed, and anything after it is ignored,
/// so `"30 years"` reads as `30`. Everything else fails.
pub(crate) fn coerce_number(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Number(number) => Ok(*number),
        Value::String(text) => leading_number(text)
            .and_then(|token| token.parse::<f64>().ok())
            .ok_or(CoercionError("string")),
        other => Err(CoercionError(other.type_name())),
    }
}

/// Returns the sign, digits, fraction and exponent at the start of `text`.
///
/// An exponent marker is consumed even without digits after it, which makes the token
/// unparseable: `"1e"` does not coerce.
fn leading_number(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let skip_digits = |mut end: usize| {
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        end
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let integral_end = skip_digits(end);
    let mut digits = integral_end - end;
    end = integral_end;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = skip_digits(end + 1);
        digits += fraction_end - (end + 1);
        end = fraction_end;
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        end += 1;
        if matches!(bytes.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        end = skip_digits(end);
    }

    Some(&text[..end])
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Map,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Map) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> bool {
        self.visit_expr(expr).unwrap_or(false)
    }

    /// Returns copies of every object-shaped document matching `expr`.
    ///
    /// Documents that are not objects are skipped.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Value>,
        expr: &Expr,
    ) -> Vec<Value> {
        documents
            .into_iter()
            .filter(|doc| match doc.as_object() {
                Some(map) => DocumentEvaluator::new(map).evaluate(expr),
                None => false,
            })
            .cloned()
            .collect::<Vec<_>>()
    }

    fn compare(field_value: &Value, operand: &Value, op: &FieldOp) -> bool {
        let (left, right) = match (coerce_number(field_value), coerce_number(operand)) {
            (Ok(left), Ok(right)) => (left, right),
            (Err(err), _) | (_, Err(err)) => {
                trace!(op = %op, error = %err, "Operator clause failed numeric coercion");
                return false;
            }
        };

        match op {
            // Both sides must be numeric, but equality is checked on the original values.
            FieldOp::Eq => field_value == operand,
            FieldOp::Lte => left <= right,
            FieldOp::Gte => left >= right,
            FieldOp::Literal | FieldOp::Unrecognized(_) => false,
        }
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_exists(&mut self, field: &str) -> Result<Self::Output, Self::Error> {
        Ok(self.document.contains_key(field))
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Value) -> Result<Self::Output, Self::Error> {
        match self.document.get(field) {
            Some(field_value) => match op {
                FieldOp::Literal => Ok(field_value == value),
                FieldOp::Eq | FieldOp::Lte | FieldOp::Gte => {
                    Ok(DocumentEvaluator::compare(field_value, value, op))
                },
                FieldOp::Unrecognized(operator) => {
                    trace!(field, operator = %operator, "Ignoring unrecognized query operator");
                    Ok(true)
                },
            },
            None => Ok(false),
        }
    }
}
