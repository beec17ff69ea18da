//! Query representation and the visitor used to evaluate it.
//!
//! Queries arrive as object-shaped [`Value`]s and are parsed into an [`Expr`] tree:
//!
//! ```text
//! {"name": "Alice", "age": {"$gte": 20}}
//! ```
//!
//! becomes an AND of a literal equality on `name`, an existence check on `age`, and a
//! `$gte` comparison on `age`. Every top-level key is conjoined; there is no OR or NOT.
//!
//! # Operators
//!
//! - A non-object query value is a literal and requires deep equality.
//! - An object query value is an operator clause. Each of its keys is one of `$eq`, `$lte`
//!   or `$gte`. Any other key parses to [`FieldOp::Unrecognized`], which backends treat as
//!   satisfied. The field itself must still exist.
//!
//! Because every object value is read as an operator clause, a query cannot match an
//! embedded object literally.
//!
//! # Building queries in code
//!
//! ```ignore
//! use jsoncache_core::query::{Filter, Query};
//!
//! let query = Query::new(Filter::eq("name", "Alice").and(Filter::gte("age", 20)));
//! ```

use std::fmt;

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    value::Value,
};

/// Comparison applied by a field clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Deep structural equality with a literal query value.
    Literal,
    /// `$eq`: both sides must coerce to numbers, then the original values must be equal.
    Eq,
    /// `$lte`: numeric less-than-or-equal after coercion.
    Lte,
    /// `$gte`: numeric greater-than-or-equal after coercion.
    Gte,
    /// Any other `$`-key inside an operator clause. Always satisfied.
    Unrecognized(String),
}

impl FieldOp {
    /// Maps an operator key of an operator clause to its [`FieldOp`].
    pub fn from_operator(key: &str) -> Self {
        match key {
            "$eq" => FieldOp::Eq,
            "$lte" => FieldOp::Lte,
            "$gte" => FieldOp::Gte,
            other => FieldOp::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for FieldOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldOp::Literal => f.write_str("literal"),
            FieldOp::Eq => f.write_str("$eq"),
            FieldOp::Lte => f.write_str("$lte"),
            FieldOp::Gte => f.write_str("$gte"),
            FieldOp::Unrecognized(key) => f.write_str(key),
        }
    }
}

/// A filter expression over a single document.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions. An empty list matches every document.
    And(Vec<Expr>),
    /// The field must be present.
    Exists(String),
    /// Field comparison expression.
    Field {
        /// The top-level field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The operand taken from the query.
        value: Value,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Value) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }
}

/// A parsed query ready to be evaluated by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Filter every returned document satisfies.
    pub filter: Expr,
}

impl Query {
    /// Creates a query from a filter expression.
    pub fn new(filter: Expr) -> Self {
        Query { filter }
    }

    /// A query matching every object-shaped document.
    pub fn all() -> Self {
        Query { filter: Expr::And(Vec::new()) }
    }

    /// Parses a query document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidDocument`] if `query` is not an object.
    pub fn from_value(query: &Value) -> DocumentStoreResult<Self> {
        let map = query.as_object().ok_or_else(|| {
            DocumentStoreError::InvalidDocument(format!(
                "query must be an object, found {}",
                query.type_name()
            ))
        })?;

        let mut clauses = Vec::with_capacity(map.len());

        for (field, operand) in map {
            match operand {
                Value::Object(operators) => {
                    clauses.push(Expr::Exists(field.clone()));

                    for (operator, value) in operators {
                        clauses.push(Expr::field(
                            field.clone(),
                            FieldOp::from_operator(operator),
                            value.clone(),
                        ));
                    }
                }
                literal => clauses.push(Expr::field(
                    field.clone(),
                    FieldOp::Literal,
                    literal.clone(),
                )),
            }
        }

        Ok(Query { filter: Expr::And(clauses) })
    }
}

impl TryFrom<&Value> for Query {
    type Error = DocumentStoreError;

    fn try_from(value: &Value) -> DocumentStoreResult<Self> {
        Query::from_value(value)
    }
}

impl Default for Query {
    fn default() -> Self {
        Query::all()
    }
}

/// Helper struct for constructing filter expressions.
///
/// Produces the same expressions [`Query::from_value`] does, without going through a
/// query document.
pub struct Filter;

impl Filter {
    /// Deep equality with a literal value.
    pub fn literal(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Literal, value.into())
    }

    /// `$eq` comparison. Only matches numerically coercible values.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// `$lte` comparison.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// `$gte` comparison.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Field presence check.
    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into())
    }

    /// Logical AND of all given expressions.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }
}

/// Walks an [`Expr`] tree on behalf of a backend.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_exists(&mut self, field: &str) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Value,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Exists(field) => self.visit_exists(field),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
