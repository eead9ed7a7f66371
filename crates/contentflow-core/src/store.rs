// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persistence collaborator.
//!
//! The service never talks to a database driver directly. Everything goes
//! through [`Store`], a table-oriented interface that supports equality and
//! range filters, row lookup by id, and counts. Implementations are injected
//! as `Arc<dyn Store>`.

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;

/// A single row: a JSON object keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Table names.
pub mod tables {
    /// User accounts.
    pub const USERS: &str = "users";
    /// Workspaces.
    pub const WORKSPACES: &str = "workspaces";
    /// Workspace memberships.
    pub const WORKSPACE_MEMBERS: &str = "workspace_members";
    /// Client records.
    pub const CLIENTS: &str = "clients";
    /// Content items.
    pub const CONTENT_ITEMS: &str = "content_items";
}

// =============================================================================
// Store
// =============================================================================

/// Table-oriented persistence interface.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Returns the rows matching `query`.
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>>;

    /// Returns the number of rows matching `query`, ignoring limit and offset.
    async fn count(&self, query: &Query) -> StoreResult<u64>;

    /// Looks up a row by its `id` column.
    async fn get(&self, table: &str, id: &str) -> StoreResult<Option<Row>> {
        let query = Query::table(table).eq("id", id).limit(1);
        Ok(self.select(&query).await?.into_iter().next())
    }

    /// Inserts a row and returns it as stored.
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row>;

    /// Merges `patch` into the row with the given id.
    ///
    /// Returns `None` if no such row exists.
    async fn update(&self, table: &str, id: &str, patch: Row) -> StoreResult<Option<Row>>;

    /// Verifies that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

// =============================================================================
// Query
// =============================================================================

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl FilterOp {
    /// Returns the PostgREST operator name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
        }
    }

    /// Evaluates the operator against a stored value.
    ///
    /// A missing column only ever satisfies `Neq`.
    pub fn evaluate(&self, stored: Option<&Value>, expected: &Value) -> bool {
        let Some(stored) = stored else {
            return matches!(self, FilterOp::Neq);
        };

        match self {
            FilterOp::Eq => values_equal(stored, expected),
            FilterOp::Neq => !values_equal(stored, expected),
            FilterOp::Gt => compare_values(stored, expected) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                compare_values(stored, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => compare_values(stored, expected) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                compare_values(stored, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column name.
    pub column: String,
    /// Operator.
    pub op: FilterOp,
    /// Right-hand side.
    pub value: Value,
}

impl Filter {
    /// Returns `true` if the row satisfies this filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.op.evaluate(row.get(&self.column), &self.value)
    }
}

/// Result ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Column to order by.
    pub column: String,
    /// Descending if `true`.
    pub descending: bool,
}

/// A select/count query against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Table name.
    pub table: String,
    /// Filters, all of which must hold.
    pub filters: Vec<Filter>,
    /// Optional ordering.
    pub order: Option<Order>,
    /// Maximum number of rows.
    pub limit: Option<usize>,
    /// Number of rows to skip.
    pub offset: Option<usize>,
}

impl Query {
    /// Starts a query on `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
            offset: None,
        }
    }

    /// Adds a filter.
    pub fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Adds an equality filter.
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    /// Adds a greater-than-or-equal filter.
    pub fn gte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    /// Adds a less-than-or-equal filter.
    pub fn lte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    /// Orders ascending by `column`.
    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: false,
        });
        self
    }

    /// Orders descending by `column`.
    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: true,
        });
        self
    }

    /// Limits the number of rows returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` rows.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns `true` if the row satisfies every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

// =============================================================================
// Value comparison
// =============================================================================

fn values_equal(stored: &Value, expected: &Value) -> bool {
    match (stored, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        // Booleans and numbers often arrive as strings from query parameters.
        (Value::Bool(a), Value::String(b)) | (Value::String(b), Value::Bool(a)) => {
            b.parse::<bool>().ok() == Some(*a)
        }
        (Value::Number(a), Value::String(b)) | (Value::String(b), Value::Number(a)) => {
            b.parse::<f64>().ok() == a.as_f64()
        }
        _ => stored == expected,
    }
}

/// Orders two scalar JSON values. Mixed or non-scalar types are unordered.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::String(b)) => a.as_f64()?.partial_cmp(&b.parse::<f64>().ok()?),
        (Value::String(a), Value::Number(b)) => a.parse::<f64>().ok()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_eq_filter() {
        let r = row(json!({ "id": "a", "status": "active" }));
        assert!(Query::table("users").eq("status", "active").matches(&r));
        assert!(!Query::table("users").eq("status", "inactive").matches(&r));
    }

    #[test]
    fn test_missing_column() {
        let r = row(json!({ "id": "a" }));
        assert!(!Query::table("t").eq("status", "x").matches(&r));
        assert!(Query::table("t").filter("status", FilterOp::Neq, "x").matches(&r));
    }

    #[test]
    fn test_range_filters_on_timestamps() {
        let r = row(json!({ "created_at": "2025-03-10T12:00:00Z" }));
        assert!(
            Query::table("t")
                .gte("created_at", "2025-03-01T00:00:00Z")
                .lte("created_at", "2025-03-31T23:59:59Z")
                .matches(&r)
        );
        assert!(!Query::table("t").gte("created_at", "2025-04-01T00:00:00Z").matches(&r));
    }

    #[test]
    fn test_numeric_string_coercion() {
        let r = row(json!({ "likes": 42, "archived": false }));
        assert!(Query::table("t").eq("likes", "42").matches(&r));
        assert!(Query::table("t").filter("likes", FilterOp::Gt, 10).matches(&r));
        assert!(Query::table("t").eq("archived", "false").matches(&r));
    }

    #[test]
    fn test_builder() {
        let query = Query::table("content_items")
            .eq("creator_id", "u1")
            .order_desc("created_at")
            .limit(20)
            .offset(40);

        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.limit, Some(20));
        assert_eq!(query.offset, Some(40));
        assert!(query.order.as_ref().unwrap().descending);
    }
}
