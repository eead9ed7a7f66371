// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store.
//!
//! Holds every table in process memory. Used by the development profile and
//! throughout the test suites; it honours the same filter semantics as the
//! REST backend.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::store::{Query, Row, Store, compare_values};

/// Thread-safe in-memory [`Store`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from a seed document of the form `{ "table": [rows] }`.
    pub fn from_seed(seed: Value) -> StoreResult<Self> {
        let store = Self::new();
        store.load_seed(seed)?;
        Ok(store)
    }

    /// Creates a store from a JSON seed file.
    pub fn from_seed_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::unavailable(format!("Failed to read seed file {}: {}", path.display(), e))
        })?;
        let seed: Value = serde_json::from_str(&content)
            .map_err(|e| StoreError::decode("seed", e.to_string()))?;

        let store = Self::from_seed(seed)?;
        info!(path = %path.display(), rows = store.len(), "Loaded seed data");
        Ok(store)
    }

    /// Appends every table of a seed document.
    pub fn load_seed(&self, seed: Value) -> StoreResult<()> {
        let Value::Object(tables) = seed else {
            return Err(StoreError::decode("seed", "seed document must be an object"));
        };

        let mut guard = self.tables.write();
        for (table, rows) in tables {
            let Value::Array(rows) = rows else {
                return Err(StoreError::decode(table, "table must be an array of rows"));
            };
            let target = guard.entry(table.clone()).or_default();
            for row in rows {
                match row {
                    Value::Object(row) => target.push(row),
                    _ => return Err(StoreError::decode(table, "row must be an object")),
                }
            }
        }
        Ok(())
    }

    /// Inserts a row as-is, with no id or column checks. Intended for fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if `row` is not a JSON object.
    pub fn put(&self, table: &str, row: Value) -> StoreResult<()> {
        let Value::Object(row) = row else {
            return Err(StoreError::decode(table, "row must be an object"));
        };
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    /// Returns the total number of rows across all tables.
    pub fn len(&self) -> usize {
        self.tables.read().values().map(Vec::len).sum()
    }

    /// Returns `true` if no table holds any row.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        let guard = self.tables.read();
        let Some(rows) = guard.get(&query.table) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Row> = rows.iter().filter(|r| query.matches(r)).cloned().collect();

        if let Some(order) = &query.order {
            matched.sort_by(|a, b| {
                let ordering = match (a.get(&order.column), b.get(&order.column)) {
                    (Some(a), Some(b)) => compare_values(a, b).unwrap_or(std::cmp::Ordering::Equal),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        let page: Vec<Row> = matched.into_iter().skip(offset).take(limit).collect();

        debug!(table = %query.table, rows = page.len(), "memory select");
        Ok(page)
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        let guard = self.tables.read();
        let count = guard
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert(&self, table: &str, mut row: Row) -> StoreResult<Row> {
        let id = match row.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(_) => return Err(StoreError::invalid_query("id must be a string")),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                row.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut guard = self.tables.write();
        let rows = guard.entry(table.to_string()).or_default();
        if rows
            .iter()
            .any(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str()))
        {
            return Err(StoreError::conflict(table, format!("duplicate id {}", id)));
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> StoreResult<Option<Row>> {
        let mut guard = self.tables.write();
        let Some(rows) = guard.get_mut(table) else {
            return Ok(None);
        };

        let Some(row) = rows
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
        else {
            return Ok(None);
        };

        for (column, value) in patch {
            if column != "id" {
                row.insert(column, value);
            }
        }
        Ok(Some(row.clone()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
