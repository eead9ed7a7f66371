// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Stores
//!
//! Substitutes for the persistence collaborator.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use contentflow_core::{Query, Row, Store, StoreError, StoreResult};

// =============================================================================
// FailingStore
// =============================================================================

/// A store whose every call fails as if the backend were down.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

fn down() -> StoreError {
    StoreError::unavailable("connection refused")
}

#[async_trait]
impl Store for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn select(&self, _query: &Query) -> StoreResult<Vec<Row>> {
        Err(down())
    }

    async fn count(&self, _query: &Query) -> StoreResult<u64> {
        Err(down())
    }

    async fn insert(&self, _table: &str, _row: Row) -> StoreResult<Row> {
        Err(down())
    }

    async fn update(&self, _table: &str, _id: &str, _patch: Row) -> StoreResult<Option<Row>> {
        Err(down())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(down())
    }
}

// =============================================================================
// CountingStore
// =============================================================================

/// Wraps a store and counts reads per table.
///
/// Used to prove that a path never consulted a table.
pub struct CountingStore {
    inner: Arc<dyn Store>,
    reads: ReadCounts,
}

#[derive(Default)]
struct ReadCounts {
    users: AtomicUsize,
    workspaces: AtomicUsize,
    members: AtomicUsize,
    clients: AtomicUsize,
    content: AtomicUsize,
}

impl CountingStore {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn Store>) -> Self {
        Self {
            inner,
            reads: ReadCounts::default(),
        }
    }

    /// Number of reads against `table`.
    pub fn reads(&self, table: &str) -> usize {
        self.counter(table)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Number of reads against every table except `users`.
    pub fn resource_reads(&self) -> usize {
        use contentflow_core::tables::*;
        [WORKSPACES, WORKSPACE_MEMBERS, CLIENTS, CONTENT_ITEMS]
            .iter()
            .map(|t| self.reads(t))
            .sum()
    }

    fn counter(&self, table: &str) -> Option<&AtomicUsize> {
        use contentflow_core::tables::*;
        match table {
            USERS => Some(&self.reads.users),
            WORKSPACES => Some(&self.reads.workspaces),
            WORKSPACE_MEMBERS => Some(&self.reads.members),
            CLIENTS => Some(&self.reads.clients),
            CONTENT_ITEMS => Some(&self.reads.content),
            _ => None,
        }
    }

    fn record(&self, table: &str) {
        if let Some(counter) = self.counter(table) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Store for CountingStore {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        self.record(&query.table);
        self.inner.select(query).await
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        self.record(&query.table);
        self.inner.count(query).await
    }

    async fn get(&self, table: &str, id: &str) -> StoreResult<Option<Row>> {
        self.record(table);
        self.inner.get(table, id).await
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> StoreResult<Option<Row>> {
        self.inner.update(table, id, patch).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
}
