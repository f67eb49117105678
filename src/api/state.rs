//! Shared state for the Web API server.
//!
//! Holds the database pool. Built once at startup and cloned into every
//! request through axum's `State` extractor.

use rusqlite::Transaction;

use super::error::ApiError;
use crate::error::TodoError;
use crate::storage::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// One request-scoped unit of work: a pooled connection and a transaction.
    pub async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Transaction<'_>) -> Result<T, ApiError> + Send + 'static,
    {
        self.db.unit_of_work(f).await
    }

    /// Like [`AppState::run`] for closures that only hit the store.
    pub async fn query<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Transaction<'_>) -> Result<T, TodoError> + Send + 'static,
    {
        self.db
            .unit_of_work(move |tx| f(tx).map_err(ApiError::from))
            .await
    }
}
