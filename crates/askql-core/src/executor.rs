//! Query execution against the relational store

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// A pre-populated, read-mostly relational store.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Execute a SQL statement and render its rows as text.
    /// An empty string means the statement returned no rows.
    async fn execute(&self, sql: &str) -> anyhow::Result<String>;

    /// Describe all tables and columns. Called once at startup.
    async fn describe_schema(&self) -> anyhow::Result<String>;
}

/// Runs cleaned SQL statements and returns their textual result
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn RelationalStore>,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self { store }
    }

    /// Execute `sql`; store errors propagate unchanged.
    pub async fn execute(&self, sql: &str) -> anyhow::Result<String> {
        debug!("Executing SQL: {}", sql);
        let result = self.store.execute(sql).await?;
        if result.trim().is_empty() {
            info!("Query returned no rows");
        } else {
            info!("Query returned {} bytes of results", result.len());
        }
        Ok(result)
    }
}
