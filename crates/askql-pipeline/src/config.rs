//! Pipeline configuration from environment variables.

use anyhow::{Context, Result};

use askql_core::TableSource;

pub const DEFAULT_TABLES: &str = "S_RBR=./data/S_RBR.csv";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Tables loaded into the store at startup.
    pub tables: Vec<TableSource>,
    /// Maximum rows the generated query is asked to return.
    pub result_cap: usize,
    /// Sample rows per table included in the schema description.
    pub sample_rows: usize,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let tables_spec =
            std::env::var("ASKQL_TABLES").unwrap_or_else(|_| DEFAULT_TABLES.to_string());
        let tables = TableSource::parse_list(&tables_spec).context("Invalid ASKQL_TABLES")?;
        if tables.is_empty() {
            anyhow::bail!("ASKQL_TABLES must name at least one table");
        }

        Ok(Self {
            tables,
            result_cap: std::env::var("ASKQL_RESULT_CAP")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid ASKQL_RESULT_CAP")?,
            sample_rows: std::env::var("ASKQL_SAMPLE_ROWS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("Invalid ASKQL_SAMPLE_ROWS")?,
        })
    }
}
