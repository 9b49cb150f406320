//! Read-only query engine built on DataFusion

use arrow::util::pretty::pretty_format_batches;
use async_trait::async_trait;
use datafusion::common::TableReference;
use datafusion::error::Result as DFResult;
use datafusion::execution::context::SQLOptions;
use datafusion::prelude::*;
use tracing::{debug, info};

use crate::executor::RelationalStore;
use crate::schema;
use crate::source::{TableFormat, TableSource};

/// The query engine wrapping DataFusion's SessionContext.
///
/// Tables are registered once at startup; afterwards the engine is only read
/// and can be shared across concurrent requests. Identifiers are matched
/// exactly as written, so `S_RBR` and `"S_RBR"` name the same table.
pub struct QueryEngine {
    ctx: SessionContext,
    tables: Vec<String>,
    sample_rows: usize,
}

impl QueryEngine {
    /// Create an empty engine. `sample_rows` rows per table are included in
    /// the schema description.
    pub fn new(sample_rows: usize) -> Self {
        let config = SessionConfig::new()
            .set_bool("datafusion.sql_parser.enable_ident_normalization", false);
        Self {
            ctx: SessionContext::new_with_config(config),
            tables: Vec::new(),
            sample_rows,
        }
    }

    /// Names of registered tables, in registration order
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Register a CSV file as a table
    pub async fn register_csv(&mut self, table_name: &str, path: &str) -> DFResult<()> {
        self.ctx
            .register_csv(
                TableReference::bare(table_name),
                path,
                CsvReadOptions::default(),
            )
            .await?;
        self.tables.push(table_name.to_string());
        Ok(())
    }

    /// Register a Parquet file as a table
    pub async fn register_parquet(&mut self, table_name: &str, path: &str) -> DFResult<()> {
        self.ctx
            .register_parquet(
                TableReference::bare(table_name),
                path,
                ParquetReadOptions::default(),
            )
            .await?;
        self.tables.push(table_name.to_string());
        Ok(())
    }

    /// Register every table source, failing on the first one that cannot be loaded
    pub async fn load_tables(&mut self, sources: &[TableSource]) -> anyhow::Result<()> {
        for source in sources {
            let path = source.path.to_string_lossy();
            match source.format {
                TableFormat::Csv => self.register_csv(&source.name, &path).await,
                TableFormat::Parquet => self.register_parquet(&source.name, &path).await,
            }
            .map_err(|e| anyhow::anyhow!("Failed to register table {}: {}", source, e))?;
            info!("Registered table {} from {}", source.name, path);
        }
        Ok(())
    }

    /// Statements other than queries are rejected before planning.
    fn read_only_options() -> SQLOptions {
        SQLOptions::new()
            .with_allow_ddl(false)
            .with_allow_dml(false)
            .with_allow_statements(false)
    }

    /// Run a query and render the rows as an ASCII table.
    ///
    /// Returns an empty string when the query yields no rows.
    pub async fn query_text(&self, sql: &str) -> anyhow::Result<String> {
        let df = self
            .ctx
            .sql_with_options(sql, Self::read_only_options())
            .await?;
        let batches = df.collect().await?;

        let row_count: usize = batches.iter().map(|b| b.num_rows()).sum();
        debug!("Query returned {} rows", row_count);
        if row_count == 0 {
            return Ok(String::new());
        }

        Ok(pretty_format_batches(&batches)?.to_string())
    }
}

#[async_trait]
impl RelationalStore for QueryEngine {
    async fn execute(&self, sql: &str) -> anyhow::Result<String> {
        self.query_text(sql).await
    }

    async fn describe_schema(&self) -> anyhow::Result<String> {
        schema::describe_tables(&self.ctx, &self.tables, self.sample_rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    async fn engine_with_raids(f: &tempfile::NamedTempFile) -> QueryEngine {
        let mut engine = QueryEngine::new(3);
        let source: TableSource = format!("S_RBR={}", f.path().display()).parse().unwrap();
        engine.load_tables(&[source]).await.unwrap();
        engine
    }

    const RAIDS: &str = "player,team,raid_points\nPawan,Bengaluru,12\nNaveen,Delhi,9\nArjun,Jaipur,15\n";

    #[tokio::test]
    async fn test_load_tables_records_names() {
        let f = write_csv(RAIDS);
        let engine = engine_with_raids(&f).await;
        assert_eq!(engine.tables(), &["S_RBR".to_string()]);
    }

    #[tokio::test]
    async fn test_load_tables_missing_file() {
        let mut engine = QueryEngine::new(0);
        let source: TableSource = "t=/nonexistent/askql/t.csv".parse().unwrap();
        let err = engine.load_tables(&[source]).await.unwrap_err();
        assert!(err.to_string().contains("Failed to register table t="));
    }

    #[tokio::test]
    async fn test_execute_renders_table() {
        let f = write_csv(RAIDS);
        let engine = engine_with_raids(&f).await;

        let text = engine
            .execute("SELECT player, raid_points FROM S_RBR WHERE LOWER(team) = LOWER('DELHI');")
            .await
            .unwrap();
        assert!(text.contains("player"));
        assert!(text.contains("| Naveen"));
        assert!(!text.contains("Pawan"));
    }

    #[tokio::test]
    async fn test_execute_empty_result() {
        let f = write_csv(RAIDS);
        let engine = engine_with_raids(&f).await;

        let text = engine
            .execute("SELECT player FROM S_RBR WHERE raid_points > 100")
            .await
            .unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_execute_invalid_sql() {
        let f = write_csv(RAIDS);
        let engine = engine_with_raids(&f).await;

        assert!(engine.execute("SELEC player FROM S_RBR").await.is_err());
        assert!(engine.execute("SELECT nope FROM S_RBR").await.is_err());
    }

    #[tokio::test]
    async fn test_execute_rejects_ddl_and_dml() {
        let f = write_csv(RAIDS);
        let engine = engine_with_raids(&f).await;

        assert!(engine.execute("DROP TABLE S_RBR").await.is_err());
        assert!(engine
            .execute("CREATE TABLE t AS SELECT * FROM S_RBR")
            .await
            .is_err());
        assert!(engine.execute("SET datafusion.execution.batch_size = 1").await.is_err());

        // Table must still be queryable afterwards
        let text = engine.execute("SELECT COUNT(*) AS n FROM S_RBR").await.unwrap();
        assert!(text.contains('3'));
    }

    #[tokio::test]
    async fn test_quoted_and_bare_identifiers_resolve() {
        let f = write_csv("Player,raid_points\nPawan,12\nNaveen,9\n");
        let engine = engine_with_raids(&f).await;

        let quoted = engine.execute("SELECT \"Player\" FROM \"S_RBR\";").await.unwrap();
        assert!(quoted.contains("| Player"));
        assert!(quoted.contains("Naveen"));

        let bare = engine.execute("SELECT Player FROM S_RBR;").await.unwrap();
        assert_eq!(bare, quoted);

        let text = engine
            .execute("SELECT COUNT(*) AS n FROM S_RBR WHERE LOWER(Player) = LOWER('PAWAN')")
            .await
            .unwrap();
        assert!(text.contains("| 1"));
    }

    #[tokio::test]
    async fn test_describe_schema_includes_samples() {
        let f = write_csv(RAIDS);
        let engine = engine_with_raids(&f).await;

        let description = engine.describe_schema().await.unwrap();
        assert!(description.contains("CREATE TABLE S_RBR ("));
        assert!(description.contains("\"raid_points\" BIGINT"));
        assert!(description.contains("3 rows from S_RBR table:"));
        assert!(description.contains("Pawan\tBengaluru\t12"));
    }
}
