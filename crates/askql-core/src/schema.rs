//! Schema description for SQL generation prompts

use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use datafusion::common::TableReference;
use datafusion::prelude::SessionContext;

/// Column metadata exposed to the language model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name, exactly as registered
    pub name: String,

    /// SQL type name mapped from the Arrow type
    pub sql_type: String,

    /// Whether the column is nullable
    pub nullable: bool,
}

/// Structural description of a single registered table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnMeta>,
}

impl TableSchema {
    /// Render the table as a `CREATE TABLE` statement.
    ///
    /// Column names are double-quoted since spreadsheet headers routinely carry
    /// spaces and mixed case. The table name is shown as registered; the
    /// engine resolves it quoted or bare.
    pub fn create_statement(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                format!(
                    "\t\"{}\" {}{}",
                    c.name.replace('"', "\"\""),
                    c.sql_type,
                    if c.nullable { "" } else { " NOT NULL" }
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE {} (\n{}\n)", self.table_name, columns)
    }
}

/// Map an Arrow data type to the SQL type name shown in the prompt
pub fn sql_type(data_type: &DataType) -> String {
    match data_type {
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 => "INTEGER".to_string(),
        DataType::Int64 => "BIGINT".to_string(),
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 => "INTEGER".to_string(),
        DataType::UInt64 => "BIGINT".to_string(),
        DataType::Float16 | DataType::Float32 => "REAL".to_string(),
        DataType::Float64 => "DOUBLE".to_string(),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "TEXT".to_string(),
        DataType::Date32 | DataType::Date64 => "DATE".to_string(),
        DataType::Timestamp(_, _) => "TIMESTAMP".to_string(),
        DataType::Decimal128(p, s) | DataType::Decimal256(p, s) => format!("DECIMAL({p}, {s})"),
        other => format!("{other}").to_uppercase(),
    }
}

/// Extract the column layout of a registered table
pub async fn extract_schema(
    ctx: &SessionContext,
    table_name: &str,
) -> anyhow::Result<TableSchema> {
    let table = ctx.table(TableReference::bare(table_name)).await?;

    let columns = table
        .schema()
        .fields()
        .iter()
        .map(|field| ColumnMeta {
            name: field.name().clone(),
            sql_type: sql_type(field.data_type()),
            nullable: field.is_nullable(),
        })
        .collect();

    Ok(TableSchema {
        table_name: table_name.to_string(),
        columns,
    })
}

/// Render up to `limit` rows of a table as a comment block under a header line.
pub async fn sample_rows(
    ctx: &SessionContext,
    table_name: &str,
    limit: usize,
) -> anyhow::Result<String> {
    let batches = ctx
        .table(TableReference::bare(table_name))
        .await?
        .limit(0, Some(limit))?
        .collect()
        .await?;

    let header = ctx
        .table(TableReference::bare(table_name))
        .await?
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect::<Vec<_>>()
        .join("\t");

    let mut lines = vec![format!("{} rows from {} table:", limit, table_name), header];
    lines.extend(tab_separated_rows(&batches)?);

    Ok(format!("/*\n{}\n*/", lines.join("\n")))
}

fn tab_separated_rows(batches: &[RecordBatch]) -> anyhow::Result<Vec<String>> {
    let options = FormatOptions::default();
    let mut rows = Vec::new();

    for batch in batches {
        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()?;

        for row_idx in 0..batch.num_rows() {
            let row = formatters
                .iter()
                .map(|f| f.value(row_idx).to_string())
                .collect::<Vec<_>>()
                .join("\t");
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Describe every listed table: `CREATE TABLE` plus optional sample rows.
pub async fn describe_tables(
    ctx: &SessionContext,
    tables: &[String],
    sample_limit: usize,
) -> anyhow::Result<String> {
    let mut sections = Vec::with_capacity(tables.len());

    for table_name in tables {
        let schema = extract_schema(ctx, table_name).await?;
        let mut section = schema.create_statement();
        if sample_limit > 0 {
            section.push_str("\n\n");
            section.push_str(&sample_rows(ctx, table_name, sample_limit).await?);
        }
        sections.push(section);
    }

    Ok(sections.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::TimeUnit;
    use datafusion::prelude::CsvReadOptions;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_sql_type_mapping() {
        assert_eq!(sql_type(&DataType::Utf8), "TEXT");
        assert_eq!(sql_type(&DataType::Int64), "BIGINT");
        assert_eq!(sql_type(&DataType::Float64), "DOUBLE");
        assert_eq!(sql_type(&DataType::Boolean), "BOOLEAN");
        assert_eq!(
            sql_type(&DataType::Timestamp(TimeUnit::Nanosecond, None)),
            "TIMESTAMP"
        );
        assert_eq!(sql_type(&DataType::Decimal128(10, 2)), "DECIMAL(10, 2)");
    }

    #[test]
    fn test_create_statement_quotes_columns() {
        let schema = TableSchema {
            table_name: "S_RBR".to_string(),
            columns: vec![
                ColumnMeta {
                    name: "Player Name".to_string(),
                    sql_type: "TEXT".to_string(),
                    nullable: true,
                },
                ColumnMeta {
                    name: "points".to_string(),
                    sql_type: "BIGINT".to_string(),
                    nullable: false,
                },
            ],
        };

        let ddl = schema.create_statement();
        assert!(ddl.starts_with("CREATE TABLE S_RBR ("));
        assert!(ddl.contains("\t\"Player Name\" TEXT,\n"));
        assert!(ddl.contains("\"points\" BIGINT NOT NULL"));
        assert!(ddl.ends_with(')'));
    }

    #[tokio::test]
    async fn test_extract_schema_from_csv() {
        let f = write_csv("player,team,raid_points\nPawan,Bengaluru,12\nNaveen,Delhi,9\n");
        let ctx = SessionContext::new();
        ctx.register_csv("raids", f.path().to_str().unwrap(), CsvReadOptions::new())
            .await
            .unwrap();

        let schema = extract_schema(&ctx, "raids").await.unwrap();
        let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["player", "team", "raid_points"]);
        assert_eq!(schema.columns[2].sql_type, "BIGINT");
    }

    #[tokio::test]
    async fn test_sample_rows_block() {
        let f = write_csv("player,team\nPawan,Bengaluru\nNaveen,Delhi\nArjun,Jaipur\nManinder,Bengal\n");
        let ctx = SessionContext::new();
        ctx.register_csv("raids", f.path().to_str().unwrap(), CsvReadOptions::new())
            .await
            .unwrap();

        let block = sample_rows(&ctx, "raids", 2).await.unwrap();
        assert!(block.starts_with("/*\n2 rows from raids table:\nplayer\tteam\n"));
        assert_eq!(block.lines().filter(|l| l.contains('\t')).count(), 3);
        assert!(!block.contains("Maninder"));
        assert!(block.ends_with("*/"));
    }

    #[tokio::test]
    async fn test_describe_tables_without_samples() {
        let f = write_csv("player,team\nPawan,Bengaluru\n");
        let ctx = SessionContext::new();
        ctx.register_csv("raids", f.path().to_str().unwrap(), CsvReadOptions::new())
            .await
            .unwrap();

        let description = describe_tables(&ctx, &["raids".to_string()], 0)
            .await
            .unwrap();
        assert!(description.contains("CREATE TABLE raids"));
        assert!(!description.contains("Pawan"));
    }

    #[tokio::test]
    async fn test_extract_schema_nonexistent_table() {
        let ctx = SessionContext::new();
        assert!(extract_schema(&ctx, "missing").await.is_err());
    }
}
