//! Table source declarations (`name=path`) used to populate the engine.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// File format of a table source, derived from the path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

/// A named table backed by a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub name: String,
    pub path: PathBuf,
    pub format: TableFormat,
}

/// Errors raised while parsing table source declarations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("expected `name=path`, got `{0}`")]
    MissingSeparator(String),
    #[error("invalid table name `{0}`: use letters, digits and underscores")]
    InvalidName(String),
    #[error("unsupported file format for `{0}`: expected .csv or .parquet")]
    UnsupportedFormat(String),
}

impl TableSource {
    /// Parse a comma-separated list of `name=path` declarations.
    pub fn parse_list(spec: &str) -> Result<Vec<TableSource>, SourceError> {
        spec.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for TableSource {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = s
            .split_once('=')
            .ok_or_else(|| SourceError::MissingSeparator(s.to_string()))?;
        let name = name.trim();
        let path = path.trim();

        let valid_name = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(SourceError::InvalidName(name.to_string()));
        }

        let lower = path.to_ascii_lowercase();
        let format = if lower.ends_with(".csv") {
            TableFormat::Csv
        } else if lower.ends_with(".parquet") {
            TableFormat::Parquet
        } else {
            return Err(SourceError::UnsupportedFormat(path.to_string()));
        };

        Ok(TableSource {
            name: name.to_string(),
            path: PathBuf::from(path),
            format,
        })
    }
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.path.display())
    }
}
