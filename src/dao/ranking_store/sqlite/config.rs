use std::path::{Path, PathBuf};

use super::error::{SqliteDaoError, SqliteResult};
use crate::dao::ranking_store::DEFAULT_PAGE_SIZE;

/// Table used when no explicit name is configured.
pub const DEFAULT_TABLE: &str = "leaderboard_player";

/// Runtime configuration describing where the SQLite ranking lives.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub path: PathBuf,
    pub table: String,
    pub page_size: usize,
}

impl SqliteConfig {
    /// Configuration for the database file at `path` with default table and page size.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            table: DEFAULT_TABLE.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the number of rows fetched per listing round trip.
    pub fn with_page_size(mut self, page_size: usize) -> SqliteResult<Self> {
        if page_size == 0 {
            return Err(SqliteDaoError::InvalidPageSize);
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Store records in `table` instead of [`DEFAULT_TABLE`].
    pub fn with_table(mut self, table: impl Into<String>) -> SqliteResult<Self> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(SqliteDaoError::InvalidTable { table });
        }
        self.table = table;
        Ok(self)
    }
}

fn is_valid_table_name(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SqliteConfig::new("board.sqlite");
        assert_eq!(config.table, DEFAULT_TABLE);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(matches!(
            SqliteConfig::new("board.sqlite").with_page_size(0),
            Err(SqliteDaoError::InvalidPageSize)
        ));
        assert_eq!(
            SqliteConfig::new("board.sqlite")
                .with_page_size(2)
                .unwrap()
                .page_size,
            2
        );
    }

    #[test]
    fn table_names_must_be_identifiers() {
        assert!(SqliteConfig::new("db").with_table("players_2023").is_ok());
        assert!(SqliteConfig::new("db").with_table("_scores").is_ok());
        assert!(SqliteConfig::new("db").with_table("").is_err());
        assert!(SqliteConfig::new("db").with_table("2players").is_err());
        assert!(SqliteConfig::new("db").with_table("players; DROP TABLE x").is_err());
    }
}
