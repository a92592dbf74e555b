mod config;
mod error;
mod store;

pub use config::{DEFAULT_TABLE, SqliteConfig};
pub use error::{SqliteDaoError, SqliteResult};
pub use store::SqliteRankingStore;

use crate::dao::storage::StorageError;

impl From<SqliteDaoError> for StorageError {
    fn from(err: SqliteDaoError) -> Self {
        StorageError::unavailable("sqlite", err.to_string(), err)
    }
}
