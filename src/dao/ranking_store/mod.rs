pub mod memory;
#[cfg(feature = "sqlite-store")]
pub mod sqlite;

use std::sync::Arc;

use futures::{future::BoxFuture, stream::BoxStream};
use tracing::info;

use crate::{
    config::{LeaderboardConfig, StoreBackend},
    dao::{models::ScoreRecord, storage::StorageResult},
};

pub use memory::MemoryRankingStore;
#[cfg(feature = "sqlite-store")]
pub use sqlite::{SqliteConfig, SqliteRankingStore};

/// Rows fetched per round trip by paginated backends.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Lazy, finite traversal of score records in ranking order.
pub type RecordStream = BoxStream<'static, StorageResult<ScoreRecord>>;

/// Abstraction over the persistence layer holding per-identity scores.
///
/// Every backend keeps identities unique and lists records by score
/// descending, identity ascending on ties.
pub trait RankingStore: Send + Sync {
    /// Insert the record or replace the one stored under the same identity.
    fn upsert(&self, record: ScoreRecord) -> BoxFuture<'static, StorageResult<()>>;
    fn exists(&self, identity: &str) -> BoxFuture<'static, StorageResult<bool>>;
    fn find(&self, identity: &str) -> BoxFuture<'static, StorageResult<Option<ScoreRecord>>>;
    /// Return the stored record, persisting a zero-score one first if absent.
    fn find_or_create(&self, identity: &str) -> BoxFuture<'static, StorageResult<ScoreRecord>>;
    /// Fresh ranking-ordered traversal of every record.
    fn ordered_all(&self) -> RecordStream;
    fn count(&self) -> BoxFuture<'static, StorageResult<u64>>;
    /// Delete a single identity. Missing identities are ignored.
    fn remove(&self, identity: &str) -> BoxFuture<'static, StorageResult<()>>;
    fn clear(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Build the backend selected by `config`.
pub async fn open(config: &LeaderboardConfig) -> StorageResult<Arc<dyn RankingStore>> {
    match config.store {
        StoreBackend::InMemory => {
            info!("using in-memory ranking store");
            Ok(Arc::new(MemoryRankingStore::new()))
        }
        StoreBackend::Persistent => open_persistent(config).await,
    }
}

#[cfg(feature = "sqlite-store")]
async fn open_persistent(config: &LeaderboardConfig) -> StorageResult<Arc<dyn RankingStore>> {
    let sqlite = SqliteConfig::new(&config.database_path).with_page_size(config.page_size)?;
    let store = SqliteRankingStore::open(sqlite).await?;
    info!(path = %config.database_path.display(), "using SQLite ranking store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite-store"))]
async fn open_persistent(_config: &LeaderboardConfig) -> StorageResult<Arc<dyn RankingStore>> {
    Err(crate::dao::storage::StorageError::Unsupported { backend: "sqlite" })
}
