use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_stream::stream;
use futures::future::BoxFuture;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::dao::{
    models::ScoreRecord,
    ranking_store::{RankingStore, RecordStream},
    storage::{StorageError, StorageResult},
};

use super::{
    config::SqliteConfig,
    error::{SqliteDaoError, SqliteResult},
};

/// Durable [`RankingStore`] backed by a single SQLite table.
///
/// Statements run on tokio's blocking pool against one shared connection.
/// Every mutation is a single statement so concurrent upserts never
/// interleave half-way.
#[derive(Clone)]
pub struct SqliteRankingStore {
    inner: Arc<SqliteInner>,
}

struct SqliteInner {
    connection: Mutex<Connection>,
    queries: Queries,
    page_size: usize,
    path: PathBuf,
}

/// SQL text for the configured table, built once at open time.
struct Queries {
    upsert: String,
    insert_default: String,
    select_one: String,
    exists: String,
    count: String,
    delete_one: String,
    delete_all: String,
    first_page: String,
    next_page: String,
}

impl Queries {
    fn for_table(table: &str) -> Self {
        const COLUMNS: &str = "identity, score";
        const ORDER: &str = "ORDER BY score DESC, identity ASC";
        Self {
            upsert: format!(
                "INSERT INTO {table} ({COLUMNS}) VALUES (?1, ?2) \
                 ON CONFLICT(identity) DO UPDATE SET score = excluded.score"
            ),
            insert_default: format!(
                "INSERT INTO {table} ({COLUMNS}) VALUES (?1, 0) ON CONFLICT(identity) DO NOTHING"
            ),
            select_one: format!("SELECT {COLUMNS} FROM {table} WHERE identity = ?1"),
            exists: format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE identity = ?1)"),
            count: format!("SELECT COUNT(*) FROM {table}"),
            delete_one: format!("DELETE FROM {table} WHERE identity = ?1"),
            delete_all: format!("DELETE FROM {table}"),
            first_page: format!("SELECT {COLUMNS} FROM {table} {ORDER} LIMIT ?1"),
            // Keyset pagination: resume strictly after the last (score, identity) seen.
            next_page: format!(
                "SELECT {COLUMNS} FROM {table} \
                 WHERE score < ?1 OR (score = ?1 AND identity > ?2) {ORDER} LIMIT ?3"
            ),
        }
    }
}

fn schema(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
             identity TEXT PRIMARY KEY NOT NULL,
             score INTEGER NOT NULL
         );
         CREATE INDEX IF NOT EXISTS {table}_ranking_idx ON {table} (score DESC, identity ASC);"
    )
}

/// Position of the last row handed out by a listing.
struct PageCursor {
    score: i64,
    identity: String,
}

impl From<&ScoreRecord> for PageCursor {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            score: record.score(),
            identity: record.identity().to_owned(),
        }
    }
}

impl SqliteRankingStore {
    /// Open (or create) the database file and make sure the table exists.
    pub async fn open(config: SqliteConfig) -> SqliteResult<Self> {
        tokio::task::spawn_blocking(move || Self::open_blocking(config))
            .await
            .map_err(|source| SqliteDaoError::Worker { source })?
    }

    fn open_blocking(config: SqliteConfig) -> SqliteResult<Self> {
        let SqliteConfig {
            path,
            table,
            page_size,
        } = config;

        if page_size == 0 {
            return Err(SqliteDaoError::InvalidPageSize);
        }

        let connection = Connection::open(&path).map_err(|source| SqliteDaoError::Open {
            path: path.clone(),
            source,
        })?;
        connection
            .execute_batch(&schema(&table))
            .map_err(|source| SqliteDaoError::Schema {
                table: table.clone(),
                source,
            })?;
        debug!(path = %path.display(), %table, page_size, "SQLite ranking table ready");

        Ok(Self {
            inner: Arc::new(SqliteInner {
                connection: Mutex::new(connection),
                queries: Queries::for_table(&table),
                page_size,
                path,
            }),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Rows fetched per listing round trip.
    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    /// Run `f` on the blocking pool while holding the connection.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection, &Queries) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let connection = inner
                .connection
                .lock()
                .map_err(|_| SqliteDaoError::Poisoned)?;
            f(&connection, &inner.queries)
                .map_err(|source| SqliteDaoError::Statement { operation, source })
        })
        .await
        .map_err(|source| SqliteDaoError::Worker { source })?
    }

    async fn fetch_page(&self, after: Option<PageCursor>) -> SqliteResult<Vec<ScoreRecord>> {
        let limit = i64::try_from(self.inner.page_size).unwrap_or(i64::MAX);
        self.run("ordered_all", move |connection, queries| match after {
            None => connection
                .prepare_cached(&queries.first_page)?
                .query_map(params![limit], map_record)?
                .collect(),
            Some(cursor) => connection
                .prepare_cached(&queries.next_page)?
                .query_map(params![cursor.score, cursor.identity, limit], map_record)?
                .collect(),
        })
        .await
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<ScoreRecord> {
    Ok(ScoreRecord::with_score(
        row.get::<_, String>(0)?,
        row.get::<_, i64>(1)?,
    ))
}

impl RankingStore for SqliteRankingStore {
    fn upsert(&self, record: ScoreRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .run("upsert", move |connection, queries| {
                    connection
                        .prepare_cached(&queries.upsert)?
                        .execute(params![record.identity(), record.score()])?;
                    Ok(())
                })
                .await
                .map_err(Into::into)
        })
    }

    fn exists(&self, identity: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let identity = identity.to_owned();
        Box::pin(async move {
            store
                .run("exists", move |connection, queries| {
                    connection
                        .prepare_cached(&queries.exists)?
                        .query_row(params![identity], |row| row.get::<_, bool>(0))
                })
                .await
                .map_err(Into::into)
        })
    }

    fn find(&self, identity: &str) -> BoxFuture<'static, StorageResult<Option<ScoreRecord>>> {
        let store = self.clone();
        let identity = identity.to_owned();
        Box::pin(async move {
            store
                .run("find", move |connection, queries| {
                    connection
                        .prepare_cached(&queries.select_one)?
                        .query_row(params![identity], map_record)
                        .optional()
                })
                .await
                .map_err(Into::into)
        })
    }

    fn find_or_create(&self, identity: &str) -> BoxFuture<'static, StorageResult<ScoreRecord>> {
        let store = self.clone();
        let identity = identity.to_owned();
        Box::pin(async move {
            store
                .run("find_or_create", move |connection, queries| {
                    // Both statements run under the same connection lock.
                    connection
                        .prepare_cached(&queries.insert_default)?
                        .execute(params![identity])?;
                    connection
                        .prepare_cached(&queries.select_one)?
                        .query_row(params![identity], map_record)
                })
                .await
                .map_err(Into::into)
        })
    }

    fn ordered_all(&self) -> RecordStream {
        let store = self.clone();
        Box::pin(stream! {
            let mut after: Option<PageCursor> = None;
            loop {
                let page = match store.fetch_page(after.take()).await {
                    Ok(page) => page,
                    Err(err) => {
                        yield Err(StorageError::from(err));
                        break;
                    }
                };
                let exhausted = page.len() < store.inner.page_size;
                after = page.last().map(PageCursor::from);
                for record in page {
                    yield Ok(record);
                }
                if exhausted {
                    break;
                }
            }
        })
    }

    fn count(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let count = store
                .run("count", |connection, queries| {
                    connection
                        .prepare_cached(&queries.count)?
                        .query_row([], |row| row.get::<_, i64>(0))
                })
                .await?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
    }

    fn remove(&self, identity: &str) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let identity = identity.to_owned();
        Box::pin(async move {
            store
                .run("remove", move |connection, queries| {
                    connection
                        .prepare_cached(&queries.delete_one)?
                        .execute(params![identity])?;
                    Ok(())
                })
                .await
                .map_err(Into::into)
        })
    }

    fn clear(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .run("clear", |connection, queries| {
                    connection.execute(&queries.delete_all, [])?;
                    Ok(())
                })
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .run("health_check", |connection, _| {
                    connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                    Ok(())
                })
                .await
                .map_err(Into::into)
        })
    }
}
