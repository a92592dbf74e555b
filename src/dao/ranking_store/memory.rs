//! Map-backed ranking store that lives for the lifetime of the process.

use std::sync::Arc;

use dashmap::DashMap;
use futures::{StreamExt, future::BoxFuture, stream};

use crate::dao::{
    models::{ScoreRecord, ranking_order},
    storage::StorageResult,
};

use super::{RankingStore, RecordStream};

/// In-memory [`RankingStore`] keyed by identity.
///
/// Clones share the same map. Listings sort a snapshot of the current values
/// on every call.
#[derive(Clone, Default)]
pub struct MemoryRankingStore {
    records: Arc<DashMap<String, ScoreRecord>>,
}

impl MemoryRankingStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Vec<ScoreRecord> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(ranking_order);
        records
    }
}

impl RankingStore for MemoryRankingStore {
    fn upsert(&self, record: ScoreRecord) -> BoxFuture<'static, StorageResult<()>> {
        let records = self.records.clone();
        Box::pin(async move {
            records.insert(record.identity().to_owned(), record);
            Ok(())
        })
    }

    fn exists(&self, identity: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let records = self.records.clone();
        let identity = identity.to_owned();
        Box::pin(async move { Ok(records.contains_key(&identity)) })
    }

    fn find(&self, identity: &str) -> BoxFuture<'static, StorageResult<Option<ScoreRecord>>> {
        let records = self.records.clone();
        let identity = identity.to_owned();
        Box::pin(async move { Ok(records.get(&identity).map(|entry| entry.value().clone())) })
    }

    fn find_or_create(&self, identity: &str) -> BoxFuture<'static, StorageResult<ScoreRecord>> {
        let records = self.records.clone();
        let identity = identity.to_owned();
        Box::pin(async move {
            // The entry guard holds the shard lock across the check and the insert.
            let record = records
                .entry(identity.clone())
                .or_insert_with(|| ScoreRecord::new(identity))
                .value()
                .clone();
            Ok(record)
        })
    }

    fn ordered_all(&self) -> RecordStream {
        stream::iter(self.snapshot().into_iter().map(Ok)).boxed()
    }

    fn count(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let records = self.records.clone();
        Box::pin(async move { Ok(records.len() as u64) })
    }

    fn remove(&self, identity: &str) -> BoxFuture<'static, StorageResult<()>> {
        let records = self.records.clone();
        let identity = identity.to_owned();
        Box::pin(async move {
            records.remove(&identity);
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'static, StorageResult<()>> {
        let records = self.records.clone();
        Box::pin(async move {
            records.clear();
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;

    async fn identities(store: &MemoryRankingStore) -> Vec<String> {
        store
            .ordered_all()
            .map_ok(|record| record.identity().to_owned())
            .try_collect()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_identity() {
        let store = MemoryRankingStore::new();
        store.upsert(ScoreRecord::with_score("p1", 10)).await.unwrap();
        store.upsert(ScoreRecord::with_score("p1", 25)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(
            store.find("p1").await.unwrap(),
            Some(ScoreRecord::with_score("p1", 25))
        );
    }

    #[tokio::test]
    async fn find_or_create_persists_once() {
        let store = MemoryRankingStore::new();
        assert!(!store.exists("p1").await.unwrap());

        let created = store.find_or_create("p1").await.unwrap();
        assert_eq!(created, ScoreRecord::new("p1"));
        assert_eq!(store.count().await.unwrap(), 1);

        store.upsert(ScoreRecord::with_score("p1", 7)).await.unwrap();
        let existing = store.find_or_create("p1").await.unwrap();
        assert_eq!(existing.score(), 7);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ordered_all_breaks_ties_by_identity() {
        let store = MemoryRankingStore::new();
        for (identity, score) in [("d", 5), ("b", 20), ("c", 5), ("a", 5)] {
            store
                .upsert(ScoreRecord::with_score(identity, score))
                .await
                .unwrap();
        }

        assert_eq!(identities(&store).await, ["b", "a", "c", "d"]);
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let store = MemoryRankingStore::new();
        for identity in ["p1", "p2", "p3"] {
            store.find_or_create(identity).await.unwrap();
        }

        store.remove("p2").await.unwrap();
        store.remove("missing").await.unwrap();
        assert_eq!(identities(&store).await, ["p1", "p3"]);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(identities(&store).await.is_empty());
    }

    #[tokio::test]
    async fn reads_observe_writes_completed_before_await() {
        let store = MemoryRankingStore::new();
        let exists = store.exists("p1");
        let find = store.find("p1");
        let count = store.count();

        store.upsert(ScoreRecord::with_score("p1", 7)).await.unwrap();

        assert!(exists.await.unwrap());
        assert_eq!(find.await.unwrap(), Some(ScoreRecord::with_score("p1", 7)));
        assert_eq!(count.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clones_share_records() {
        let store = MemoryRankingStore::new();
        let handle = store.clone();
        handle.find_or_create("p1").await.unwrap();
        assert!(store.exists("p1").await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_find_or_create_keeps_identities_unique() {
        let store = MemoryRankingStore::new();
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.find_or_create(&format!("p{}", i % 4)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 4);
    }
}
