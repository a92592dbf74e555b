//! Behaviour shared by every ranking store backend, exercised through the service.
#![cfg(feature = "sqlite-store")]

use std::sync::{Arc, Once};

use anyhow::Result;
use futures::TryStreamExt;
use leaderboard::{
    config::{LeaderboardConfig, StoreBackend},
    dao::{
        models::ScoreRecord,
        ranking_store::{MemoryRankingStore, RankingStore, SqliteConfig, SqliteRankingStore},
    },
    points::{PointGrant, PointsCatalog},
    services::RankingService,
};
use tempfile::TempDir;
use uuid::Uuid;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "leaderboard=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Backends under test. The temporary directory must outlive the SQLite store.
async fn backends() -> Result<Vec<(&'static str, Arc<dyn RankingStore>, Option<TempDir>)>> {
    init_tracing();
    let dir = TempDir::new()?;
    let config = SqliteConfig::new(dir.path().join("database.sqlite")).with_page_size(2)?;
    let sqlite = SqliteRankingStore::open(config).await?;
    Ok(vec![
        (
            "memory",
            Arc::new(MemoryRankingStore::new()) as Arc<dyn RankingStore>,
            None,
        ),
        ("sqlite", Arc::new(sqlite) as Arc<dyn RankingStore>, Some(dir)),
    ])
}

async fn listing(store: &Arc<dyn RankingStore>) -> Result<Vec<ScoreRecord>> {
    Ok(store.ordered_all().try_collect().await?)
}

fn random_identity() -> String {
    Uuid::new_v4().to_string()
}

#[tokio::test]
async fn rank_on_empty_store_creates_the_identity() -> Result<()> {
    for (backend, store, _dir) in backends().await? {
        let service = RankingService::new(store.clone());
        assert_eq!(service.rank("u1").await?, 1, "{backend}");
        assert_eq!(store.count().await?, 1, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn grants_accumulate_and_clamp() -> Result<()> {
    let a = PointGrant::of("A", 100)?;
    let b = PointGrant::of("B", 50)?;
    let penalty = PointGrant::of("Penalty", -200)?;

    for (backend, store, _dir) in backends().await? {
        let service = RankingService::new(store);
        service.grant_points("p1", &a).await?;
        service.grant_points("p1", &b).await?;
        assert_eq!(service.score("p1").await?, 150, "{backend}");

        service.grant_points("p2", &penalty).await?;
        assert_eq!(service.score("p2").await?, 0, "{backend}");

        service.grant_points("p1", &penalty).await?;
        service.grant_points("p1", &a).await?;
        assert_eq!(service.score("p1").await?, 100, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn top_n_lists_highest_scores() -> Result<()> {
    for (backend, store, _dir) in backends().await? {
        for (identity, score) in [("p1", 150), ("p2", 50), ("p3", 0)] {
            store.upsert(ScoreRecord::with_score(identity, score)).await?;
        }
        let service = RankingService::new(store);

        let top: Vec<_> = service
            .top_n(2)
            .await?
            .iter()
            .map(|record| record.identity().to_owned())
            .collect();
        assert_eq!(top, ["p1", "p2"], "{backend}");
        assert_eq!(service.top_n(5).await?.len(), 3, "{backend}");
        assert!(service.top_n(0).await?.is_empty(), "{backend}");
        assert!(service.top_n(-1).await?.is_empty(), "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn clear_empties_the_ranking() -> Result<()> {
    for (backend, store, _dir) in backends().await? {
        for identity in ["a", "b", "c"] {
            store.find_or_create(identity).await?;
        }
        assert_eq!(store.count().await?, 3, "{backend}");

        store.clear().await?;
        assert_eq!(store.count().await?, 0, "{backend}");
        assert!(listing(&store).await?.is_empty(), "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn reads_run_when_awaited() -> Result<()> {
    for (backend, store, _dir) in backends().await? {
        let find = store.find("p1");
        let exists = store.exists("p1");
        let count = store.count();

        store.upsert(ScoreRecord::with_score("p1", 7)).await?;

        assert_eq!(
            find.await?,
            Some(ScoreRecord::with_score("p1", 7)),
            "{backend}"
        );
        assert!(exists.await?, "{backend}");
        assert_eq!(count.await?, 1, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn upsert_is_idempotent() -> Result<()> {
    for (backend, store, _dir) in backends().await? {
        let identity = random_identity();
        store.upsert(ScoreRecord::with_score(identity.as_str(), 10)).await?;
        store.upsert(ScoreRecord::with_score(identity.as_str(), 10)).await?;
        assert_eq!(store.count().await?, 1, "{backend}");

        store.upsert(ScoreRecord::with_score(identity.as_str(), 30)).await?;
        assert_eq!(
            store.find(&identity).await?,
            Some(ScoreRecord::with_score(identity.as_str(), 30)),
            "{backend}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn ordering_and_rank_agree_across_backends() -> Result<()> {
    let scores = [
        ("e", 5),
        ("a", 30),
        ("d", 5),
        ("b", 20),
        ("c", 5),
        ("f", 0),
        ("g", 45),
    ];

    let mut listings = Vec::new();
    for (backend, store, _dir) in backends().await? {
        for (identity, score) in scores {
            store.upsert(ScoreRecord::with_score(identity, score)).await?;
        }

        let records = listing(&store).await?;
        assert!(
            records.windows(2).all(|pair| pair[0].score() >= pair[1].score()),
            "{backend}"
        );

        let service = RankingService::new(store);
        for (identity, score) in scores {
            let rank = service.rank(identity).await?;
            let strictly_greater = scores.iter().filter(|(_, other)| *other > score).count() as u64;
            assert!(rank > strictly_greater, "{backend}: {identity}");
            let tied = scores.iter().filter(|(_, other)| *other == score).count() as u64;
            assert!(rank <= strictly_greater + tied, "{backend}: {identity}");
        }

        listings.push(records);
    }

    assert_eq!(listings[0], listings[1]);
    Ok(())
}

#[tokio::test]
async fn sqlite_records_survive_reopen() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;
    let path = dir.path().join("database.sqlite");
    let identity = random_identity();

    {
        let store = SqliteRankingStore::open(SqliteConfig::new(&path)).await?;
        let service = RankingService::new(Arc::new(store));
        service
            .grant_points(identity.as_str(), &PointGrant::of("Victory", 1000)?)
            .await?;
    }

    let reopened = SqliteRankingStore::open(SqliteConfig::new(&path)).await?;
    assert_eq!(
        reopened.find(&identity).await?,
        Some(ScoreRecord::with_score(identity.as_str(), 1000))
    );
    Ok(())
}

#[tokio::test]
async fn sqlite_concurrent_grants_to_different_identities() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;
    let store = SqliteRankingStore::open(SqliteConfig::new(dir.path().join("database.sqlite")))
        .await?;
    let service = RankingService::new(Arc::new(store));
    let build = PointsCatalog::standard()
        .find("Build")
        .cloned()
        .expect("standard catalog has a build grant");

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            let build = build.clone();
            tokio::spawn(async move { service.grant_points(&format!("p{i}"), &build).await })
        })
        .collect();
    for task in tasks {
        task.await??;
    }

    assert_eq!(service.store().count().await?, 16);
    for i in 0..16 {
        assert_eq!(service.score(&format!("p{i}")).await?, 1);
    }
    Ok(())
}

#[tokio::test]
async fn service_from_config_selects_backend() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;

    let in_memory = LeaderboardConfig {
        store: StoreBackend::InMemory,
        ..LeaderboardConfig::default()
    };
    let service = RankingService::from_config(&in_memory).await?;
    service.grant_points("p1", &PointGrant::of("A", 1)?).await?;
    assert_eq!(service.score("p1").await?, 1);

    let persistent = LeaderboardConfig {
        store: StoreBackend::Persistent,
        database_path: dir.path().join("board.sqlite"),
        board_size: 1,
        ..LeaderboardConfig::default()
    };
    let service = RankingService::from_config(&persistent).await?;
    service.grant_points("p1", &PointGrant::of("A", 1)?).await?;
    service.grant_points("p2", &PointGrant::of("B", 2)?).await?;
    let board = service.leaderboard().await?;
    assert_eq!(board, [ScoreRecord::with_score("p2", 2)]);
    assert!(dir.path().join("board.sqlite").exists());
    Ok(())
}
