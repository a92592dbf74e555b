use std::sync::Arc;

use futures::TryStreamExt;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::{
    config::LeaderboardConfig,
    dao::{
        models::ScoreRecord,
        ranking_store::{self, RankingStore},
    },
    error::ServiceError,
    points::PointGrant,
    services::principal::Principal,
};

/// Entries returned by [`RankingService::leaderboard`] unless configured otherwise.
pub const DEFAULT_BOARD_SIZE: usize = 10;

/// Rank and score of a single identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// 1-based position in the ranking.
    pub rank: u64,
    /// Current score.
    pub score: i64,
}

/// Façade combining a ranking store with the grant and rank rules.
///
/// The host builds one instance and passes it to whatever needs it; clones
/// share the same store.
#[derive(Clone)]
pub struct RankingService {
    store: Arc<dyn RankingStore>,
    board_size: usize,
}

impl RankingService {
    /// Wrap an already opened store.
    pub fn new(store: Arc<dyn RankingStore>) -> Self {
        Self {
            store,
            board_size: DEFAULT_BOARD_SIZE,
        }
    }

    /// Open the backend selected by `config` and apply its board size.
    pub async fn from_config(config: &LeaderboardConfig) -> Result<Self, ServiceError> {
        let store = ranking_store::open(config)
            .await
            .map_err(ServiceError::unavailable("open"))?;
        Ok(Self::new(store).with_board_size(config.board_size))
    }

    /// Override the number of entries returned by [`Self::leaderboard`].
    pub fn with_board_size(mut self, board_size: usize) -> Self {
        self.board_size = board_size;
        self
    }

    /// Underlying store, for administration tasks.
    pub fn store(&self) -> &Arc<dyn RankingStore> {
        &self.store
    }

    /// Apply `grant` to the principal's score, creating the record on first use.
    ///
    /// The score is clamped at zero. Notifying the player is left to the
    /// caller, which should check [`PointGrant::is_silent`] once this returns.
    pub async fn grant_points<P>(
        &self,
        principal: &P,
        grant: &PointGrant,
    ) -> Result<(), ServiceError>
    where
        P: Principal + ?Sized,
    {
        let identity = principal.identity();
        let mut record = self
            .store
            .find_or_create(identity)
            .await
            .map_err(ServiceError::unavailable("grant_points"))?;

        let previous = record.score();
        record.apply(grant);
        let score = record.score();

        self.store
            .upsert(record)
            .await
            .map_err(ServiceError::unavailable("grant_points"))?;

        debug!(
            identity,
            grant = grant.name(),
            delta = grant.delta(),
            previous,
            score,
            silent = grant.is_silent(),
            "granted points"
        );
        Ok(())
    }

    /// Current score, or 0 for identities never seen. Does not create records.
    pub async fn score<P>(&self, principal: &P) -> Result<i64, ServiceError>
    where
        P: Principal + ?Sized,
    {
        let record = self
            .store
            .find(principal.identity())
            .await
            .map_err(ServiceError::unavailable("score"))?;
        Ok(record.map_or(0, |record| record.score()))
    }

    /// 1-based rank of the principal, creating a zero-score record if needed.
    pub async fn rank<P>(&self, principal: &P) -> Result<u64, ServiceError>
    where
        P: Principal + ?Sized,
    {
        self.locate(principal.identity(), "rank")
            .await
            .map(|standing| standing.rank)
    }

    /// Rank and score of the principal, creating a zero-score record if needed.
    pub async fn standing<P>(&self, principal: &P) -> Result<Standing, ServiceError>
    where
        P: Principal + ?Sized,
    {
        self.locate(principal.identity(), "standing").await
    }

    /// First `n` records of the ranking; fewer when the ranking is shorter.
    ///
    /// Zero or negative counts yield an empty list.
    pub async fn top_n(&self, n: i64) -> Result<Vec<ScoreRecord>, ServiceError> {
        if n <= 0 {
            return Ok(Vec::new());
        }
        let take = usize::try_from(n).unwrap_or(usize::MAX);
        self.window(0, take, "top_n").await
    }

    /// Top of the ranking using the configured board size.
    pub async fn leaderboard(&self) -> Result<Vec<ScoreRecord>, ServiceError> {
        self.window(0, self.board_size, "leaderboard").await
    }

    /// Zero-based page of `size` records.
    pub async fn page(&self, number: usize, size: usize) -> Result<Vec<ScoreRecord>, ServiceError> {
        if size == 0 {
            return Err(ServiceError::InvalidInput(
                "page size must be strictly positive".into(),
            ));
        }
        let skip = number.checked_mul(size).ok_or_else(|| {
            ServiceError::InvalidInput(format!("page {number} is out of range"))
        })?;
        self.window(skip, size, "page").await
    }

    /// Forget a single identity. Unknown identities are ignored.
    pub async fn remove<P>(&self, principal: &P) -> Result<(), ServiceError>
    where
        P: Principal + ?Sized,
    {
        self.store
            .remove(principal.identity())
            .await
            .map_err(ServiceError::unavailable("remove"))
    }

    /// Drop every tracked identity.
    pub async fn reset(&self) -> Result<(), ServiceError> {
        let count = self
            .store
            .count()
            .await
            .map_err(ServiceError::unavailable("reset"))?;
        warn!(count, "resetting leaderboard");
        self.store
            .clear()
            .await
            .map_err(ServiceError::unavailable("reset"))
    }

    /// Ensure `identity` exists then walk the ranking until it shows up.
    async fn locate(
        &self,
        identity: &str,
        operation: &'static str,
    ) -> Result<Standing, ServiceError> {
        self.store
            .find_or_create(identity)
            .await
            .map_err(ServiceError::unavailable(operation))?;

        let mut records = self.store.ordered_all();
        let mut rank = 0;
        while let Some(record) = records
            .try_next()
            .await
            .map_err(ServiceError::unavailable(operation))?
        {
            rank += 1;
            if record.identity() == identity {
                return Ok(Standing {
                    rank,
                    score: record.score(),
                });
            }
        }

        error!(
            identity,
            operation, "identity missing from the ranking right after it was created"
        );
        Err(ServiceError::Inconsistent {
            operation,
            identity: identity.to_owned(),
        })
    }

    /// Collect up to `take` records after skipping the first `skip` ones.
    ///
    /// Skipped records are still pulled through the stream so store failures
    /// anywhere before the window surface as errors.
    async fn window(
        &self,
        skip: usize,
        take: usize,
        operation: &'static str,
    ) -> Result<Vec<ScoreRecord>, ServiceError> {
        let mut window = Vec::new();
        if take == 0 {
            return Ok(window);
        }

        let mut records = self.store.ordered_all();
        let mut position = 0;
        while let Some(record) = records
            .try_next()
            .await
            .map_err(ServiceError::unavailable(operation))?
        {
            if position >= skip {
                window.push(record);
                if window.len() == take {
                    break;
                }
            }
            position += 1;
        }
        Ok(window)
    }
}
