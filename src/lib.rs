//! Per-player point tracking with an always-sorted ranking.
//!
//! Hosts open a [`dao::ranking_store::RankingStore`] (in memory or SQLite),
//! wrap it in a [`services::RankingService`] and feed it [`points::PointGrant`]s.

pub mod config;
pub mod dao;
pub mod error;
pub mod points;
pub mod services;
