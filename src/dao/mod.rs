/// Score record entity and ranking order.
pub mod models;
/// Ranking store contract and its backends.
pub mod ranking_store;
/// Backend-agnostic storage failures.
pub mod storage;
