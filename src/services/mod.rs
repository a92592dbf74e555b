/// Identity abstraction accepted by the service.
pub mod principal;
/// Point accrual, rank and ranking views.
pub mod ranking_service;

pub use principal::Principal;
pub use ranking_service::{RankingService, Standing};
