/// Registry of reusable grants.
pub mod catalog;
/// Point grant value type.
pub mod grant;
/// Name checks applied when building grants.
pub mod validation;

pub use catalog::PointsCatalog;
pub use grant::PointGrant;
