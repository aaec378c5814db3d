//! Query path: delegation of native searches and re-ranking of their results.

mod delegator;
mod native;

pub use delegator::QueryDelegator;
pub use native::ListingExecutor;
