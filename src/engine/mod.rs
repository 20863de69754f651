//! Order dispatch engine: the time-indexed cache, the minute scheduler, the
//! limits refresh batch, and the budget-safe pricing function.

pub mod limits_fetcher;
pub mod order_cache;
pub mod pricing;
pub mod scheduler;
pub mod warmup;

pub use limits_fetcher::LimitsFetcher;
pub use order_cache::OrderCache;
pub use pricing::PricingEngine;
pub use scheduler::DispatchScheduler;
pub use warmup::warm_up;
