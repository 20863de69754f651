pub mod config_loader;
pub mod domain;
pub mod engine;
pub mod infrastructure;

pub use domain::enums::*;
pub use domain::error::EngineError;
pub use domain::model::limits::*;
pub use domain::model::order::*;
pub use domain::model::pricing::*;
pub use domain::traits::*;
pub use engine::limits_fetcher::LimitsFetcher;
pub use engine::order_cache::OrderCache;
pub use engine::pricing::PricingEngine;
pub use engine::scheduler::DispatchScheduler;
pub use engine::warmup::warm_up;
