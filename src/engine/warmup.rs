use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::domain::traits::DurableOrderStore;
use crate::engine::order_cache::OrderCache;

/// Rebuilds the cache from the durable store at process start. This is the
/// only read the engine ever performs against the store; afterwards the
/// store is write-only audit territory.
pub async fn warm_up(cache: &OrderCache, store: &Arc<dyn DurableOrderStore>) -> Result<usize> {
    let pending = store.load_pending().await?;
    let loaded = pending.len();
    for order in pending {
        // put() itself skips rows that are no longer ready to send.
        cache.put(order);
    }
    let cached = cache.len();
    info!(
        "Warm-up complete: {} pending orders loaded, {} cached",
        loaded, cached
    );
    Ok(cached)
}
