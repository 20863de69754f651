use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use tokio::sync::RwLock;
use tokio::time::sleep;

use crate::config_loader::LimitsConfig;
use crate::domain::model::limits::InstrumentLimits;
use crate::domain::traits::{LimitsGateway, ReferenceInstrumentProvider};

#[derive(Default)]
struct LimitsSnapshot {
    list: Vec<InstrumentLimits>,
    by_id: HashMap<String, InstrumentLimits>,
}

/// Sequential batch refresh of per-instrument price limits.
///
/// Sequential on purpose: the upstream limits endpoint is rate limited and
/// shared, so instruments are fetched one at a time with a pause between
/// them, and each instrument gets bounded retry with exponential backoff.
/// A finished batch replaces the previous snapshot in a single write, so
/// readers never see a partially-updated list.
pub struct LimitsFetcher {
    instruments: Arc<dyn ReferenceInstrumentProvider>,
    gateway: Arc<dyn LimitsGateway>,
    config: LimitsConfig,
    snapshot: RwLock<Arc<LimitsSnapshot>>,
}

impl LimitsFetcher {
    pub fn new(
        instruments: Arc<dyn ReferenceInstrumentProvider>,
        gateway: Arc<dyn LimitsGateway>,
        config: LimitsConfig,
    ) -> Self {
        Self {
            instruments,
            gateway,
            config,
            snapshot: RwLock::new(Arc::new(LimitsSnapshot::default())),
        }
    }

    /// Refreshes limits for the de-duplicated union of the equity and
    /// futures universes. Returns the number of instruments whose limits
    /// were actually obtained; failed instruments are recorded with both
    /// sides null so one bad instrument never blocks the batch.
    pub async fn refresh_all(&self) -> Result<usize> {
        let mut ids = self.instruments.list_equity_ids().await?;
        ids.extend(self.instruments.list_future_ids().await?);
        ids.sort();
        ids.dedup();

        info!("Refreshing price limits for {} instruments", ids.len());

        let mut list = Vec::with_capacity(ids.len());
        let mut success_count = 0usize;
        for (i, instrument_id) in ids.iter().enumerate() {
            match self.fetch_with_retry(instrument_id).await {
                Some(limits) => {
                    success_count += 1;
                    list.push(limits);
                }
                None => list.push(InstrumentLimits::unavailable(instrument_id)),
            }

            if i + 1 < ids.len() {
                sleep(Duration::from_millis(self.config.pause_between_ms)).await;
            }
        }

        let by_id = list
            .iter()
            .map(|l| (l.instrument_id.clone(), l.clone()))
            .collect();
        // Single swap; a concurrent reader sees either the old batch or the
        // new one, never a mix.
        *self.snapshot.write().await = Arc::new(LimitsSnapshot { list, by_id });

        info!(
            "Price limits refresh complete: {} of {} instruments succeeded",
            success_count,
            ids.len()
        );
        Ok(success_count)
    }

    async fn fetch_with_retry(&self, instrument_id: &str) -> Option<InstrumentLimits> {
        for attempt in 1..=self.config.max_attempts {
            match self.gateway.fetch(instrument_id).await {
                Ok(limits) => {
                    debug!(
                        "Fetched limits for {}: up={:?} down={:?}",
                        instrument_id, limits.limit_up, limits.limit_down
                    );
                    return Some(limits);
                }
                Err(e) => {
                    warn!(
                        "Limits fetch for {} failed (attempt {}/{}): {}",
                        instrument_id, attempt, self.config.max_attempts, e
                    );
                    if attempt < self.config.max_attempts {
                        let backoff = self.config.backoff_base_ms * attempt as u64;
                        sleep(Duration::from_millis(backoff)).await;
                    }
                }
            }
        }
        warn!(
            "Limits for {} unavailable after {} attempts, recording null band",
            instrument_id, self.config.max_attempts
        );
        None
    }

    pub async fn get_by_instrument(&self, instrument_id: &str) -> Option<InstrumentLimits> {
        let snapshot = self.snapshot.read().await;
        snapshot.by_id.get(instrument_id).cloned()
    }

    /// The last published batch, empty if no refresh has run yet.
    pub async fn get_all(&self) -> Vec<InstrumentLimits> {
        self.snapshot.read().await.list.clone()
    }
}
