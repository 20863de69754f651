use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{FixedOffset, NaiveTime, Utc};
use log::{error, info, warn};
use tokio::sync::{broadcast, Semaphore};
use tokio::time::{sleep, timeout};

use crate::config_loader::SchedulerConfig;
use crate::domain::enums::OrderStatus;
use crate::domain::error::EngineError;
use crate::domain::model::order::{truncate_to_minute, Order, SubmitResult};
use crate::domain::traits::{AuditSink, BrokerGateway};
use crate::engine::order_cache::OrderCache;

/// Periodic driver of the order cache.
///
/// One serialized tick per cadence interval: compute the current minute in
/// the configured trading zone, evict overdue entries, and fan the due set
/// out to a bounded pool of dispatch workers. The tick never waits for the
/// dispatches it launches.
///
/// Dispatch is at-most-once: every path that may submit an order first
/// claims it with `OrderCache::take`, so concurrent ticks and manual
/// `force_send` can never both reach the gateway for the same id. There is
/// no automatic retry; a failed attempt is terminal and leaves exactly one
/// audit record.
pub struct DispatchScheduler {
    cache: Arc<OrderCache>,
    gateway: Arc<dyn BrokerGateway>,
    audit: Arc<dyn AuditSink>,
    config: SchedulerConfig,
    trading_zone: FixedOffset,
    dispatch_permits: Arc<Semaphore>,
}

impl DispatchScheduler {
    pub fn new(
        cache: Arc<OrderCache>,
        gateway: Arc<dyn BrokerGateway>,
        audit: Arc<dyn AuditSink>,
        config: SchedulerConfig,
    ) -> Result<Self> {
        let trading_zone = config.trading_zone()?;
        let dispatch_permits = Arc::new(Semaphore::new(config.worker_count));
        Ok(Self {
            cache,
            gateway,
            audit,
            config,
            trading_zone,
            dispatch_permits,
        })
    }

    /// Runs ticks until the shutdown signal arrives, then drains in-flight
    /// dispatches within the configured grace period.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.tick_interval_secs));
        info!(
            "Dispatch scheduler started: tick every {}s, zone {}",
            self.config.tick_interval_secs, self.config.trading_utc_offset
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = self.current_minute();
                    if let Err(e) = self.tick(now).await {
                        // Next tick must still run.
                        error!("Scheduler tick at {} failed: {:?}", now, e);
                    }
                }
                _ = shutdown.recv() => {
                    info!("Dispatch scheduler received shutdown signal");
                    self.drain().await;
                    return Ok(());
                }
            }
        }
    }

    /// Current wall-clock minute in the trading zone, never the host-local
    /// zone.
    pub fn current_minute(&self) -> NaiveTime {
        truncate_to_minute(Utc::now().with_timezone(&self.trading_zone).time())
    }

    /// One scheduler pass for the given minute: sweep overdue entries, then
    /// launch a fire-and-forget dispatch task for every due order.
    pub async fn tick(&self, now: NaiveTime) -> Result<()> {
        for stale in self.cache.get_overdue_before(now) {
            // Claim before acting; a racing force_send may already own it.
            if let Some(order) = self.cache.take(&stale.order_id) {
                warn!(
                    "Order {} missed its {} dispatch window, evicting",
                    order.order_id, order.scheduled_time
                );
                self.audit
                    .record_outcome(
                        &order.order_id,
                        OrderStatus::Error,
                        None,
                        Some("scheduled dispatch window missed"),
                    )
                    .await;
            }
        }

        let due = self.cache.get_due_at(now);
        if due.is_empty() {
            return Ok(());
        }
        info!("{} orders due at {}", due.len(), now);

        for order in due {
            self.spawn_dispatch(order.order_id);
        }
        Ok(())
    }

    fn spawn_dispatch(&self, order_id: String) {
        let cache = self.cache.clone();
        let gateway = self.gateway.clone();
        let audit = self.audit.clone();
        let permits = self.dispatch_permits.clone();
        let delay = Duration::from_millis(self.config.dispatch_delay_ms);

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                // Closed semaphore means shutdown already drained the pool.
                Err(_) => return,
            };
            // Spreads a minute's burst out against the upstream rate limit.
            sleep(delay).await;

            let Some(order) = cache.take(&order_id) else {
                return;
            };
            let _ = submit_once(gateway.as_ref(), audit.as_ref(), &order).await;
        });
    }

    /// Manual override: claims the order regardless of its scheduled time,
    /// submits synchronously, and returns the raw gateway result. The same
    /// claim-and-audit discipline as the scheduled path, so a force-send can
    /// never double-dispatch against a racing tick.
    pub async fn force_send(&self, order_id: &str) -> Result<SubmitResult> {
        let order = self
            .cache
            .take(order_id)
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;

        if !order.is_ready_to_send() {
            // Unreachable while the cache's put guard holds; the claimed
            // entry is discarded since it could never be sent.
            return Err(EngineError::OrderNotReady(order.order_id).into());
        }

        submit_once(self.gateway.as_ref(), self.audit.as_ref(), &order).await
    }

    /// Waits for in-flight dispatch tasks up to the grace period, then
    /// closes the pool so queued tasks give up. In-flight work past the
    /// grace period is lost, which shutdown accepts.
    async fn drain(&self) {
        let workers = self.config.worker_count as u32;
        let grace = Duration::from_secs(self.config.shutdown_grace_secs);
        match timeout(grace, self.dispatch_permits.acquire_many(workers)).await {
            Ok(Ok(_all)) => info!("All dispatch workers drained"),
            Ok(Err(_)) => {}
            Err(_) => warn!(
                "Dispatch workers still busy after {}s grace, aborting them",
                self.config.shutdown_grace_secs
            ),
        }
        self.dispatch_permits.close();
    }
}

/// The single submission attempt for an order: one gateway call, one audit
/// record, no retry. The caller has already removed the order from the
/// cache.
async fn submit_once(
    gateway: &dyn BrokerGateway,
    audit: &dyn AuditSink,
    order: &Order,
) -> Result<SubmitResult> {
    match gateway.submit(order).await {
        Ok(result) if result.accepted => {
            info!(
                "Order {} accepted by broker as {:?}",
                order.order_id, result.broker_order_id
            );
            audit
                .record_outcome(
                    &order.order_id,
                    OrderStatus::Sent,
                    result.broker_order_id.as_deref(),
                    None,
                )
                .await;
            Ok(result)
        }
        Ok(result) => {
            warn!(
                "Order {} rejected by broker: {:?}",
                order.order_id, result.error_message
            );
            audit
                .record_outcome(
                    &order.order_id,
                    OrderStatus::Error,
                    None,
                    result.error_message.as_deref(),
                )
                .await;
            Ok(result)
        }
        Err(e) => {
            error!("Order {} submission failed: {:?}", order.order_id, e);
            audit
                .record_outcome(
                    &order.order_id,
                    OrderStatus::Error,
                    None,
                    Some(&e.to_string()),
                )
                .await;
            Err(e)
        }
    }
}
