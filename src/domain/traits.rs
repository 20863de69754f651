use crate::domain::enums::OrderStatus;
use crate::domain::model::limits::InstrumentLimits;
use crate::domain::model::order::{Order, SubmitResult};
use anyhow::Result;
use async_trait::async_trait;

/// Submits one order to the execution venue. May time out or fail; the
/// implementation owns its own request timeout.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    async fn submit(&self, order: &Order) -> Result<SubmitResult>;
}

/// Fire-and-forget outcome log. Implementations must swallow their own
/// failures; nothing here may propagate back into the dispatch path.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record_outcome(
        &self,
        order_id: &str,
        status: OrderStatus,
        broker_order_id: Option<&str>,
        error_message: Option<&str>,
    );
}

/// Read once at startup to warm the cache. Write-only audit otherwise.
#[async_trait]
pub trait DurableOrderStore: Send + Sync {
    async fn load_pending(&self) -> Result<Vec<Order>>;
}

/// Per-instrument price band endpoint. Rate limited upstream, hence the
/// sequential fetch batch with backoff in the limits fetcher.
#[async_trait]
pub trait LimitsGateway: Send + Sync {
    async fn fetch(&self, instrument_id: &str) -> Result<InstrumentLimits>;
}

/// Supplies the instrument universe for the limits refresh.
#[async_trait]
pub trait ReferenceInstrumentProvider: Send + Sync {
    async fn list_equity_ids(&self) -> Result<Vec<String>>;
    async fn list_future_ids(&self) -> Result<Vec<String>>;
}
