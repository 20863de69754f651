//! In-process collaborators for running the engine without a live venue:
//! a paper broker that accepts everything, a log-only audit sink, and an
//! empty durable store for cold starts.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use serde_json::json;
use tokio::time::sleep;
use uuid::Uuid;

use crate::domain::enums::OrderStatus;
use crate::domain::model::order::{Order, SubmitResult};
use crate::domain::traits::{AuditSink, BrokerGateway, DurableOrderStore};

/// Accepts every order and fabricates a broker id, with optional artificial
/// latency to mimic a slow venue.
pub struct PaperBrokerGateway {
    pub latency: Duration,
}

impl PaperBrokerGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl BrokerGateway for PaperBrokerGateway {
    async fn submit(&self, order: &Order) -> Result<SubmitResult> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        let broker_order_id = format!("paper-{}", Uuid::new_v4());
        info!(
            "Paper fill: {} {} x{} @ {} -> {}",
            order.order_id, order.instrument_id, order.quantity, order.price, broker_order_id
        );
        Ok(SubmitResult::accepted(broker_order_id))
    }
}

/// Writes each outcome as one JSON line through the logger. Failures here
/// cannot exist, which conveniently satisfies the sink contract.
pub struct LogAuditSink;

#[async_trait]
impl AuditSink for LogAuditSink {
    async fn record_outcome(
        &self,
        order_id: &str,
        status: OrderStatus,
        broker_order_id: Option<&str>,
        error_message: Option<&str>,
    ) {
        let record = json!({
            "order_id": order_id,
            "status": status,
            "broker_order_id": broker_order_id,
            "error_message": error_message,
        });
        match status {
            OrderStatus::Error => error!("audit: {}", record),
            _ => info!("audit: {}", record),
        }
    }
}

/// Cold-start store: nothing pending, nothing to warm.
pub struct EmptyOrderStore;

#[async_trait]
impl DurableOrderStore for EmptyOrderStore {
    async fn load_pending(&self) -> Result<Vec<Order>> {
        Ok(Vec::new())
    }
}
