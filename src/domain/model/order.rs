// Domain model for scheduled orders
use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::enums::{Direction, OrderStatus, OrderType};

/// A single time-scheduled order. The id is assigned by the caller, never by
/// the engine. `scheduled_time` is a date-free wall-clock minute: the order
/// recurs at that minute until it is dispatched or evicted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub instrument_id: String,
    pub quantity: u64,
    pub price: Decimal,
    pub direction: Direction,
    pub account_id: String,
    pub order_type: OrderType,
    pub scheduled_time: NaiveTime,
    pub status: OrderStatus,
}

impl Order {
    /// An order may enter the cache (and reach the broker) only while it
    /// satisfies this predicate.
    pub fn is_ready_to_send(&self) -> bool {
        !self.order_id.is_empty()
            && !self.instrument_id.is_empty()
            && !self.account_id.is_empty()
            && self.quantity > 0
            && self.price >= Decimal::ZERO
            && self.status == OrderStatus::Pending
    }

    /// Scheduling works at whole-minute granularity.
    pub fn normalized_time(&self) -> NaiveTime {
        truncate_to_minute(self.scheduled_time)
    }
}

pub fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

/// Outcome of one submission attempt, as reported by the broker gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitResult {
    pub accepted: bool,
    pub broker_order_id: Option<String>,
    pub error_message: Option<String>,
}

impl SubmitResult {
    pub fn accepted(broker_order_id: impl Into<String>) -> Self {
        Self {
            accepted: true,
            broker_order_id: Some(broker_order_id.into()),
            error_message: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            broker_order_id: None,
            error_message: Some(reason.into()),
        }
    }
}
