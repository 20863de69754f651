use serde::{Serialize, Deserialize, Serializer};
use anyhow::{Result, anyhow};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

// Audit consumers expect plain lowercase strings, so serialization is pinned
// here instead of being left to the derive.
impl Serialize for Direction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Direction::Buy => serializer.serialize_str("buy"),
            Direction::Sell => serializer.serialize_str("sell"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl Serialize for OrderType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OrderType::Limit => serializer.serialize_str("limit"),
            OrderType::Market => serializer.serialize_str("market"),
        }
    }
}

/// Lifecycle of a scheduled order. The dispatch engine itself only moves an
/// order out of `Pending` into `Sent` or `Error`; the later statuses are
/// written by the audit/persistence side once the venue reports back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Sent,
    Error,
    Executed,
    Rejected,
    Cancelled,
}

impl Serialize for OrderStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OrderStatus::Pending => serializer.serialize_str("pending"),
            OrderStatus::Sent => serializer.serialize_str("sent"),
            OrderStatus::Error => serializer.serialize_str("error"),
            OrderStatus::Executed => serializer.serialize_str("executed"),
            OrderStatus::Rejected => serializer.serialize_str("rejected"),
            OrderStatus::Cancelled => serializer.serialize_str("cancelled"),
        }
    }
}

impl OrderStatus {
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "sent" => Ok(OrderStatus::Sent),
            "error" => Ok(OrderStatus::Error),
            "executed" => Ok(OrderStatus::Executed),
            "rejected" => Ok(OrderStatus::Rejected),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(anyhow!("Unknown order status: {}", s)),
        }
    }
}

/// Helper function to convert Direction to string
pub fn direction_to_string(direction: &Direction) -> &'static str {
    match direction {
        Direction::Buy => "buy",
        Direction::Sell => "sell",
    }
}
