use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::enums::Direction;

/// Point-in-time view of the instrument parameters pricing needs. Taken as
/// a snapshot so a level computation never races a limits refresh.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    pub current_price: Decimal,
    pub min_price_increment: Decimal,
    pub lot_size: u64,
    pub limit_up: Option<Decimal>,
    pub limit_down: Option<Decimal>,
}

/// Inputs for pricing one level of a budget split. Ephemeral, never stored.
#[derive(Clone, Debug)]
pub struct PricingRequest {
    pub amount: Decimal,
    pub levels_count: u32,
    pub direction: Direction,
    pub percentage_for_level: Decimal,
    pub instrument: InstrumentSnapshot,
}

/// A priced level: exchange-compliant price, lot quantity, and the money
/// actually committed. `total_spent <= amount / levels_count` always holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub price: Decimal,
    pub lot_count: u64,
    pub total_spent: Decimal,
    pub remainder: Decimal,
}

/// Result of pricing one level. `Insufficient` is a valid negative answer,
/// not an error: the per-level budget cannot buy a single lot at the
/// computed price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelOutcome {
    Priced(OrderSpec),
    Insufficient,
}

impl LevelOutcome {
    pub fn as_priced(&self) -> Option<&OrderSpec> {
        match self {
            LevelOutcome::Priced(spec) => Some(spec),
            LevelOutcome::Insufficient => None,
        }
    }
}
