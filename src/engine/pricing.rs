use anyhow::Result;
use rust_decimal::Decimal;

use crate::domain::enums::Direction;
use crate::domain::error::EngineError;
use crate::domain::model::pricing::{LevelOutcome, OrderSpec, PricingRequest};

/// Converts a per-level budget and a percentage offset into an
/// exchange-compliant price and lot quantity. Pure function, no state.
///
/// Every rounding step floors, so the committed money can only shrink:
/// `total_spent <= amount / levels_count` holds for every priced result,
/// the price is an exact multiple of the tick size, and it stays inside the
/// limit band when one is present.
pub struct PricingEngine;

impl PricingEngine {
    pub fn compute_level(request: &PricingRequest) -> Result<LevelOutcome> {
        let instrument = &request.instrument;

        if request.levels_count == 0 {
            return Err(EngineError::InvalidPricingInput("levels_count must be positive").into());
        }
        if request.amount <= Decimal::ZERO {
            return Err(EngineError::InvalidPricingInput("amount must be positive").into());
        }
        if instrument.lot_size == 0 {
            return Err(EngineError::InvalidPricingInput("lot_size must be positive").into());
        }
        if instrument.min_price_increment <= Decimal::ZERO {
            return Err(EngineError::InvalidPricingInput(
                "min_price_increment must be positive",
            )
            .into());
        }
        if instrument.current_price <= Decimal::ZERO {
            return Err(EngineError::InvalidPricingInput("current_price must be positive").into());
        }

        let budget_per_level = request.amount / Decimal::from(request.levels_count);

        let price_change =
            instrument.current_price * request.percentage_for_level / Decimal::from(100);
        let base_price = match request.direction {
            Direction::Buy => instrument.current_price - price_change,
            Direction::Sell => instrument.current_price + price_change,
        };

        // Clamp only against the sides the venue actually publishes.
        let mut clamped = base_price;
        if let Some(limit_up) = instrument.limit_up {
            clamped = clamped.min(limit_up);
        }
        if let Some(limit_down) = instrument.limit_down {
            clamped = clamped.max(limit_down);
        }

        let final_price = snap_to_increment(clamped, instrument.min_price_increment);
        if final_price <= Decimal::ZERO {
            return Ok(LevelOutcome::Insufficient);
        }

        let raw_lot_count = floor_div(budget_per_level, final_price);
        let final_lot_count = raw_lot_count / instrument.lot_size;
        if final_lot_count == 0 {
            return Ok(LevelOutcome::Insufficient);
        }

        let total_spent =
            Decimal::from(final_lot_count * instrument.lot_size) * final_price;
        let remainder = budget_per_level - total_spent;

        Ok(LevelOutcome::Priced(OrderSpec {
            price: final_price,
            lot_count: final_lot_count,
            total_spent,
            remainder,
        }))
    }
}

/// Largest multiple of `increment` not exceeding `price`.
fn snap_to_increment(price: Decimal, increment: Decimal) -> Decimal {
    (price / increment).floor() * increment
}

/// `floor(numerator / denominator)` as a lot count. Callers guarantee a
/// positive denominator.
fn floor_div(numerator: Decimal, denominator: Decimal) -> u64 {
    let floored = (numerator / denominator).floor();
    if floored <= Decimal::ZERO {
        return 0;
    }
    floored.try_into().unwrap_or(u64::MAX)
}
