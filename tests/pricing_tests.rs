use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use dispatch_bot::domain::enums::Direction;
use dispatch_bot::domain::error::EngineError;
use dispatch_bot::domain::model::pricing::{InstrumentSnapshot, LevelOutcome, PricingRequest};
use dispatch_bot::engine::PricingEngine;

fn snapshot(price: Decimal, tick: Decimal, lot_size: u64) -> InstrumentSnapshot {
    InstrumentSnapshot {
        current_price: price,
        min_price_increment: tick,
        lot_size,
        limit_up: None,
        limit_down: None,
    }
}

fn request(
    amount: Decimal,
    levels: u32,
    direction: Direction,
    pct: Decimal,
    instrument: InstrumentSnapshot,
) -> PricingRequest {
    PricingRequest {
        amount,
        levels_count: levels,
        direction,
        percentage_for_level: pct,
        instrument,
    }
}

#[test]
fn buy_level_scenario() -> Result<()> {
    // amount=100000 over 5 levels, 2% below a 250 reference price.
    let req = request(
        dec!(100000),
        5,
        Direction::Buy,
        dec!(2),
        snapshot(dec!(250), dec!(0.01), 10),
    );

    let outcome = PricingEngine::compute_level(&req)?;
    let spec = outcome.as_priced().expect("expected a priced level");

    assert_eq!(spec.price, dec!(245.00));
    assert_eq!(spec.lot_count, 8);
    assert_eq!(spec.total_spent, dec!(19600.00));
    assert_eq!(spec.remainder, dec!(400.00));
    Ok(())
}

#[test]
fn sell_level_moves_price_up() -> Result<()> {
    let req = request(
        dec!(100000),
        5,
        Direction::Sell,
        dec!(2),
        snapshot(dec!(250), dec!(0.01), 10),
    );

    let outcome = PricingEngine::compute_level(&req)?;
    let spec = outcome.as_priced().expect("expected a priced level");

    assert_eq!(spec.price, dec!(255.00));
    // floor(20000 / 255) = 78 -> 7 lots of 10
    assert_eq!(spec.lot_count, 7);
    assert_eq!(spec.total_spent, dec!(17850.00));
    Ok(())
}

#[test]
fn insufficient_budget_for_one_lot() -> Result<()> {
    // budget per level 1000, price 300, lot size 10: raw count 3 floors to 0 lots.
    let req = request(
        dec!(1000),
        1,
        Direction::Buy,
        dec!(0),
        snapshot(dec!(300), dec!(0.01), 10),
    );

    assert_eq!(PricingEngine::compute_level(&req)?, LevelOutcome::Insufficient);
    Ok(())
}

#[test]
fn clamps_against_limit_up() -> Result<()> {
    // 8% above 250 would be 270, but the band caps at 260.
    let mut instrument = snapshot(dec!(250), dec!(0.01), 1);
    instrument.limit_up = Some(dec!(260));

    let req = request(dec!(100000), 1, Direction::Sell, dec!(8), instrument);
    let outcome = PricingEngine::compute_level(&req)?;
    let spec = outcome.as_priced().expect("expected a priced level");

    assert_eq!(spec.price, dec!(260.00));
    Ok(())
}

#[test]
fn clamps_against_limit_down() -> Result<()> {
    let mut instrument = snapshot(dec!(250), dec!(0.01), 1);
    instrument.limit_down = Some(dec!(245));

    let req = request(dec!(100000), 1, Direction::Buy, dec!(10), instrument);
    let outcome = PricingEngine::compute_level(&req)?;
    let spec = outcome.as_priced().expect("expected a priced level");

    // 10% below 250 is 225, clamped back up to the band floor.
    assert_eq!(spec.price, dec!(245.00));
    Ok(())
}

#[test]
fn missing_limit_side_is_unconstrained() -> Result<()> {
    let mut instrument = snapshot(dec!(250), dec!(0.01), 1);
    instrument.limit_down = Some(dec!(100));

    let req = request(dec!(100000), 1, Direction::Sell, dec!(20), instrument);
    let outcome = PricingEngine::compute_level(&req)?;
    let spec = outcome.as_priced().expect("expected a priced level");

    // No limit_up, so the 20% bump stands as-is.
    assert_eq!(spec.price, dec!(300.00));
    Ok(())
}

#[test]
fn price_snaps_down_to_tick() -> Result<()> {
    // 1.5% below 123.45 = 121.59825, which floors to the 0.05 grid.
    let req = request(
        dec!(50000),
        2,
        Direction::Buy,
        dec!(1.5),
        snapshot(dec!(123.45), dec!(0.05), 1),
    );

    let outcome = PricingEngine::compute_level(&req)?;
    let spec = outcome.as_priced().expect("expected a priced level");

    assert_eq!(spec.price, dec!(121.55));
    assert_eq!(spec.price % dec!(0.05), dec!(0.00));
    Ok(())
}

#[test]
fn never_spends_more_than_the_level_budget() -> Result<()> {
    // A grid of awkward inputs; every priced result must respect the
    // per-level budget, the tick grid, and the limit band.
    let amounts = [dec!(777), dec!(10000), dec!(99999.99), dec!(123456.78)];
    let prices = [dec!(0.37), dec!(3.14), dec!(250), dec!(9999.95)];
    let ticks = [dec!(0.01), dec!(0.05), dec!(5)];
    let lot_sizes = [1u64, 10, 100];

    for &amount in &amounts {
        for &price in &prices {
            for &tick in &ticks {
                for &lot_size in &lot_sizes {
                    let mut instrument = snapshot(price, tick, lot_size);
                    instrument.limit_down = Some(price * dec!(0.9));
                    instrument.limit_up = Some(price * dec!(1.1));

                    let req = request(amount, 3, Direction::Buy, dec!(2.5), instrument);
                    let budget_per_level = amount / dec!(3);

                    if let LevelOutcome::Priced(spec) = PricingEngine::compute_level(&req)? {
                        assert!(
                            spec.total_spent <= budget_per_level,
                            "overspent: {} > {} (price={} tick={} lot={})",
                            spec.total_spent,
                            budget_per_level,
                            price,
                            tick,
                            lot_size
                        );
                        assert!(spec.remainder >= Decimal::ZERO);
                        assert_eq!(spec.price % tick, Decimal::ZERO, "off-grid price");
                        assert!(spec.price <= price * dec!(1.1));
                        assert!(spec.price >= (price * dec!(0.9) / tick).floor() * tick);
                        assert!(spec.lot_count > 0);
                    }
                }
            }
        }
    }
    Ok(())
}

#[test]
fn zero_floored_price_is_insufficient() -> Result<()> {
    // Price collapses below one tick after the offset; nothing sane to buy.
    let req = request(
        dec!(1000),
        1,
        Direction::Buy,
        dec!(99.9),
        snapshot(dec!(0.04), dec!(0.05), 1),
    );

    assert_eq!(PricingEngine::compute_level(&req)?, LevelOutcome::Insufficient);
    Ok(())
}

#[test]
fn rejects_invalid_inputs() {
    let base = snapshot(dec!(250), dec!(0.01), 10);

    let zero_levels = request(dec!(1000), 0, Direction::Buy, dec!(1), base.clone());
    let err = PricingEngine::compute_level(&zero_levels).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::InvalidPricingInput(_))
    ));

    let zero_amount = request(dec!(0), 1, Direction::Buy, dec!(1), base.clone());
    assert!(PricingEngine::compute_level(&zero_amount).is_err());

    let mut bad_tick = base.clone();
    bad_tick.min_price_increment = dec!(0);
    let req = request(dec!(1000), 1, Direction::Buy, dec!(1), bad_tick);
    assert!(PricingEngine::compute_level(&req).is_err());

    let mut bad_lot = base;
    bad_lot.lot_size = 0;
    let req = request(dec!(1000), 1, Direction::Buy, dec!(1), bad_lot);
    assert!(PricingEngine::compute_level(&req).is_err());
}
