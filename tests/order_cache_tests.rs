use chrono::NaiveTime;
use rust_decimal_macros::dec;

use dispatch_bot::domain::enums::{Direction, OrderStatus, OrderType};
use dispatch_bot::domain::model::order::Order;
use dispatch_bot::engine::OrderCache;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn pending_order(id: &str, scheduled: NaiveTime) -> Order {
    Order {
        order_id: id.to_string(),
        instrument_id: "BBG004730N88".to_string(),
        quantity: 10,
        price: dec!(250.00),
        direction: Direction::Buy,
        account_id: "acc-1".to_string(),
        order_type: OrderType::Limit,
        scheduled_time: scheduled,
        status: OrderStatus::Pending,
    }
}

#[test]
fn due_and_overdue_are_disjoint() {
    // Scenario: order scheduled for 09:30, inserted "at 09:29".
    let cache = OrderCache::new();
    cache.put(pending_order("ord-1", t(9, 30)));

    let due = cache.get_due_at(t(9, 30));
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].order_id, "ord-1");
    assert!(cache.get_overdue_before(t(9, 30)).is_empty());

    // After dispatch it is absent from both.
    cache.remove("ord-1");
    assert!(cache.get_due_at(t(9, 30)).is_empty());
    assert!(cache.get_overdue_before(t(9, 31)).is_empty());
}

#[test]
fn scheduled_time_is_normalized_to_the_minute() {
    let cache = OrderCache::new();
    let with_seconds = NaiveTime::from_hms_milli_opt(10, 15, 42, 137).unwrap();
    cache.put(pending_order("ord-1", with_seconds));

    let due = cache.get_due_at(t(10, 15));
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].scheduled_time, t(10, 15));
}

#[test]
fn rejects_orders_that_are_not_ready() {
    let cache = OrderCache::new();

    let mut zero_quantity = pending_order("ord-1", t(9, 30));
    zero_quantity.quantity = 0;
    cache.put(zero_quantity);

    let mut already_sent = pending_order("ord-2", t(9, 30));
    already_sent.status = OrderStatus::Sent;
    cache.put(already_sent);

    let mut blank_account = pending_order("ord-3", t(9, 30));
    blank_account.account_id = String::new();
    cache.put(blank_account);

    assert!(cache.is_empty());
}

#[test]
fn reinsert_same_id_reindexes() {
    let cache = OrderCache::new();
    cache.put(pending_order("ord-1", t(9, 30)));

    // Same id, new minute: the old bucket entry must disappear.
    cache.put(pending_order("ord-1", t(14, 45)));

    assert_eq!(cache.len(), 1);
    assert!(cache.get_due_at(t(9, 30)).is_empty());
    assert_eq!(cache.get_due_at(t(14, 45)).len(), 1);
    assert!(cache.index_is_consistent());
}

#[test]
fn overdue_query_is_strict_and_ordered() {
    let cache = OrderCache::new();
    cache.put(pending_order("early", t(9, 0)));
    cache.put(pending_order("later", t(9, 15)));
    cache.put(pending_order("exact", t(9, 30)));
    cache.put(pending_order("future", t(16, 0)));

    let overdue = cache.get_overdue_before(t(9, 30));
    let ids: Vec<&str> = overdue.iter().map(|o| o.order_id.as_str()).collect();
    // Strictly earlier than the cutoff, ascending by minute.
    assert_eq!(ids, vec!["early", "later"]);
}

#[test]
fn overdue_sweep_is_idempotent_without_mutation() {
    let cache = OrderCache::new();
    cache.put(pending_order("a", t(9, 0)));
    cache.put(pending_order("b", t(9, 10)));

    let first: Vec<String> = cache
        .get_overdue_before(t(10, 0))
        .into_iter()
        .map(|o| o.order_id)
        .collect();
    let second: Vec<String> = cache
        .get_overdue_before(t(10, 0))
        .into_iter()
        .map(|o| o.order_id)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn index_stays_consistent_under_churn() {
    let cache = OrderCache::new();

    for i in 0..50 {
        let minute = t(9 + (i % 4), (i * 7) % 60);
        cache.put(pending_order(&format!("ord-{}", i), minute));
    }
    assert!(cache.index_is_consistent());

    for i in (0..50).step_by(2) {
        cache.remove(&format!("ord-{}", i));
    }
    assert!(cache.index_is_consistent());
    assert_eq!(cache.len(), 25);

    // Removing the rest must leave no dangling buckets.
    for i in (1..50).step_by(2) {
        cache.remove(&format!("ord-{}", i));
    }
    assert!(cache.is_empty());
    assert!(cache.index_is_consistent());
}

#[test]
fn remove_absent_id_is_a_noop() {
    let cache = OrderCache::new();
    cache.put(pending_order("ord-1", t(9, 30)));
    cache.remove("no-such-order");
    assert_eq!(cache.len(), 1);
    assert!(cache.index_is_consistent());
}

#[test]
fn take_claims_exactly_once() {
    let cache = OrderCache::new();
    cache.put(pending_order("ord-1", t(9, 30)));

    let claimed = cache.take("ord-1");
    assert!(claimed.is_some());
    assert!(cache.take("ord-1").is_none());
    assert!(cache.is_empty());
}

#[test]
fn snapshot_is_detached_from_live_state() {
    let cache = OrderCache::new();
    cache.put(pending_order("ord-1", t(9, 30)));
    cache.put(pending_order("ord-2", t(9, 31)));

    let snapshot = cache.snapshot();
    assert_eq!(snapshot.len(), 2);

    cache.remove("ord-1");
    cache.remove("ord-2");

    // The copy is unaffected by later mutation.
    assert_eq!(snapshot.len(), 2);
    assert!(cache.is_empty());
}
