use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveTime;
use log::{debug, warn};

use crate::domain::model::order::Order;

/// The authoritative view of "what is still waiting to be sent".
///
/// Two indexes behind one lock: the primary map by order id and a secondary
/// minute-granular time index. Keeping both under a single guard is what
/// makes every public operation atomic, so the scheduler tick, the ingestion
/// path, and dispatch workers never observe a half-updated pair. The lock is
/// only ever held for in-memory work, never across I/O.
///
/// Index invariant: every id in the primary map appears in exactly one time
/// bucket (its normalized scheduled minute), every bucket id resolves in the
/// primary map, and an emptied bucket is deleted, never left dangling.
pub struct OrderCache {
    inner: RwLock<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    by_id: HashMap<String, Order>,
    by_minute: BTreeMap<NaiveTime, BTreeSet<String>>,
}

impl CacheInner {
    fn unlink(&mut self, order_id: &str, minute: NaiveTime) {
        if let Some(bucket) = self.by_minute.get_mut(&minute) {
            bucket.remove(order_id);
            if bucket.is_empty() {
                self.by_minute.remove(&minute);
            }
        }
    }
}

impl OrderCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
        }
    }

    // Guard accessors recover from poisoning: the cache holds plain data and
    // a writer panicking mid-operation cannot leave the pair half-linked
    // (unlink/insert are the last statements under the guard).
    fn read(&self) -> RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Inserts a pending order, normalizing its scheduled time to the whole
    /// minute. Orders that are not ready to send are dropped silently (the
    /// ingestion path validates and reports upstream; the cache just refuses
    /// to hold them). Re-inserting an existing id overwrites and re-indexes.
    pub fn put(&self, mut order: Order) {
        if !order.is_ready_to_send() {
            warn!("Order {} is not ready to send, not caching", order.order_id);
            return;
        }
        order.scheduled_time = order.normalized_time();

        let mut inner = self.write();
        if let Some(previous) = inner.by_id.remove(&order.order_id) {
            let prev_minute = previous.scheduled_time;
            inner.unlink(&previous.order_id, prev_minute);
        }
        inner
            .by_minute
            .entry(order.scheduled_time)
            .or_default()
            .insert(order.order_id.clone());
        debug!(
            "Cached order {} scheduled at {}",
            order.order_id, order.scheduled_time
        );
        inner.by_id.insert(order.order_id.clone(), order);
    }

    /// All orders scheduled exactly at `time` (minute precision).
    pub fn get_due_at(&self, time: NaiveTime) -> Vec<Order> {
        let inner = self.read();
        match inner.by_minute.get(&time) {
            Some(bucket) => bucket
                .iter()
                .filter_map(|id| inner.by_id.get(id).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// All orders whose scheduled minute is strictly earlier than `time`,
    /// ascending by minute.
    pub fn get_overdue_before(&self, time: NaiveTime) -> Vec<Order> {
        let inner = self.read();
        inner
            .by_minute
            .range(..time)
            .flat_map(|(_, bucket)| bucket.iter())
            .filter_map(|id| inner.by_id.get(id).cloned())
            .collect()
    }

    /// Removes from both indexes. No-op when absent.
    pub fn remove(&self, order_id: &str) {
        self.take(order_id);
    }

    /// Atomically removes and returns an order. This is the dispatch claim
    /// primitive: whichever caller gets `Some` owns the one and only
    /// submission attempt for that order.
    pub fn take(&self, order_id: &str) -> Option<Order> {
        let mut inner = self.write();
        let order = inner.by_id.remove(order_id)?;
        let minute = order.scheduled_time;
        inner.unlink(order_id, minute);
        Some(order)
    }

    /// Consistent point-in-time copy of every cached order. Cloned, never a
    /// view into live state.
    pub fn snapshot(&self) -> Vec<Order> {
        self.read().by_id.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Both-ways index consistency check used by diagnostics and tests.
    pub fn index_is_consistent(&self) -> bool {
        let inner = self.read();
        let indexed: usize = inner.by_minute.values().map(|b| b.len()).sum();
        if indexed != inner.by_id.len() {
            return false;
        }
        if inner.by_minute.values().any(|b| b.is_empty()) {
            return false;
        }
        inner.by_minute.iter().all(|(minute, bucket)| {
            bucket.iter().all(|id| {
                inner
                    .by_id
                    .get(id)
                    .map(|o| o.scheduled_time == *minute)
                    .unwrap_or(false)
            })
        })
    }
}

impl Default for OrderCache {
    fn default() -> Self {
        Self::new()
    }
}
