use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::types::class;

/// Track codec and routing counters without external dependencies.
pub(crate) struct Metrics;

static FRAMES_DECODED: AtomicU64 = AtomicU64::new(0);
static FRAMES_ENCODED: AtomicU64 = AtomicU64::new(0);
static HEARTBEATS: AtomicU64 = AtomicU64::new(0);
static DECODE_ERRORS: AtomicU64 = AtomicU64::new(0);
static METHODS_ENCODED: AtomicU64 = AtomicU64::new(0);
static MESSAGES_ROUTED: AtomicU64 = AtomicU64::new(0);
static MESSAGES_UNROUTABLE: AtomicU64 = AtomicU64::new(0);
static DELIVERIES: AtomicU64 = AtomicU64::new(0);
static DELIVERIES_FAILED: AtomicU64 = AtomicU64::new(0);
static ROUTE_LATENCY_TOTAL_NS: AtomicU64 = AtomicU64::new(0);
static ROUTE_LATENCY_MAX_NS: AtomicU64 = AtomicU64::new(0);

const NANOSECONDS_PER_MICROSECOND: u128 = 1_000;

struct ClassCounters {
    connection: AtomicU64,
    channel: AtomicU64,
    exchange: AtomicU64,
    queue: AtomicU64,
    basic: AtomicU64,
}

static DECODED_BY_CLASS: ClassCounters = ClassCounters::new();

impl ClassCounters {
    const fn new() -> Self {
        Self {
            connection: AtomicU64::new(0),
            channel: AtomicU64::new(0),
            exchange: AtomicU64::new(0),
            queue: AtomicU64::new(0),
            basic: AtomicU64::new(0),
        }
    }

    fn increment(&self, class_id: u16) {
        let counter = match class_id {
            class::CONNECTION => &self.connection,
            class::CHANNEL => &self.channel,
            class::EXCHANGE => &self.exchange,
            class::QUEUE => &self.queue,
            class::BASIC => &self.basic,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ClassCountsSnapshot {
        ClassCountsSnapshot {
            connection: self.connection.load(Ordering::Relaxed),
            channel: self.channel.load(Ordering::Relaxed),
            exchange: self.exchange.load(Ordering::Relaxed),
            queue: self.queue.load(Ordering::Relaxed),
            basic: self.basic.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of handing a routed message to one destination.
#[derive(Clone, Copy)]
pub(crate) enum DeliveryResult {
    Delivered,
    Failed,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_encoded() {
        METHODS_ENCODED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_decoded(class_id: u16) {
        DECODED_BY_CLASS.increment(class_id);
    }

    #[inline]
    pub(crate) fn record_frame_decoded(heartbeat: bool) {
        FRAMES_DECODED.fetch_add(1, Ordering::Relaxed);
        if heartbeat {
            HEARTBEATS.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_frame_encoded() {
        FRAMES_ENCODED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_decode_error() {
        DECODE_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_route(destinations: usize, duration: Duration) {
        if destinations == 0 {
            MESSAGES_UNROUTABLE.fetch_add(1, Ordering::Relaxed);
        } else {
            MESSAGES_ROUTED.fetch_add(1, Ordering::Relaxed);
        }

        let nanos = duration.as_nanos().try_into().unwrap_or(u64::MAX);
        ROUTE_LATENCY_TOTAL_NS.fetch_add(nanos, Ordering::Relaxed);
        update_max(&ROUTE_LATENCY_MAX_NS, nanos);
    }

    #[inline]
    pub(crate) fn record_delivery(result: DeliveryResult) {
        match result {
            DeliveryResult::Delivered => DELIVERIES.fetch_add(1, Ordering::Relaxed),
            DeliveryResult::Failed => DELIVERIES_FAILED.fetch_add(1, Ordering::Relaxed),
        };
    }

    #[inline]
    pub(crate) fn totals() -> MetricsSnapshot {
        MetricsSnapshot {
            frames_decoded: FRAMES_DECODED.load(Ordering::Relaxed),
            frames_encoded: FRAMES_ENCODED.load(Ordering::Relaxed),
            heartbeats: HEARTBEATS.load(Ordering::Relaxed),
            decode_errors: DECODE_ERRORS.load(Ordering::Relaxed),
            methods_encoded: METHODS_ENCODED.load(Ordering::Relaxed),
            methods_decoded: DECODED_BY_CLASS.snapshot(),
            messages_routed: MESSAGES_ROUTED.load(Ordering::Relaxed),
            messages_unroutable: MESSAGES_UNROUTABLE.load(Ordering::Relaxed),
            deliveries: DELIVERIES.load(Ordering::Relaxed),
            deliveries_failed: DELIVERIES_FAILED.load(Ordering::Relaxed),
            route_latency_total_ns: ROUTE_LATENCY_TOTAL_NS.load(Ordering::Relaxed),
            route_latency_max_ns: ROUTE_LATENCY_MAX_NS.load(Ordering::Relaxed),
        }
    }
}

fn update_max(target: &AtomicU64, candidate: u64) {
    let mut current = target.load(Ordering::Relaxed);
    while candidate > current {
        match target.compare_exchange_weak(
            current,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return,
            Err(old) => current = old,
        }
    }
}

/// Process-wide counter totals.
///
/// Counters are monotonic and shared by every decoder and exchange in the
/// process; compare two snapshots to measure an interval.
#[must_use]
pub fn metrics_snapshot() -> MetricsSnapshot {
    Metrics::totals()
}

/// Decoded method counts per class.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ClassCountsSnapshot {
    pub connection: u64,
    pub channel: u64,
    pub exchange: u64,
    pub queue: u64,
    pub basic: u64,
}

impl ClassCountsSnapshot {
    /// Sum over every class.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.connection + self.channel + self.exchange + self.queue + self.basic
    }
}

/// Lightweight snapshot of critical counters.
#[derive(Default, Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct MetricsSnapshot {
    pub frames_decoded: u64,
    pub frames_encoded: u64,
    pub heartbeats: u64,
    pub decode_errors: u64,
    pub methods_encoded: u64,
    pub methods_decoded: ClassCountsSnapshot,
    pub messages_routed: u64,
    pub messages_unroutable: u64,
    pub deliveries: u64,
    pub deliveries_failed: u64,
    pub route_latency_total_ns: u64,
    pub route_latency_max_ns: u64,
}

impl MetricsSnapshot {
    /// Average routing latency in microseconds.
    #[must_use]
    pub fn avg_route_latency_us(&self) -> Option<u64> {
        average_microseconds(
            self.route_latency_total_ns,
            self.messages_routed + self.messages_unroutable,
        )
    }
}

fn average_microseconds(total_ns: u64, count: u64) -> Option<u64> {
    if count == 0 {
        return None;
    }

    let total_ns_u128 = u128::from(total_ns);
    u64::try_from(total_ns_u128 / (u128::from(count) * NANOSECONDS_PER_MICROSECOND)).ok()
}
