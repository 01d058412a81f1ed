//! Routing table and headers exchange

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, instrument, trace, warn};

use super::{Binding, BindingId, DeliveryError, HeadersBinding, MessageHeaders, QueueId, Result};
use crate::protocol::FieldTable;
use crate::protocol::metrics::{DeliveryResult, Metrics};

/// Storage and delivery boundary of the routing core.
///
/// Implementations own queue lifecycle and durability; the exchange only
/// asks which queues can currently receive messages and hands messages off.
pub trait DestinationStore {
    /// Queues currently able to receive messages from `exchange`.
    fn active_destinations(&self, exchange: &str) -> BTreeSet<QueueId>;

    /// Hand `message` to `queue`.
    fn deliver(
        &self,
        queue: &QueueId,
        message: &PublishedMessage,
    ) -> std::result::Result<(), DeliveryError>;
}

/// Message as seen by an exchange.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishedMessage {
    /// Routing key from `basic.publish`; headers exchanges ignore it.
    pub routing_key: Option<String>,
    /// Content headers
    pub headers: MessageHeaders,
    /// Content body
    pub body: Bytes,
}

impl PublishedMessage {
    /// Message with the given headers and body
    #[must_use]
    pub fn new(headers: impl Into<MessageHeaders>, body: impl Into<Bytes>) -> Self {
        Self {
            routing_key: None,
            headers: headers.into(),
            body: body.into(),
        }
    }
}

/// Result of publishing one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Queues that accepted the message, in name order
    pub delivered: Vec<QueueId>,
    /// Queues that matched but refused or were unavailable
    pub failed: Vec<DeliveryError>,
}

impl RouteOutcome {
    /// No queue matched.
    #[must_use]
    pub fn is_unroutable(&self) -> bool {
        self.delivered.is_empty() && self.failed.is_empty()
    }
}

/// Matchers for one exchange.
///
/// Writers serialize on the table lock; readers clone the current matcher
/// list and evaluate it without holding the lock.
#[derive(Debug, Default)]
pub struct RoutingTable {
    bindings: RwLock<Vec<Arc<HeadersBinding>>>,
}

impl RoutingTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `matcher`, replacing any binding with the same queue and
    /// binding key. Returns the replaced binding.
    pub fn insert(&self, matcher: HeadersBinding) -> Option<Binding> {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        let key = (matcher.binding().queue(), matcher.binding().binding_key());
        let existing = bindings
            .iter()
            .position(|b| (b.binding().queue(), b.binding().binding_key()) == key);

        let matcher = Arc::new(matcher);
        match existing {
            Some(index) => {
                let previous = std::mem::replace(&mut bindings[index], matcher);
                Some(previous.binding().clone())
            }
            None => {
                bindings.push(matcher);
                None
            }
        }
    }

    /// Remove the binding of `queue` under `binding_key`.
    pub fn remove(&self, queue: &QueueId, binding_key: &str) -> Option<Binding> {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        let index = bindings
            .iter()
            .position(|b| b.binding().queue() == queue && b.binding().binding_key() == binding_key)?;
        Some(bindings.remove(index).binding().clone())
    }

    /// Remove every binding targeting `queue`; returns how many were removed.
    pub fn remove_queue(&self, queue: &QueueId) -> usize {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        let before = bindings.len();
        bindings.retain(|b| b.binding().queue() != queue);
        before - bindings.len()
    }

    /// Current matchers, in bind order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<HeadersBinding>> {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the table has no bindings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exchange that routes on message headers.
#[derive(Debug)]
pub struct HeadersExchange {
    name: String,
    table: RoutingTable,
}

impl HeadersExchange {
    /// Create an exchange with no bindings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: RoutingTable::new(),
        }
    }

    /// Exchange name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `queue` with the given arguments.
    ///
    /// Re-binding the same queue and binding key replaces its arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments carry an invalid `X-match` value;
    /// the table is left unchanged.
    #[instrument(level = "debug", skip(self, arguments), fields(exchange = %self.name))]
    pub fn bind(
        &self,
        queue: QueueId,
        binding_key: &str,
        arguments: Option<FieldTable>,
    ) -> Result<BindingId> {
        let binding = Binding::new(self.name.clone(), queue, binding_key, arguments);
        let id = binding.id();
        let matcher = HeadersBinding::new(binding)?;
        let mode = matcher.mode();

        match self.table.insert(matcher) {
            Some(previous) => debug!(%id, replaced = %previous.id(), %mode, "binding replaced"),
            None => debug!(%id, %mode, "binding added"),
        }
        Ok(id)
    }

    /// Remove the binding of `queue` under `binding_key`.
    #[instrument(level = "debug", skip(self), fields(exchange = %self.name))]
    pub fn unbind(&self, queue: &QueueId, binding_key: &str) -> Option<Binding> {
        let removed = self.table.remove(queue, binding_key);
        if removed.is_none() {
            debug!("no such binding");
        }
        removed
    }

    /// Drop every binding of a deleted queue.
    pub fn unbind_queue(&self, queue: &QueueId) -> usize {
        let removed = self.table.remove_queue(queue);
        debug!(exchange = %self.name, %queue, removed, "queue bindings removed");
        removed
    }

    /// Current bindings, read-only, in bind order.
    #[must_use]
    pub fn list_bindings(&self) -> Vec<Binding> {
        self.table
            .snapshot()
            .iter()
            .map(|matcher| matcher.binding().clone())
            .collect()
    }

    /// Routing table backing this exchange
    #[must_use]
    pub const fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Queues whose bindings match `headers`, de-duplicated and ordered.
    #[must_use]
    pub fn route(&self, headers: &MessageHeaders) -> BTreeSet<QueueId> {
        let matched: BTreeSet<QueueId> = self
            .table
            .snapshot()
            .iter()
            .filter(|matcher| matcher.matches(headers))
            .map(|matcher| matcher.binding().queue().clone())
            .collect();
        trace!(exchange = %self.name, matched = matched.len(), "routed");
        matched
    }

    /// Route `message` and deliver it to every matching active queue.
    ///
    /// Delivery failures are collected per queue; one refusing queue does
    /// not stop delivery to the others.
    #[instrument(level = "debug", skip_all, fields(exchange = %self.name))]
    pub fn publish(&self, message: &PublishedMessage, store: &impl DestinationStore) -> RouteOutcome {
        let started = Instant::now();
        let active = store.active_destinations(&self.name);
        let targets: Vec<QueueId> = self
            .route(&message.headers)
            .into_iter()
            .filter(|queue| active.contains(queue))
            .collect();
        Metrics::record_route(targets.len(), started.elapsed());

        let mut outcome = RouteOutcome::default();
        for queue in targets {
            match store.deliver(&queue, message) {
                Ok(()) => {
                    Metrics::record_delivery(DeliveryResult::Delivered);
                    outcome.delivered.push(queue);
                }
                Err(err) => {
                    Metrics::record_delivery(DeliveryResult::Failed);
                    warn!(error = %err, "delivery failed");
                    outcome.failed.push(err);
                }
            }
        }

        if outcome.is_unroutable() {
            debug!("message unroutable");
        }
        outcome
    }
}
