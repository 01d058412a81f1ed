//! Bindings between an exchange and its queues

use std::fmt;

use uuid::Uuid;

use crate::protocol::FieldTable;

/// Queue name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueId(String);

impl QueueId {
    /// Create a queue identifier
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Queue name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueueId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QueueId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Unique binding identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingId(Uuid);

impl BindingId {
    /// Generate a new random binding ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Association of an exchange, a queue, a binding key and its arguments.
///
/// The argument table is captured when the binding is created; later changes
/// to the caller's table do not reach it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binding {
    id: BindingId,
    exchange: String,
    queue: QueueId,
    binding_key: String,
    arguments: FieldTable,
}

impl Binding {
    /// Create a binding; absent arguments are stored as an empty table.
    #[must_use]
    pub fn new(
        exchange: impl Into<String>,
        queue: impl Into<QueueId>,
        binding_key: impl Into<String>,
        arguments: Option<FieldTable>,
    ) -> Self {
        Self {
            id: BindingId::new(),
            exchange: exchange.into(),
            queue: queue.into(),
            binding_key: binding_key.into(),
            arguments: arguments.unwrap_or_default(),
        }
    }

    /// Binding identifier
    #[must_use]
    pub const fn id(&self) -> BindingId {
        self.id
    }

    /// Exchange name
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Destination queue
    #[must_use]
    pub const fn queue(&self) -> &QueueId {
        &self.queue
    }

    /// Binding key
    #[must_use]
    pub fn binding_key(&self) -> &str {
        &self.binding_key
    }

    /// Arguments captured at bind time
    #[must_use]
    pub const fn arguments(&self) -> &FieldTable {
        &self.arguments
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Binding[{} -> {} key={:?} args={}]",
            self.exchange, self.queue, self.binding_key, self.arguments
        )
    }
}
