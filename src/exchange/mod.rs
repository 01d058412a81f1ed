//! Headers exchange routing
//!
//! Bindings, header matchers and the per-exchange routing table. Matching
//! never fails: a missing or extra header is an ordinary `false` or `true`.

mod binding;
mod error;
mod headers;
mod matcher;
mod routing;

pub use binding::{Binding, BindingId, QueueId};
pub use error::{DeliveryError, Error, Result};
pub use headers::MessageHeaders;
pub use matcher::{HeadersBinding, MatchMode, X_MATCH};
pub use routing::{DestinationStore, HeadersExchange, PublishedMessage, RouteOutcome, RoutingTable};
