//! Fire-and-forget user change notifications.
//!
//! ```text
//! ┌──────────────┐ notify(id) ┌───────────────┐ recv ┌──────────────┐ publish ┌──────────────────┐
//! │ UserService  │───────────▶│ unbounded mpsc │─────▶│ single worker│────────▶│ JetStream stream │
//! │ (many tasks) │  never     └───────────────┘      └──────────────┘  id as  │ (durable fan-out)│
//! └──────────────┘  blocks                             failures logged  text   └──────────────────┘
//! ```
//!
//! Producers only ever enqueue. One worker owns the broker connection and
//! publishes in enqueue order. A failed publish is logged and dropped; there
//! is no retry, outbox or replay. If the broker cannot be reached at startup
//! the publisher stays disconnected for the lifetime of the process and
//! notifications are discarded.

mod broker;
mod config;
mod error;
mod nats;
mod publisher;

pub use broker::Broker;
pub use config::NatsConfig;
pub use error::MessagingError;
pub use nats::NatsBroker;
pub use publisher::{ChangeNotifier, ChangePublisher};
