//! Event hub for live game notifications.
//!
//! This module implements:
//! - A registry of per-subscriber bounded queues keyed by an opaque id
//! - Non-blocking fan-out of short event tags to every live queue
//! - Release/acquire cycles that always start from an empty queue
//!
//! ## Delivery policy
//!
//! Every queue holds at most `capacity` undelivered messages. When a queue is
//! full, the newest message is dropped for that subscriber only and a warning
//! is logged. Senders are never blocked.
//!
//! ## Example
//!
//! ```
//! use liars_dice::events::EventHub;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), liars_dice::HubError> {
//! let hub = EventHub::new(16);
//! let subscription = hub.acquire("relay-1").await?;
//!
//! hub.send("start").await;
//! assert_eq!(subscription.recv().await.as_deref(), Some("start"));
//!
//! hub.release("relay-1").await;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod hub;

pub use errors::{HubError, HubResult};
pub use hub::{DEFAULT_SUBSCRIBER_CAPACITY, EventHub, Subscription};
