//! Synchronization channel.
//!
//! - [`messages`]: typed wire commands and events.
//! - [`dispatcher`]: inbound frame → session event.
//! - [`channel`]: WebSocket client connection to the authoritative peer.

pub mod channel;
pub mod dispatcher;
pub mod messages;

pub use channel::{ChannelAdapter, ConnectionState};
pub use dispatcher::dispatch;
pub use messages::{ClientCommand, ServerEvent, WirePos};
