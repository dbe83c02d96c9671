//! foxrdp runtime - transport, registry, and dispatch loop
//!
//! This crate provides the protocol-agnostic plumbing for talking to a
//! Firefox debugger server:
//!
//! - **Transport**: `<length>:<json>` framing over any async byte stream
//! - **Relay**: non-blocking "something changed" broadcast to observers
//! - **Registry**: actor id to handler mapping
//! - **Connection**: the single inbound dispatch loop plus the outbound writer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   foxrdp    │  Root and tab actors
//! └──────┬──────┘
//!        │ implements MessageHandler
//! ┌──────▼──────┐
//! │   runtime   │  This crate
//! │  ┌────────┐ │
//! │  │ Conn   │ │  Dispatch loop, outbox
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │ Trans  │ │  Length-prefixed frames
//! │  └────────┘ │
//! └─────────────┘
//! ```
//!
//! The connection is generic over its handler type so that the closed set of
//! actor kinds can live in the crate that implements them.

pub mod connection;
pub mod error;
pub mod relay;
pub mod transport;

pub use connection::{ActorRegistry, Connection, MessageHandler, Outbox};
pub use error::{Error, Result};
pub use relay::{Relay, RelaySubscription};
pub use transport::{FrameReader, FrameWriter, TransportConfig, dial};
