//! Wire types for the Firefox remote debugging protocol.
//!
//! This crate contains the serde-serializable shapes exchanged with the
//! debugger server, one JSON object per transport frame. Only the subset
//! needed to track the tab list, navigation state, and favicons is modelled.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization
//! - **Forward compatible**: Unknown fields are ignored on decode
//! - **Direction-aware**: Outbound messages set `to`, inbound carry `from`
//!
//! Routing and actor state live in `foxrdp-runtime` and `foxrdp`.

pub mod favicon;
pub mod message;

pub use message::*;
