//! Protocol-client capability surface.
//!
//! The actual chat-protocol implementation is an external collaborator; the
//! session core consumes it only through the traits here: construct a client
//! bound to one tenant, drive `initialize`, receive lifecycle events in
//! emission order, send messages, destroy. The `dev` backend simulates the
//! pairing flow for local runs; real backends live outside this workspace.

pub mod client;
pub mod dev;
pub mod pairing;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{ClientEvent, ClientFactory, ClientSession, ProtocolClient};
