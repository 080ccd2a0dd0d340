//! Gateway: HTTP surface over the session lifecycle manager.
//!
//! Thin by design — routes translate requests into manager calls and
//! status-store reads; all lifecycle logic lives in `waygate-sessions`.

pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_gateway_app, build_manager, start_gateway};
