//! Session lifecycle management.
//!
//! The heart of the gateway: a concurrent registry of long-lived protocol
//! client sessions, one per tenant. All registry mutations for a tenant run
//! inside that tenant's critical section, so "check handle, then create" is
//! atomic and resets cannot tear an in-flight initialization. Lifecycle
//! events are projected into the status store with stale-handle
//! suppression: once a handle is superseded, its late events are discarded.

pub mod credentials;
pub mod manager;
mod projection;
mod registry;

pub use {
    credentials::CredentialCache,
    manager::{SessionHandle, SessionManager, SessionTimeouts},
};
