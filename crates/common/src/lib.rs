//! Shared types and the error taxonomy used across waygate crates.

pub mod error;
pub mod types;

pub use {
    error::GatewayError,
    types::{SessionState, StatusSnapshot},
};
