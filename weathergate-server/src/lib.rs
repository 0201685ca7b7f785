//! Server library crate for `weathergate`.
//!
//! Exposes the HTTP surface, application wiring, and server configuration
//! for use by the binary and the integration tests.

pub mod api;
pub mod app;
pub mod config;
