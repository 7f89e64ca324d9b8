//! HTTP server for the FarmSense farm health monitoring API.
//!
//! The binary in `main.rs` wires configuration, the `SQLite` store, and the
//! session layer together, then serves the router built in [`router`].
//! Handlers live in [`handlers`], grouped by resource; the Axum adapters for
//! session auth and request validation live in [`middleware`].

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;
