//! HTTP handlers for the FarmSense API.
//!
//! Each submodule owns one resource: its request/response types, the
//! endpoint functions, and the OpenAPI annotations. Handlers stay thin;
//! domain logic lives in `farmsense_core` and comes in through the
//! repository traits on [`crate::state::AppState`].

pub mod alerts;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod records;
