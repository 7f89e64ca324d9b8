//! Axum adapters over the core session and validation logic.
//!
//! The decision-making lives in `farmsense_core::middleware`; these functions
//! translate between HTTP (headers, status codes, extensions) and that layer.

pub mod auth;
pub mod request_id;
pub mod validation;

pub use auth::{extract_session_token, require_session};
pub use request_id::create_request_id_layers;
pub use validation::require_json_body;
