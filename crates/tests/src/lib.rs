//! Integration and end-to-end tests for the FarmSense monitoring server.
//!
//! This crate contains the cross-crate suites:
//!
//! - `auth_flow_tests`: signup, login, the session lifecycle and login lockout
//! - `record_pipeline_tests`: record submission, typed metrics, and the
//!   companion alert write under both write policies
//! - `alert_workflow_tests`: manual alerts, read state, filters and per-user
//!   isolation
//! - `assistant_tests`: canned assistant replies and categorization
//! - `dashboard_tests`: summary assembly over records and alerts
//! - `support`: shared harness (in-memory app, request helpers, store doubles)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```
//!
//! Every test builds the full Axum application over a fresh in-memory
//! database and drives it through `tower::ServiceExt::oneshot`, so the real
//! router, middleware chain and store are exercised. No external services
//! are required.

#![allow(clippy::unwrap_used, clippy::expect_used)]

#[cfg(test)]
mod auth_flow_tests;

#[cfg(test)]
mod record_pipeline_tests;

#[cfg(test)]
mod alert_workflow_tests;

#[cfg(test)]
mod assistant_tests;

#[cfg(test)]
mod dashboard_tests;

/// Shared harness for the suites
pub mod support;
