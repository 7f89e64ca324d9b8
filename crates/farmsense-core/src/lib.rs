//! # FarmSense Core
//!
//! Core library for the FarmSense farm health monitoring service.
//!
//! This crate provides the foundational components for:
//!
//! - **[`records`]**: Typed health observations for humans, animals, and the
//!   environment, with a strict metrics bag per record type.
//!
//! - **[`alerts`]**: The rule engine deriving alerts from record status and
//!   metric thresholds, plus the alert types and severity ordering.
//!
//! - **[`assistant`]**: Keyword-driven chat assistant answering farm health
//!   questions from a fixed rule table.
//!
//! - **[`auth`]**: Account and session management with Argon2id password
//!   hashes and `SQLite`-backed sessions stored as digests.
//!
//! - **[`store`]**: `SQLite` persistence for records and alerts, scoped to
//!   the owning user on every query.
//!
//! - **[`middleware`]**: Session resolution with caching and login rate
//!   limiting.
//!
//! - **[`config`]**: Layered configuration (defaults, TOML file,
//!   environment).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         HTTP Server                          │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌──────────────┐  │
//! │  │   SessionAuth   │  │ LoginRateLimiter│  │  Assistant   │  │
//! │  └────────┬────────┘  └─────────────────┘  └──────────────┘  │
//! │           │                                                  │
//! │  ┌────────▼────────┐  ┌─────────────────┐                    │
//! │  │ IdentityRepo    │  │   AlertEngine   │                    │
//! │  │ (users/sessions)│  │ (derive_alerts) │                    │
//! │  └────────┬────────┘  └────────┬────────┘                    │
//! │           │                    │                             │
//! │  ┌────────▼────────────────────▼────────┐                    │
//! │  │            SqliteStore               │                    │
//! │  │     (records, alerts, counts)        │                    │
//! │  └──────────────────────────────────────┘                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Record Write Flow
//!
//! ```text
//! POST /api/records
//!       │
//!       ▼
//! ┌──────────────┐
//! │ SessionAuth  │ ─── Invalid ──► 401
//! └──────┬───────┘
//!        │ AuthenticatedUser
//!        ▼
//! ┌──────────────┐
//! │ Deserialize  │ ─── Unknown type / key ──► 400
//! │ (records)    │
//! └──────┬───────┘
//!        │ NewHealthRecord
//!        ▼
//! ┌──────────────┐
//! │ Insert record│
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │ alerts_for_submission│ ── WritePolicy decides whether metric
//! │ (engine)             │    rules run alongside the notice
//! └──────┬───────────────┘
//!        │ Vec<AlertDraft>
//!        ▼
//! ┌──────────────┐
//! │ Insert alerts│ ─── Failure ──► logged, record still returned
//! └──────┬───────┘
//!        │
//!        ▼
//!   201-style success body with the stored record
//! ```

pub mod alerts;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod records;
pub mod store;
