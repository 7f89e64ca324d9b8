//! Alert derivation and data contracts.
//!
//! This module owns everything alert-shaped: the severity and category
//! vocabulary, the persisted [`Alert`] row, and the pure rule engine that
//! turns a health record into alert drafts.
//!
//! ## Components
//!
//! - **[`types`]**: Severity/category enums, [`AlertDraft`], [`Alert`], and
//!   the list filter.
//! - **[`engine`]**: The deterministic rules. [`derive_alerts`] for the full
//!   sequence, [`submission_alert`] for the per-submission notice,
//!   [`alerts_for_submission`] for what the write path persists under a
//!   given [`WritePolicy`].
//!
//! ## Usage
//!
//! ```
//! use farmsense_core::alerts::{alerts_for_submission, WritePolicy};
//! use farmsense_core::records::{AnimalMetrics, AnimalSpecies, HealthRecord, RecordMetrics, RecordStatus};
//!
//! let record = HealthRecord {
//!     id: "rec-1".to_string(),
//!     user_id: "user-1".to_string(),
//!     subject_name: "Bella".to_string(),
//!     metrics: RecordMetrics::Animal(AnimalMetrics {
//!         animal_type: Some(AnimalSpecies::Bovine),
//!         temperature: Some(40.1),
//!         ..AnimalMetrics::default()
//!     }),
//!     status: RecordStatus::Warning,
//!     notes: None,
//!     created_at: chrono::Utc::now(),
//! };
//!
//! let drafts = alerts_for_submission(&record, WritePolicy::NotifyAndDerive);
//! assert_eq!(drafts.len(), 2);
//! assert_eq!(drafts[0].title, "New record: Bella");
//! ```

pub mod engine;
pub mod types;

pub use engine::{alerts_for_submission, derive_alerts, submission_alert, WritePolicy};
pub use types::{Alert, AlertCategory, AlertDraft, AlertFilter, AlertSeverity};
