//! Alert data contracts shared by the rule engine, the store, and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How urgent an alert is. Ordered: `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational, no action expected.
    Low,
    /// Worth a look during normal work.
    Medium,
    /// Needs attention soon.
    High,
    /// Needs immediate intervention.
    Critical,
}

impl AlertSeverity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which monitoring domain an alert belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Human,
    Animal,
    Environment,
    /// Alerts not tied to one domain, including manually filed ones.
    General,
}

impl AlertCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Animal => "animal",
            Self::Environment => "environment",
            Self::General => "general",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "human" => Some(Self::Human),
            "animal" => Some(Self::Animal),
            "environment" => Some(Self::Environment),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An alert as produced by the rule engine: content only, no identity.
///
/// The store adds id, owner, and timestamp when the draft is persisted, so
/// deriving alerts from a record stays a pure computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlertDraft {
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub category: AlertCategory,
}

impl AlertDraft {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: AlertSeverity,
        category: AlertCategory,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            category,
        }
    }

    /// Materializes the draft into a persisted alert.
    #[must_use]
    pub fn into_alert(
        self,
        id: impl Into<String>,
        user_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Alert {
        Alert {
            id: id.into(),
            user_id: user_id.into(),
            title: self.title,
            message: self.message,
            severity: self.severity,
            category: self.category,
            is_read: false,
            created_at,
        }
    }
}

/// One persisted alert, owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    /// Starts `false`; flipped once by the mark-read operation.
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Filter and paging options for listing a user's alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertFilter {
    pub severity: Option<AlertSeverity>,
    pub category: Option<AlertCategory>,
    /// When set, only alerts not yet marked read are returned.
    pub unread_only: bool,
    pub limit: i64,
    pub offset: i64,
}

impl AlertFilter {
    /// Default page size when the caller does not ask for one.
    pub const DEFAULT_LIMIT: i64 = 50;
    /// Hard cap on a single page.
    pub const MAX_LIMIT: i64 = 200;
}

impl Default for AlertFilter {
    fn default() -> Self {
        Self {
            severity: None,
            category: None,
            unread_only: false,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
