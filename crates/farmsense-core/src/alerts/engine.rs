//! Pure alert derivation from health records.
//!
//! Every alerting decision lives here: the status rule, the per-domain metric
//! thresholds, and the submission notice written alongside every new record.
//! All functions are synchronous and side-effect free, so the same record
//! always yields the same drafts in the same order.
//!
//! Rule order is part of the contract: the status-derived alert (if any)
//! comes first, then metric rules in the fixed order they are listed per
//! record type. Missing metric fields never fire a rule and never fail;
//! numeric thresholds compare strictly, so a value sitting exactly on a
//! boundary does not trigger.

use serde::{Deserialize, Serialize};

use super::types::{AlertCategory, AlertDraft, AlertSeverity};
use crate::records::{
    AirQuality, AnimalMetrics, AnimalSpecies, Appetite, EnvironmentMetrics, HealthRecord,
    HumanMetrics, RecordMetrics, RecordStatus, RecordType, WaterQuality,
};

/// Human body temperature above this fires the fever rule (°C).
const HUMAN_TEMPERATURE_MAX: f64 = 38.5;
/// Normal resting heart rate band, exclusive on both ends (bpm).
const HUMAN_HEART_RATE_MIN: i64 = 60;
const HUMAN_HEART_RATE_MAX: i64 = 100;

/// Animal temperature beyond these marks escalates to critical (°C).
const ANIMAL_TEMPERATURE_CRITICAL_HIGH: f64 = 40.5;
const ANIMAL_TEMPERATURE_CRITICAL_LOW: f64 = 37.0;

/// Agronomically acceptable soil pH band, exclusive on both ends.
const SOIL_PH_MIN: f64 = 5.5;
const SOIL_PH_MAX: f64 = 8.5;

/// How record submission feeds the alert store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Write only the submission notice whose severity mirrors the submitted
    /// status. Metric thresholds are not consulted.
    Notify,
    /// Write the submission notice plus every metric-derived alert for the
    /// record.
    #[default]
    NotifyAndDerive,
}

/// Derives the full ordered alert sequence for one record.
///
/// Order: the status-derived alert first (absent for `normal` status), then
/// metric-derived alerts in the fixed per-type rule order. Calling this twice
/// on the same record yields identical output.
#[must_use]
pub fn derive_alerts(record: &HealthRecord) -> Vec<AlertDraft> {
    let mut drafts = Vec::new();
    if let Some(alert) = status_alert(record) {
        drafts.push(alert);
    }
    drafts.extend(metric_alerts(record));
    drafts
}

/// The notice written alongside every record submission.
///
/// Severity mirrors the submitted status (`normal` is still worth a medium
/// notice: a record was filed). This is the only place that mapping exists.
#[must_use]
pub fn submission_alert(record: &HealthRecord) -> AlertDraft {
    let severity = match record.status {
        RecordStatus::Normal => AlertSeverity::Medium,
        RecordStatus::Warning => AlertSeverity::High,
        RecordStatus::Critical => AlertSeverity::Critical,
    };
    AlertDraft::new(
        format!("New record: {}", record.subject_name),
        format!(
            "A new {} record for {} was submitted with status {}.",
            record.record_type(),
            record.subject_name,
            record.status
        ),
        severity,
        domain_category(record.record_type()),
    )
}

/// Everything the write path should persist for a freshly submitted record.
///
/// Under [`WritePolicy::Notify`] only the submission notice is produced.
/// Under [`WritePolicy::NotifyAndDerive`] the metric-derived alerts follow
/// it; the status-derived alert is left out because the submission notice
/// already carries the status severity, and two alerts for the same fact
/// would double-page the user.
#[must_use]
pub fn alerts_for_submission(record: &HealthRecord, policy: WritePolicy) -> Vec<AlertDraft> {
    let mut drafts = vec![submission_alert(record)];
    if policy == WritePolicy::NotifyAndDerive {
        drafts.extend(metric_alerts(record));
    }
    drafts
}

fn status_alert(record: &HealthRecord) -> Option<AlertDraft> {
    let subject = &record.subject_name;
    let category = domain_category(record.record_type());

    match record.status {
        RecordStatus::Critical => Some(AlertDraft::new(
            format!("Critical state detected - {subject}"),
            format!("{subject} was reported in critical condition. Immediate intervention is required."),
            AlertSeverity::Critical,
            category,
        )),
        RecordStatus::Warning => Some(AlertDraft::new(
            format!("Attention required - {subject}"),
            format!("{subject} was reported with warning signs and should be monitored closely."),
            AlertSeverity::High,
            category,
        )),
        RecordStatus::Normal => None,
    }
}

fn metric_alerts(record: &HealthRecord) -> Vec<AlertDraft> {
    match &record.metrics {
        RecordMetrics::Human(m) => human_alerts(&record.subject_name, m),
        RecordMetrics::Animal(m) => animal_alerts(&record.subject_name, m),
        RecordMetrics::Environment(m) => environment_alerts(&record.subject_name, m),
    }
}

/// Human rules, in order: temperature, heart rate.
fn human_alerts(subject: &str, metrics: &HumanMetrics) -> Vec<AlertDraft> {
    let mut drafts = Vec::new();

    if let Some(temperature) = metrics.temperature {
        if temperature > HUMAN_TEMPERATURE_MAX {
            drafts.push(AlertDraft::new(
                format!("Fever detected - {subject}"),
                format!(
                    "Temperature {temperature:.1} °C is above the normal maximum of \
                     {HUMAN_TEMPERATURE_MAX} °C."
                ),
                AlertSeverity::Medium,
                AlertCategory::Human,
            ));
        }
    }

    if let Some(heart_rate) = metrics.heart_rate {
        if heart_rate > HUMAN_HEART_RATE_MAX || heart_rate < HUMAN_HEART_RATE_MIN {
            drafts.push(AlertDraft::new(
                format!("Abnormal pulse - {subject}"),
                format!(
                    "Heart rate {heart_rate} bpm is outside the normal range of \
                     {HUMAN_HEART_RATE_MIN}-{HUMAN_HEART_RATE_MAX} bpm."
                ),
                AlertSeverity::Medium,
                AlertCategory::Human,
            ));
        }
    }

    drafts
}

/// Animal rules, in order: temperature, appetite.
fn animal_alerts(subject: &str, metrics: &AnimalMetrics) -> Vec<AlertDraft> {
    let mut drafts = Vec::new();

    if let Some(temperature) = metrics.temperature {
        let (low, high) = species_temperature_range(metrics.animal_type);
        if temperature > high || temperature < low {
            let severity = if temperature > ANIMAL_TEMPERATURE_CRITICAL_HIGH
                || temperature < ANIMAL_TEMPERATURE_CRITICAL_LOW
            {
                AlertSeverity::Critical
            } else {
                AlertSeverity::High
            };
            let message = match metrics.animal_type {
                Some(species) => format!(
                    "Temperature {temperature:.1} °C is outside the normal {species} range of \
                     {low:.1}-{high:.1} °C."
                ),
                None => format!(
                    "Temperature {temperature:.1} °C is outside the normal range of \
                     {low:.1}-{high:.1} °C."
                ),
            };
            drafts.push(AlertDraft::new(
                format!("Abnormal temperature - {subject}"),
                message,
                severity,
                AlertCategory::Animal,
            ));
        }
    }

    if metrics.appetite == Some(Appetite::Absent) {
        drafts.push(AlertDraft::new(
            format!("No appetite - {subject}"),
            format!("{subject} is refusing feed. Loss of appetite needs prompt attention."),
            AlertSeverity::High,
            AlertCategory::Animal,
        ));
    }

    drafts
}

/// Environment rules, in order: air quality, water quality, soil pH.
fn environment_alerts(subject: &str, metrics: &EnvironmentMetrics) -> Vec<AlertDraft> {
    let mut drafts = Vec::new();

    if let Some(air) = metrics.air_quality {
        let severity = match air {
            AirQuality::Dangerous => Some(AlertSeverity::Critical),
            AirQuality::Poor => Some(AlertSeverity::High),
            AirQuality::Excellent | AirQuality::Good | AirQuality::Moderate => None,
        };
        if let Some(severity) = severity {
            drafts.push(AlertDraft::new(
                format!("Air quality alert - {subject}"),
                format!("Air quality at {subject} was graded {}.", air.as_str()),
                severity,
                AlertCategory::Environment,
            ));
        }
    }

    if let Some(water) = metrics.water_quality {
        let severity = match water {
            WaterQuality::Contaminated => Some(AlertSeverity::Critical),
            WaterQuality::Poor => Some(AlertSeverity::High),
            WaterQuality::Excellent | WaterQuality::Good | WaterQuality::Moderate => None,
        };
        if let Some(severity) = severity {
            drafts.push(AlertDraft::new(
                format!("Water quality alert - {subject}"),
                format!("Water quality at {subject} was graded {}.", water.as_str()),
                severity,
                AlertCategory::Environment,
            ));
        }
    }

    if let Some(soil_ph) = metrics.soil_ph {
        if soil_ph < SOIL_PH_MIN || soil_ph > SOIL_PH_MAX {
            drafts.push(AlertDraft::new(
                format!("Soil pH out of range - {subject}"),
                format!(
                    "Soil pH {soil_ph:.1} is outside the agronomic range of \
                     {SOIL_PH_MIN}-{SOIL_PH_MAX}."
                ),
                AlertSeverity::Medium,
                AlertCategory::Environment,
            ));
        }
    }

    drafts
}

/// Normal body temperature band per species (°C). Species without a
/// dedicated band, and records that do not name one, use the widest band.
const fn species_temperature_range(species: Option<AnimalSpecies>) -> (f64, f64) {
    match species {
        Some(AnimalSpecies::Bovine) => (38.0, 39.5),
        Some(AnimalSpecies::Porcine) => (38.7, 39.8),
        Some(AnimalSpecies::Ovine) => (38.5, 40.0),
        _ => (38.0, 40.0),
    }
}

const fn domain_category(record_type: RecordType) -> AlertCategory {
    match record_type {
        RecordType::Human => AlertCategory::Human,
        RecordType::Animal => AlertCategory::Animal,
        RecordType::Environment => AlertCategory::Environment,
    }
}
