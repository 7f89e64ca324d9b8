//! Health record data contracts.
//!
//! A [`HealthRecord`] is one observation of a monitored subject: a person, an
//! animal, or a measurement site. The measured values live in a
//! [`RecordMetrics`] variant whose shape is fixed by the record type, so a
//! record can never carry another type's keys. Unknown keys are rejected when
//! the payload is decoded, not silently passed through.
//!
//! Rows store the discriminant (`record_type` column) and the payload
//! (`metrics` JSON column) separately; [`RecordMetrics::from_parts`] is the
//! single place the two are rejoined and the only place an unrecognized
//! record type can surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Subject domain of a health observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Human,
    Animal,
    Environment,
}

impl RecordType {
    /// Returns the canonical string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Animal => "animal",
            Self::Environment => "environment",
        }
    }

    /// Parses the storage form. Returns `None` for unrecognized values;
    /// callers surface that as an invalid-record-type condition.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "human" => Some(Self::Human),
            "animal" => Some(Self::Animal),
            "environment" => Some(Self::Environment),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Submitter-asserted overall condition at record-creation time.
///
/// Distinct from alert severity: status is what the person filing the record
/// claims, severity is what the alerting layer assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Normal,
    Warning,
    Critical,
}

impl RecordStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Self::Normal),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Species of a monitored animal. Determines the normal temperature range
/// the alerting rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnimalSpecies {
    Bovine,
    Porcine,
    Ovine,
    Caprine,
    Poultry,
    Dog,
    Cat,
    Other,
}

impl AnimalSpecies {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bovine => "bovine",
            Self::Porcine => "porcine",
            Self::Ovine => "ovine",
            Self::Caprine => "caprine",
            Self::Poultry => "poultry",
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for AnimalSpecies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observed appetite of an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Appetite {
    Normal,
    Reduced,
    Absent,
    Increased,
}

/// Observed behavior of an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    Normal,
    Agitated,
    Lethargic,
    Aggressive,
}

/// Graded air quality reading at a measurement site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AirQuality {
    Excellent,
    Good,
    Moderate,
    Poor,
    Dangerous,
}

impl AirQuality {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::Poor => "poor",
            Self::Dangerous => "dangerous",
        }
    }
}

/// Graded water quality reading at a measurement site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WaterQuality {
    Excellent,
    Good,
    Moderate,
    Poor,
    Contaminated,
}

impl WaterQuality {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::Poor => "poor",
            Self::Contaminated => "contaminated",
        }
    }
}

/// Measured values for a human health record. All fields optional; an absent
/// field means "not measured", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct HumanMetrics {
    /// Body temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Blood pressure as an opaque "systolic/diastolic" string.
    pub blood_pressure: Option<String>,
    /// Heart rate in beats per minute.
    pub heart_rate: Option<i64>,
    /// Free-text symptom description.
    pub symptoms: Option<String>,
}

/// Measured values for an animal health record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct AnimalMetrics {
    pub animal_type: Option<AnimalSpecies>,
    /// Free-text age description ("3 years", "8 months").
    pub age: Option<String>,
    /// Body weight in kilograms.
    pub weight: Option<f64>,
    /// Body temperature in degrees Celsius.
    pub temperature: Option<f64>,
    pub appetite: Option<Appetite>,
    pub behavior: Option<Behavior>,
    pub symptoms: Option<String>,
}

/// Measured values for an environment record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct EnvironmentMetrics {
    /// Where the measurement was taken.
    pub location: Option<String>,
    pub air_quality: Option<AirQuality>,
    /// Ambient temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// Soil pH value.
    pub soil_ph: Option<f64>,
    pub water_quality: Option<WaterQuality>,
    /// Noise level in decibels.
    pub noise_level: Option<f64>,
    /// Free-text list of detected pollutants.
    pub pollutants: Option<String>,
}

/// The typed metrics bag of a health record. The variant is the record type;
/// the two can never disagree.
///
/// Serializes as two adjacent keys, `recordType` and `metrics`, which
/// [`HealthRecord`] flattens into its own object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "recordType", content = "metrics", rename_all = "lowercase")]
pub enum RecordMetrics {
    Human(HumanMetrics),
    Animal(AnimalMetrics),
    Environment(EnvironmentMetrics),
}

/// Error raised where untyped record data enters the system.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The discriminant is not one of the three known record types. Never
    /// coerced; the writer that produced it is defective.
    #[error("invalid record type: {0}")]
    InvalidRecordType(String),

    /// The metrics payload does not match the record type's schema
    /// (unknown key, wrong value shape).
    #[error("invalid metrics payload: {0}")]
    InvalidMetrics(String),
}

impl RecordMetrics {
    /// Rejoins a stored `record_type` discriminant with its JSON payload.
    ///
    /// A missing payload (`None` or SQL NULL) decodes as an empty metrics
    /// bag: every check downstream becomes a no-op, which is the required
    /// "no metrics present" behavior, not an error.
    ///
    /// # Errors
    ///
    /// [`RecordError::InvalidRecordType`] for an unknown discriminant,
    /// [`RecordError::InvalidMetrics`] when the payload has unknown keys or
    /// malformed values for the given type.
    pub fn from_parts(record_type: &str, metrics_json: Option<&str>) -> Result<Self, RecordError> {
        let record_type = RecordType::from_str(record_type)
            .ok_or_else(|| RecordError::InvalidRecordType(record_type.to_string()))?;

        let payload = metrics_json.unwrap_or("{}");
        let invalid = |e: serde_json::Error| RecordError::InvalidMetrics(e.to_string());

        match record_type {
            RecordType::Human => serde_json::from_str(payload).map(Self::Human).map_err(invalid),
            RecordType::Animal => serde_json::from_str(payload).map(Self::Animal).map_err(invalid),
            RecordType::Environment => {
                serde_json::from_str(payload).map(Self::Environment).map_err(invalid)
            }
        }
    }

    /// The record type this payload belongs to.
    #[must_use]
    pub const fn record_type(&self) -> RecordType {
        match self {
            Self::Human(_) => RecordType::Human,
            Self::Animal(_) => RecordType::Animal,
            Self::Environment(_) => RecordType::Environment,
        }
    }

    /// Serializes just the payload, without the discriminant, for the
    /// `metrics` storage column.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidMetrics`] if serialization fails, which
    /// only happens for non-finite floats.
    pub fn payload_json(&self) -> Result<String, RecordError> {
        let result = match self {
            Self::Human(m) => serde_json::to_string(m),
            Self::Animal(m) => serde_json::to_string(m),
            Self::Environment(m) => serde_json::to_string(m),
        };
        result.map_err(|e| RecordError::InvalidMetrics(e.to_string()))
    }

    /// Converts empty text fields to `None`, mirroring form submissions
    /// where an untouched input arrives as an empty string.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }

        match self {
            Self::Human(m) => Self::Human(HumanMetrics {
                blood_pressure: clean(m.blood_pressure),
                symptoms: clean(m.symptoms),
                ..m
            }),
            Self::Animal(m) => Self::Animal(AnimalMetrics {
                age: clean(m.age),
                symptoms: clean(m.symptoms),
                ..m
            }),
            Self::Environment(m) => Self::Environment(EnvironmentMetrics {
                location: clean(m.location),
                pollutants: clean(m.pollutants),
                ..m
            }),
        }
    }
}

/// One persisted health observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    /// Opaque unique identifier, assigned by the store on creation.
    pub id: String,
    /// Owning identity. Every record belongs to exactly one user.
    pub user_id: String,
    /// Free-text label for the monitored subject.
    pub subject_name: String,
    /// Typed metrics bag; contributes the `recordType` and `metrics` keys.
    #[serde(flatten)]
    pub metrics: RecordMetrics,
    pub status: RecordStatus,
    pub notes: Option<String>,
    /// Immutable creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl HealthRecord {
    /// The record type, derived from the metrics variant.
    #[must_use]
    pub const fn record_type(&self) -> RecordType {
        self.metrics.record_type()
    }
}

/// A record as submitted, before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHealthRecord {
    pub user_id: String,
    pub subject_name: String,
    pub metrics: RecordMetrics,
    pub status: RecordStatus,
    pub notes: Option<String>,
}

impl NewHealthRecord {
    /// Applies the empty-string-to-null normalization to metrics and notes.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            metrics: self.metrics.normalized(),
            notes: self.notes.filter(|s| !s.trim().is_empty()),
            ..self
        }
    }
}
