use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::lenient;

/// Confidence assumed by the scoring engine when a detector omits it.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;
/// Confidence assumed when merging raw detector output into a report.
pub const DETECTOR_DEFAULT_CONFIDENCE: f64 = 0.5;

const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_POLICY_REFERENCE: &str = "POLICY";
const DEFAULT_EXPLANATION: &str = "No explanation provided.";
const DEFAULT_SUGGESTED_FIX: &str = "Provide a safer alternative.";

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Case-insensitive parse; anything unrecognized is `Info`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }

    fn from_json(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_str)
            .map(Severity::parse)
            .unwrap_or(Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Percentage-based rectangle flagged by image analysis. Numeric coordinates
/// are kept as their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRegion {
    #[serde(deserialize_with = "lenient::string")]
    pub x: String,
    #[serde(deserialize_with = "lenient::string")]
    pub y: String,
    #[serde(deserialize_with = "lenient::string")]
    pub width: String,
    #[serde(deserialize_with = "lenient::string")]
    pub height: String,
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
}

/// Violation exactly as a detector reported it. Every field may be missing or
/// of the wrong JSON type; `Violation::from_raw` sorts that out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawViolation {
    pub id: Option<Value>,
    pub severity: Option<Value>,
    pub category: Option<Value>,
    pub offending_text: Option<Value>,
    pub offending_image_region: Option<Value>,
    pub policy_reference: Option<Value>,
    pub explanation: Option<Value>,
    pub suggested_fix: Option<Value>,
    pub confidence: Option<Value>,
}

/// Fully populated violation record consumed by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub severity: Severity,
    pub category: String,
    pub offending_text: Option<String>,
    pub offending_image_region: Option<ImageRegion>,
    pub policy_reference: String,
    pub explanation: String,
    pub suggested_fix: String,
    pub confidence: f64,
}

impl Violation {
    /// Minimal record with descriptive fields defaulted and full confidence.
    pub fn new(severity: Severity, category: impl Into<String>) -> Self {
        Self::from_raw(
            RawViolation {
                category: Some(Value::String(category.into())),
                ..RawViolation::default()
            },
            0,
            DEFAULT_CONFIDENCE,
        )
        .with_severity(severity)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = coerce_confidence(Some(confidence), DEFAULT_CONFIDENCE);
        self
    }

    pub fn with_offending_text(mut self, text: impl Into<String>) -> Self {
        self.offending_text = non_empty(Some(text.into()));
        self
    }

    /// Total normalization: never fails, only defaults. `index` seeds the id
    /// when the detector did not provide one.
    pub fn from_raw(raw: RawViolation, index: usize, default_confidence: f64) -> Self {
        let confidence = coerce_confidence(
            raw.confidence.as_ref().and_then(Value::as_f64),
            default_confidence,
        );

        Violation {
            id: text_field(raw.id.as_ref()).unwrap_or_else(|| format!("V-{index}")),
            severity: Severity::from_json(raw.severity.as_ref()),
            category: text_field(raw.category.as_ref())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            offending_text: text_field(raw.offending_text.as_ref()),
            offending_image_region: raw.offending_image_region.and_then(lenient::parse_object),
            policy_reference: text_field(raw.policy_reference.as_ref())
                .unwrap_or_else(|| DEFAULT_POLICY_REFERENCE.to_string()),
            explanation: text_field(raw.explanation.as_ref())
                .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
            suggested_fix: text_field(raw.suggested_fix.as_ref())
                .unwrap_or_else(|| DEFAULT_SUGGESTED_FIX.to_string()),
            confidence,
        }
    }
}

fn coerce_confidence(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => default.clamp(0.0, 1.0),
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    non_empty(value.and_then(lenient::text))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
