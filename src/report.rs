use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::policy::{PolicyTables, DEFAULT_PLATFORM_KEY};
use crate::policy_db::{PolicyContext, PolicyDb};
use crate::scoring::{compute_score, ScoreMeta, Status};
use crate::violation::{
    ImageRegion, RawViolation, Severity, Violation, DETECTOR_DEFAULT_CONFIDENCE,
};

/// One compliance check: the copy, where it will run, and what the detectors found.
/// Mistyped fields fall back to their defaults; a missing or blank platform is
/// `default`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckRequest {
    #[serde(deserialize_with = "lenient::string")]
    pub copy: String,
    #[serde(deserialize_with = "platform_or_default")]
    pub platform: String,
    #[serde(deserialize_with = "lenient::string")]
    pub product_category: String,
    #[serde(deserialize_with = "lenient::list")]
    pub text_violations: Vec<RawViolation>,
    #[serde(deserialize_with = "lenient::object")]
    pub image: Option<ImageFindings>,
}

impl Default for CheckRequest {
    fn default() -> Self {
        Self {
            copy: String::new(),
            platform: DEFAULT_PLATFORM_KEY.to_string(),
            product_category: String::new(),
            text_violations: Vec::new(),
            image: None,
        }
    }
}

fn platform_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let platform = lenient::string(deserializer)?;
    Ok(if platform.trim().is_empty() {
        DEFAULT_PLATFORM_KEY.to_string()
    } else {
        platform
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageFindings {
    #[serde(deserialize_with = "lenient::string")]
    pub ocr_text: String,
    #[serde(deserialize_with = "lenient::number")]
    pub nudity_score: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub nudity_label: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub before_after_detected: bool,
    #[serde(deserialize_with = "lenient::list")]
    pub annotated_regions: Vec<ImageRegion>,
    #[serde(deserialize_with = "lenient::list")]
    pub violations: Vec<RawViolation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationSource {
    Text,
    Image,
}

impl ViolationSource {
    pub fn of(violation: &Violation) -> Self {
        let category = violation.category.to_lowercase();
        if violation.offending_image_region.is_some() || category.contains("image") {
            ViolationSource::Image
        } else {
            ViolationSource::Text
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeveritySummary {
    pub fn count(violations: &[Violation]) -> Self {
        violations
            .iter()
            .fold(SeveritySummary::default(), |mut acc, v| {
                match v.severity {
                    Severity::Critical => acc.critical += 1,
                    Severity::Warning => acc.warning += 1,
                    Severity::Info => acc.info += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub platform: String,
    pub product_category: String,
    pub scoring: ScoreMeta,
    pub image_analyzed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub compliance_score: u32,
    pub status: Status,
    pub copy: String,
    pub violations: Vec<Violation>,
    pub image_annotations: Vec<ImageRegion>,
    pub summary: SeveritySummary,
    pub meta: ReportMeta,
}

impl ComplianceReport {
    pub fn passed(&self) -> bool {
        self.status == Status::Pass
    }

    pub fn violations_from(&self, source: ViolationSource) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |v| ViolationSource::of(v) == source)
    }
}

/// Text findings first, then image findings; ids default to their merged position.
pub fn merge_violations(
    text: &[RawViolation],
    image: Option<&ImageFindings>,
) -> Vec<Violation> {
    let image_violations = image.map(|i| i.violations.as_slice()).unwrap_or(&[]);
    text.iter()
        .chain(image_violations)
        .enumerate()
        .map(|(idx, raw)| Violation::from_raw(raw.clone(), idx, DETECTOR_DEFAULT_CONFIDENCE))
        .collect()
}

pub fn assemble(
    request: &CheckRequest,
    tables: &PolicyTables,
    policy_db: Option<&PolicyDb>,
) -> ComplianceReport {
    let mut violations = merge_violations(&request.text_violations, request.image.as_ref());
    if let Some(db) = policy_db {
        db.reclassify(&mut violations, &request.platform);
    }

    let result = compute_score(
        &violations,
        &request.platform,
        &request.product_category,
        tables,
    );

    ComplianceReport {
        compliance_score: result.score,
        status: result.status,
        copy: request.copy.clone(),
        summary: SeveritySummary::count(&violations),
        image_annotations: request
            .image
            .as_ref()
            .map(|i| i.annotated_regions.clone())
            .unwrap_or_default(),
        violations,
        meta: ReportMeta {
            platform: request.platform.clone(),
            product_category: request.product_category.clone(),
            scoring: result.meta,
            image_analyzed: request.image.is_some(),
            policy: policy_db.map(|db| db.context(&request.platform, &request.product_category)),
        },
    }
}
