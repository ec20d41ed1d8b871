use std::fmt;

use serde::Serialize;

use crate::policy::{PlatformProfile, PolicyTables};
use crate::violation::{Severity, Violation};

pub const MAX_SCORE: f64 = 100.0;

pub const CRITICAL_BASE_PENALTY: f64 = 50.0;
pub const WARNING_BASE_PENALTY: f64 = 20.0;
pub const INFO_BASE_PENALTY: f64 = 5.0;

/// Extra factor for violations in a category the platform prohibits outright.
pub const PROHIBITED_CATEGORY_MULTIPLIER: f64 = 1.5;

pub const BASE_PASS_THRESHOLD: f64 = 80.0;
/// Threshold points removed per unit of strictness above 1.0.
pub const THRESHOLD_STRICTNESS_STEP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => write!(f, "pass"),
            Status::Fail => write!(f, "fail"),
        }
    }
}

/// Inputs and intermediates behind a score, each reproducible from the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMeta {
    pub platform: String,
    pub platform_strictness: f64,
    pub category_risk: f64,
    pub pass_threshold: i32,
    pub weighted_penalties: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: u32,
    pub status: Status,
    pub meta: ScoreMeta,
}

impl ScoreResult {
    pub fn passed(&self) -> bool {
        self.status == Status::Pass
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PenaltyTotals {
    pub total: f64,
    pub has_critical: bool,
}

pub fn base_penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => CRITICAL_BASE_PENALTY,
        Severity::Warning => WARNING_BASE_PENALTY,
        Severity::Info => INFO_BASE_PENALTY,
    }
}

pub fn weighted_penalty(
    violation: &Violation,
    profile: &PlatformProfile,
    category_risk: f64,
) -> f64 {
    let prohibited = if profile.prohibits(&violation.category) {
        PROHIBITED_CATEGORY_MULTIPLIER
    } else {
        1.0
    };

    base_penalty(violation.severity)
        * violation.confidence
        * profile.severity_multipliers.get(violation.severity)
        * category_risk
        * prohibited
        * profile.strictness
}

pub fn accumulate_penalty(
    violations: &[Violation],
    profile: &PlatformProfile,
    category_risk: f64,
) -> PenaltyTotals {
    violations
        .iter()
        .fold(PenaltyTotals::default(), |totals, violation| PenaltyTotals {
            total: totals.total + weighted_penalty(violation, profile, category_risk),
            has_critical: totals.has_critical || violation.severity == Severity::Critical,
        })
}

/// Stricter platforms get a lower numeric bar here, but their penalties are
/// already scaled up by strictness in `weighted_penalty`.
pub fn pass_threshold(strictness: f64) -> f64 {
    BASE_PASS_THRESHOLD - (strictness - 1.0) * THRESHOLD_STRICTNESS_STEP
}

/// Rounds halves toward positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn compute_score(
    violations: &[Violation],
    platform: &str,
    product_category: &str,
    tables: &PolicyTables,
) -> ScoreResult {
    let profile = tables.resolve_platform_profile(platform);
    let category_risk = tables.resolve_category_risk(product_category);
    score_with_profile(violations, profile, category_risk)
}

pub fn score_with_profile(
    violations: &[Violation],
    profile: &PlatformProfile,
    category_risk: f64,
) -> ScoreResult {
    let totals = accumulate_penalty(violations, profile, category_risk);

    let score_f64 = (MAX_SCORE - totals.total).clamp(0.0, MAX_SCORE);
    let threshold = pass_threshold(profile.strictness);

    let status = if totals.has_critical || score_f64 < threshold {
        Status::Fail
    } else {
        Status::Pass
    };

    ScoreResult {
        score: round_half_up(score_f64) as u32,
        status,
        meta: ScoreMeta {
            platform: profile.display_name.clone(),
            platform_strictness: profile.strictness,
            category_risk,
            pass_threshold: round_half_up(threshold) as i32,
            weighted_penalties: round_half_up(totals.total) as u64,
        },
    }
}
