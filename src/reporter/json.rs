use serde::Serialize;

use crate::engine::{CheckOutcome, SkippedRequest};
use crate::report::ComplianceReport;

use super::Reporter;

pub struct JsonReporter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    version: &'static str,
    summary: SummaryJson,
    results: Vec<ResultJson<'a>>,
    skipped: Vec<SkippedJson<'a>>,
}

#[derive(Serialize)]
struct SummaryJson {
    checked: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
}

#[derive(Serialize)]
struct ResultJson<'a> {
    source: &'a str,
    report: &'a ComplianceReport,
}

#[derive(Serialize)]
struct SkippedJson<'a> {
    source: &'a str,
    reason: &'a str,
}

impl Reporter for JsonReporter {
    fn format(
        &self,
        outcomes: &[CheckOutcome],
        skipped: &[SkippedRequest],
        _verbose: bool,
    ) -> String {
        let passed = outcomes.iter().filter(|o| o.report.passed()).count();
        let output = JsonOutput {
            version: env!("CARGO_PKG_VERSION"),
            summary: SummaryJson {
                checked: outcomes.len(),
                passed,
                failed: outcomes.len() - passed,
                skipped: skipped.len(),
            },
            results: outcomes
                .iter()
                .map(|o| ResultJson {
                    source: &o.source,
                    report: &o.report,
                })
                .collect(),
            skipped: skipped
                .iter()
                .map(|s| SkippedJson {
                    source: &s.source,
                    reason: &s.reason,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
