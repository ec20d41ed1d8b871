pub mod cli;
pub mod json;

use crate::engine::{CheckOutcome, SkippedRequest};

pub trait Reporter {
    fn format(
        &self,
        outcomes: &[CheckOutcome],
        skipped: &[SkippedRequest],
        verbose: bool,
    ) -> String;
}

pub fn score_only(outcomes: &[CheckOutcome]) -> String {
    match outcomes {
        [single] => format!("{}\n", single.report.compliance_score),
        _ => outcomes
            .iter()
            .map(|o| format!("{}\t{}\n", o.report.compliance_score, o.source))
            .collect(),
    }
}
