use owo_colors::OwoColorize;

use crate::engine::{CheckOutcome, SkippedRequest};
use crate::highlight::{highlight_spans, segments, Segment};
use crate::report::{ComplianceReport, ViolationSource};
use crate::scoring::Status;
use crate::violation::{Severity, Violation};

use super::Reporter;

pub struct CliReporter;

impl Reporter for CliReporter {
    fn format(
        &self,
        outcomes: &[CheckOutcome],
        skipped: &[SkippedRequest],
        verbose: bool,
    ) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "\n  {} v{}\n",
            "ad-preflight".bold(),
            env!("CARGO_PKG_VERSION")
        ));

        for outcome in outcomes {
            format_report(&mut out, &outcome.source, &outcome.report, verbose);
        }

        if !skipped.is_empty() {
            out.push_str(&format!("\n  {}\n", "Not Checked".red().bold()));
            for skip in skipped {
                out.push_str(&format!(
                    "    {} {}\n      {}\n",
                    "SKIP".red().bold(),
                    skip.source,
                    skip.reason.dimmed()
                ));
            }
        }

        if outcomes.len() + skipped.len() > 1 {
            let passed = outcomes.iter().filter(|o| o.report.passed()).count();
            out.push_str(&format!(
                "\n  {} checked, {} passed, {} failed",
                outcomes.len(),
                passed.to_string().green(),
                (outcomes.len() - passed).to_string().red()
            ));
            if !skipped.is_empty() {
                out.push_str(&format!(", {} skipped", skipped.len().to_string().red()));
            }
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

fn format_report(out: &mut String, source: &str, report: &ComplianceReport, verbose: bool) {
    let scoring = &report.meta.scoring;
    out.push_str(&format!("\n  Request: {}\n", source.bold()));
    out.push_str(&format!(
        "  Platform: {}  Category: {} (risk {})\n",
        scoring.platform, display_category(&report.meta.product_category), scoring.category_risk
    ));

    let status = match report.status {
        Status::Pass => "PASS".green().bold().to_string(),
        Status::Fail => "FAIL".red().bold().to_string(),
    };
    let score = if report.passed() {
        report.compliance_score.to_string().green().to_string()
    } else {
        report.compliance_score.to_string().red().to_string()
    };
    out.push_str(&format!(
        "\n  Score: {} / 100  {}  (pass threshold {}, weighted penalty {})\n",
        score, status, scoring.pass_threshold, scoring.weighted_penalties
    ));
    out.push_str(&format!(
        "  {} critical, {} warnings, {} info\n",
        report.summary.critical.to_string().red(),
        report.summary.warning.to_string().yellow(),
        report.summary.info.to_string().blue()
    ));

    if let Some(policy) = &report.meta.policy {
        if policy.regulated {
            out.push_str(&format!(
                "  {} regulated category{}\n",
                "!".yellow(),
                if policy.requires_prescreen {
                    ", pre-screen required"
                } else {
                    ""
                }
            ));
        }
        if verbose && !policy.required_disclaimers.is_empty() {
            out.push_str(&format!(
                "  Required disclaimers: {}\n",
                policy.required_disclaimers.join("; ")
            ));
        }
    }

    for (source, title) in [
        (ViolationSource::Text, "Text Violations"),
        (ViolationSource::Image, "Image Violations"),
    ] {
        let violations: Vec<&Violation> = report.violations_from(source).collect();
        if violations.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "\n  {} {} {}\n",
            "──".dimmed(),
            title,
            "─".repeat(50 - title.len().min(49)).dimmed()
        ));
        for v in violations {
            format_violation(out, v, verbose);
        }
    }

    if verbose && !report.copy.is_empty() {
        out.push_str(&format!("\n  {}\n", "Copy".cyan()));
        out.push_str(&format!("    {}\n", highlighted_copy(report)));
    }
}

fn format_violation(out: &mut String, v: &Violation, verbose: bool) {
    out.push_str(&format!(
        "  {}  {}  {}\n",
        severity_label(v.severity),
        v.policy_reference.dimmed(),
        v.category
    ));
    out.push_str(&format!("         {}\n", v.explanation));
    if let Some(text) = &v.offending_text {
        out.push_str(&format!("         Flagged: \"{}\"\n", text));
    }
    if let Some(region) = &v.offending_image_region {
        out.push_str(&format!(
            "         Region: {} at ({}, {}) {}x{}\n",
            region.label, region.x, region.y, region.width, region.height
        ));
    }
    if verbose {
        out.push_str(&format!(
            "         {} {} confidence {:.2}\n",
            v.id.dimmed(),
            v.severity,
            v.confidence
        ));
    }
    out.push_str(&format!("         {}: {}\n", "Fix".cyan(), v.suggested_fix));
}

fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Critical => " CRIT".red().bold().to_string(),
        Severity::Warning => " WARN".yellow().to_string(),
        Severity::Info => " INFO".blue().to_string(),
    }
}

fn highlighted_copy(report: &ComplianceReport) -> String {
    let spans = highlight_spans(&report.copy, &report.violations);
    segments(&report.copy, &spans)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(text) => text.to_string(),
            Segment::Highlight(text, span) => match span.severity {
                Severity::Critical => text.on_red().to_string(),
                Severity::Warning => text.on_yellow().to_string(),
                Severity::Info => text.underline().to_string(),
            },
        })
        .collect()
}

fn display_category(category: &str) -> &str {
    if category.trim().is_empty() {
        "unspecified"
    } else {
        category
    }
}
