//! Locates offending phrases inside the original copy for inline display.

use regex::RegexBuilder;
use serde::Serialize;

use crate::violation::{Severity, Violation};

/// Byte range of the copy flagged by one or more violations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub severity: Severity,
    pub category: String,
    pub explanation: String,
    pub policy_reference: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Highlight(&'a str, &'a HighlightSpan),
}

pub fn highlight_spans(copy: &str, violations: &[Violation]) -> Vec<HighlightSpan> {
    if copy.is_empty() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    for violation in violations {
        let Some(text) = violation.offending_text.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        let Ok(pattern) = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };

        // Restart one character past each match so overlapping hits are kept.
        let mut from = 0;
        while let Some(found) = pattern.find_at(copy, from) {
            spans.push(HighlightSpan {
                start: found.start(),
                end: found.end(),
                severity: violation.severity,
                category: violation.category.clone(),
                explanation: violation.explanation.clone(),
                policy_reference: violation.policy_reference.clone(),
            });
            match copy[found.start()..].chars().next() {
                Some(c) => from = found.start() + c.len_utf8(),
                None => break,
            }
            if from >= copy.len() {
                break;
            }
        }
    }

    spans.sort_by_key(|span| span.start);
    merge_overlapping(spans)
}

fn merge_overlapping(spans: Vec<HighlightSpan>) -> Vec<HighlightSpan> {
    let mut merged: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => {
                last.end = last.end.max(span.end);
                if span.severity > last.severity {
                    last.severity = span.severity;
                    last.category = span.category;
                    last.explanation = span.explanation;
                    last.policy_reference = span.policy_reference;
                }
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Splits `copy` into alternating plain and highlighted pieces.
pub fn segments<'a>(copy: &'a str, spans: &'a [HighlightSpan]) -> Vec<Segment<'a>> {
    let mut out = Vec::with_capacity(spans.len() * 2 + 1);
    let mut last_end = 0;
    for span in spans {
        if span.start > last_end {
            out.push(Segment::Plain(&copy[last_end..span.start]));
        }
        out.push(Segment::Highlight(&copy[span.start..span.end], span));
        last_end = span.end;
    }
    if last_end < copy.len() {
        out.push(Segment::Plain(&copy[last_end..]));
    }
    out
}
