use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::domain::NONE_SENTINEL;
use crate::ingest::{RawArchiveRow, RawMetricsRow, RawPredictionRow};
use crate::pipeline::repair::is_lowercase_token;

/// Severity of one assessment finding. `Error` findings would abort a
/// wrangle run; the rest are repaired or tolerated by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AssessSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for AssessSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssessSeverity::Info => "info",
            AssessSeverity::Warning => "warning",
            AssessSeverity::Error => "error",
        };
        f.write_str(s)
    }
}

/// One quality or tidiness finding in a raw source table.
#[derive(Debug, Clone, Serialize)]
pub struct AssessIssue {
    pub severity: AssessSeverity,
    pub source: String,
    pub description: String,
    pub count: usize,
}

/// Read-only inspection of the three raw tables, before any cleaning runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssessmentReport {
    pub issues: Vec<AssessIssue>,
}

impl AssessmentReport {
    fn push(
        &mut self,
        severity: AssessSeverity,
        source: &str,
        description: impl Into<String>,
        count: usize,
    ) {
        if count > 0 {
            self.issues.push(AssessIssue {
                severity,
                source: source.to_string(),
                description: description.into(),
                count,
            });
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == AssessSeverity::Error)
    }
}

/// Inspects the raw tables and reports what a wrangle run would repair,
/// drop, or abort on. Nothing is modified.
pub fn assess(
    archive: &[RawArchiveRow],
    predictions: &[RawPredictionRow],
    metrics: &[RawMetricsRow],
) -> AssessmentReport {
    let mut report = AssessmentReport::default();

    report.push(
        AssessSeverity::Error,
        "archive",
        "duplicate tweet_id values",
        count_duplicates(archive.iter().map(|r| r.tweet_id.as_str())),
    );
    report.push(
        AssessSeverity::Error,
        "archive",
        "rating fields that fail integer parsing",
        archive
            .iter()
            .filter(|r| {
                r.rating_numerator.trim().parse::<u32>().is_err()
                    || r.rating_denominator.trim().parse::<u32>().is_err()
            })
            .count(),
    );
    report.push(
        AssessSeverity::Warning,
        "archive",
        "retweet rows (dropped by the filter)",
        archive.iter().filter(|r| r.has_derivative_markers()).count(),
    );
    report.push(
        AssessSeverity::Warning,
        "archive",
        "rows without an expanded URL (dropped by the filter)",
        archive
            .iter()
            .filter(|r| {
                r.expanded_urls
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or("")
                    .is_empty()
            })
            .count(),
    );
    report.push(
        AssessSeverity::Info,
        "archive",
        "rating denominators other than 10 (mostly intentional)",
        archive
            .iter()
            .filter(|r| {
                r.rating_denominator
                    .trim()
                    .parse::<u32>()
                    .map(|d| d != 10)
                    .unwrap_or(false)
            })
            .count(),
    );
    report.push(
        AssessSeverity::Warning,
        "archive",
        "lowercase filler tokens in the name column (cleared by repair)",
        archive
            .iter()
            .filter(|r| r.name.as_deref().map(is_lowercase_token).unwrap_or(false))
            .count(),
    );
    report.push(
        AssessSeverity::Info,
        "archive",
        "names already at the sentinel",
        archive
            .iter()
            .filter(|r| r.name.as_deref() == Some(NONE_SENTINEL))
            .count(),
    );
    report.push(
        AssessSeverity::Warning,
        "archive",
        "rows with more than one stage marker set",
        archive
            .iter()
            .filter(|r| {
                [&r.doggo, &r.floofer, &r.pupper, &r.puppo]
                    .iter()
                    .filter(|marker| raw_marker_active(marker.as_deref()))
                    .count()
                    > 1
            })
            .count(),
    );

    report.push(
        AssessSeverity::Warning,
        "predictions",
        "duplicate tweet_id values (first row wins at merge)",
        count_duplicates(predictions.iter().map(|r| r.tweet_id.as_str())),
    );
    report.push(
        AssessSeverity::Info,
        "predictions",
        "rows with labels needing capitalization",
        predictions
            .iter()
            .filter(|r| {
                [&r.p1, &r.p2, &r.p3].iter().any(|label| {
                    label
                        .chars()
                        .next()
                        .map(|c| c.is_lowercase())
                        .unwrap_or(false)
                })
            })
            .count(),
    );

    report.push(
        AssessSeverity::Error,
        "metrics",
        "duplicate tweet_id values",
        count_duplicates(metrics.iter().map(|r| r.tweet_id.as_str())),
    );
    let metric_ids: HashSet<&str> = metrics.iter().map(|r| r.tweet_id.as_str()).collect();
    report.push(
        AssessSeverity::Warning,
        "metrics",
        "original archive rows without metrics coverage (dropped at merge)",
        archive
            .iter()
            .filter(|r| !r.has_derivative_markers() && !metric_ids.contains(r.tweet_id.as_str()))
            .count(),
    );

    report
}

fn raw_marker_active(value: Option<&str>) -> bool {
    match value {
        Some(v) => !v.is_empty() && v != NONE_SENTINEL,
        None => false,
    }
}

fn count_duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> usize {
    let mut seen = HashSet::new();
    let mut duplicates = 0;
    for id in ids {
        if !seen.insert(id) {
            duplicates += 1;
        }
    }
    duplicates
}
