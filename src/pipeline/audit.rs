use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::filter::FilterCounts;
use crate::pipeline::merge::MergeCounts;
use crate::pipeline::repair::AppliedCorrection;

/// Per-source row counts taken before any stage runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InputCounts {
    pub archive_rows: usize,
    pub prediction_rows: usize,
    pub metrics_rows: usize,
}

/// Operator-facing record of one pipeline run: what came in, what was
/// corrected or dropped at each stage, and the digest of what went out.
///
/// The manifest carries a fresh run id and wall-clock timestamps, so it is
/// not byte-stable across runs; only the master CSV is.
#[derive(Debug, Clone, Serialize)]
pub struct AuditManifest {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub input: InputCounts,
    pub output_rows: usize,
    pub filter: FilterCounts,
    pub rating_corrections: Vec<AppliedCorrection>,
    pub names_cleared: Vec<String>,
    pub null_names: usize,
    pub unrecognized_stages: usize,
    pub merge: MergeCounts,
    pub output_sha256: Option<String>,
}

impl AuditManifest {
    pub fn start(input: InputCounts) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            input,
            output_rows: 0,
            filter: FilterCounts::default(),
            rating_corrections: Vec::new(),
            names_cleared: Vec::new(),
            null_names: 0,
            unrecognized_stages: 0,
            merge: MergeCounts::default(),
            output_sha256: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Total rows dropped between input archive and output master.
    pub fn rows_dropped(&self) -> usize {
        self.filter.retweets_dropped
            + self.filter.missing_url_dropped
            + self.merge.missing_metrics_dropped
    }
}
