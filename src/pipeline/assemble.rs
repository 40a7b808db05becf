use tracing::{info, instrument};

use crate::domain::MasterRecord;
use crate::error::Result;
use crate::ingest::{RawArchiveRow, RawMetricsRow, RawPredictionRow};
use crate::pipeline::audit::{AuditManifest, InputCounts};
use crate::pipeline::filter::filter_originals;
use crate::pipeline::merge::merge;
use crate::pipeline::normalize::{normalize_archive, normalize_metrics, normalize_predictions};
use crate::pipeline::repair::{
    repair_archive, repair_predictions, RatingCorrection, RATING_CORRECTIONS,
};

/// Everything one run produces: the master table and its audit manifest.
#[derive(Debug)]
pub struct WrangleOutcome {
    pub master: Vec<MasterRecord>,
    pub manifest: AuditManifest,
}

/// Runs the stages in fixed dependency order: normalize → filter → repair
/// (archive and prediction sides independently) → merge. Any stage error
/// aborts the run; nothing partial is emitted.
pub struct Assembler {
    corrections: Vec<RatingCorrection>,
}

impl Assembler {
    /// An assembler using the curated rating correction table.
    pub fn new() -> Self {
        Self {
            corrections: RATING_CORRECTIONS.clone(),
        }
    }

    /// An assembler with a custom rating correction table.
    pub fn with_corrections(corrections: Vec<RatingCorrection>) -> Self {
        Self { corrections }
    }

    #[instrument(skip(self, archive, predictions, metrics))]
    pub fn run(
        &self,
        archive: Vec<RawArchiveRow>,
        predictions: Vec<RawPredictionRow>,
        metrics: Vec<RawMetricsRow>,
    ) -> Result<WrangleOutcome> {
        let mut manifest = AuditManifest::start(InputCounts {
            archive_rows: archive.len(),
            prediction_rows: predictions.len(),
            metrics_rows: metrics.len(),
        });
        info!(
            "🚀 Starting wrangle run {}: archive={} predictions={} metrics={}",
            manifest.run_id,
            archive.len(),
            predictions.len(),
            metrics.len()
        );

        info!("🔧 Normalizing source tables...");
        let archive = normalize_archive(archive)?;
        let predictions = normalize_predictions(predictions)?;
        let metrics = normalize_metrics(metrics)?;

        info!("🧹 Filtering to original posts...");
        let (originals, filter_counts) = filter_originals(archive);
        manifest.filter = filter_counts;

        info!("🩹 Repairing fields...");
        let (clean, repair_report) = repair_archive(originals, &self.corrections)?;
        let predictions = repair_predictions(predictions);
        manifest.rating_corrections = repair_report.rating_corrections;
        manifest.names_cleared = repair_report.names_cleared;
        manifest.null_names = repair_report.null_names;
        manifest.unrecognized_stages = repair_report.unrecognized_stages;

        info!("🔗 Merging sources...");
        let (master, merge_counts) = merge(clean, metrics, &predictions)?;
        manifest.merge = merge_counts;
        manifest.output_rows = master.len();
        manifest.finish();

        info!(
            "✅ Wrangle run complete: {} master rows, {} rows dropped",
            master.len(),
            manifest.rows_dropped()
        );
        Ok(WrangleOutcome { master, manifest })
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}
