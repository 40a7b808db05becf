use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{CleanRecord, MasterRecord, MetricsRecord, PredictionRecord, NO_PREDICTION};
use crate::error::{Result, WrangleError};

/// Join bookkeeping for the audit manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeCounts {
    /// Archive rows dropped because no metrics row matched (inner join).
    pub missing_metrics_dropped: usize,
    /// Extra prediction rows ignored under first-encountered-wins.
    pub duplicate_predictions: usize,
    /// Output rows that ended up with the no-prediction sentinel.
    pub without_prediction: usize,
}

/// First candidate in rank order the classifier believed to be a dog.
pub fn select_breed(record: &PredictionRecord) -> Option<&str> {
    record
        .candidates
        .iter()
        .find(|candidate| candidate.is_dog)
        .map(|candidate| candidate.label.as_str())
}

/// Joins the three sources on tweet id.
///
/// Join 1 is inner: a repaired archive row without metrics is dropped and
/// counted. Join 2 is left: a row without a prediction survives with the
/// sentinel breed. Output preserves archive row order, so identical inputs
/// merge to identical output.
pub fn merge(
    records: Vec<CleanRecord>,
    metrics: Vec<MetricsRecord>,
    predictions: &[PredictionRecord],
) -> Result<(Vec<MasterRecord>, MergeCounts)> {
    let mut counts = MergeCounts::default();

    let mut metrics_by_id: HashMap<String, MetricsRecord> = HashMap::with_capacity(metrics.len());
    for metric in metrics {
        let tweet_id = metric.tweet_id.clone();
        if metrics_by_id.insert(tweet_id.clone(), metric).is_some() {
            return Err(WrangleError::SourceIntegrity {
                message: format!("duplicate tweet_id {tweet_id} in metrics table"),
            });
        }
    }

    // Predictions are expected one-per-id; on violation the first row wins.
    let mut breeds: HashMap<&str, Option<&str>> = HashMap::with_capacity(predictions.len());
    for prediction in predictions {
        if breeds.contains_key(prediction.tweet_id.as_str()) {
            warn!(
                "duplicate prediction row for {} ignored; first encountered wins",
                prediction.tweet_id
            );
            counts.duplicate_predictions += 1;
            continue;
        }
        breeds.insert(prediction.tweet_id.as_str(), select_breed(prediction));
    }

    let mut master = Vec::with_capacity(records.len());
    for record in records {
        let metric = match metrics_by_id.remove(record.tweet_id.as_str()) {
            Some(metric) => metric,
            None => {
                counts.missing_metrics_dropped += 1;
                continue;
            }
        };

        let predicted_breed = breeds
            .get(record.tweet_id.as_str())
            .copied()
            .flatten()
            .map(str::to_string)
            .unwrap_or_else(|| NO_PREDICTION.to_string());
        if predicted_breed == NO_PREDICTION {
            counts.without_prediction += 1;
        }

        master.push(MasterRecord {
            tweet_id: record.tweet_id,
            created_at: record.created_at,
            url: record.url,
            name: record.name,
            dog_stage: record.dog_stage,
            rating: record.rating,
            retweet_count: metric.retweet_count,
            favorite_count: metric.favorite_count,
            predicted_breed,
        });
    }

    info!(
        "merged sources into master table: rows={} missing_metrics_dropped={} without_prediction={}",
        master.len(),
        counts.missing_metrics_dropped,
        counts.without_prediction
    );
    Ok((master, counts))
}
