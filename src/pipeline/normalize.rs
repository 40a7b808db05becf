use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{
    ArchiveRecord, MetricsRecord, PredictionCandidate, PredictionRecord, Rating, NONE_SENTINEL,
};
use crate::error::{Result, WrangleError};
use crate::ingest::{RawArchiveRow, RawMetricsRow, RawPredictionRow};

/// Timestamp format of the archive export, e.g. `2017-08-01 16:23:56 +0000`.
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Coerces archive rows to typed records. Identifiers stay strings,
/// timestamps become UTC datetimes, rating columns become integers, stage
/// markers become booleans. Any unparseable value is fatal; duplicate
/// tweet ids violate the archive's uniqueness invariant and are fatal too.
pub fn normalize_archive(rows: Vec<RawArchiveRow>) -> Result<Vec<ArchiveRecord>> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.tweet_id.clone()) {
            return Err(WrangleError::SourceIntegrity {
                message: format!("duplicate tweet_id {} in archive export", row.tweet_id),
            });
        }
        let created_at = parse_timestamp(&row.tweet_id, "timestamp", &row.timestamp)?;
        let rating = Rating::new(
            parse_u32(&row.tweet_id, "rating_numerator", &row.rating_numerator)?,
            parse_u32(&row.tweet_id, "rating_denominator", &row.rating_denominator)?,
        );
        records.push(ArchiveRecord {
            created_at,
            rating,
            expanded_urls: row.expanded_urls,
            name: row.name,
            doggo: marker_active(row.doggo.as_deref()),
            floofer: marker_active(row.floofer.as_deref()),
            pupper: marker_active(row.pupper.as_deref()),
            puppo: marker_active(row.puppo.as_deref()),
            retweeted_status_id: row.retweeted_status_id,
            retweeted_status_user_id: row.retweeted_status_user_id,
            retweeted_status_timestamp: row.retweeted_status_timestamp,
            tweet_id: row.tweet_id,
        });
    }
    debug!("normalized {} archive rows", records.len());
    Ok(records)
}

/// Coerces prediction rows to typed records: confidences to floats,
/// Python-style `True`/`False` flags to booleans. Duplicate tweet ids are
/// tolerated here; the merge stage resolves them.
pub fn normalize_predictions(rows: Vec<RawPredictionRow>) -> Result<Vec<PredictionRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let candidates = [
            PredictionCandidate {
                confidence: parse_f64(&row.tweet_id, "p1_conf", &row.p1_conf)?,
                is_dog: parse_bool(&row.tweet_id, "p1_dog", &row.p1_dog)?,
                label: row.p1,
            },
            PredictionCandidate {
                confidence: parse_f64(&row.tweet_id, "p2_conf", &row.p2_conf)?,
                is_dog: parse_bool(&row.tweet_id, "p2_dog", &row.p2_dog)?,
                label: row.p2,
            },
            PredictionCandidate {
                confidence: parse_f64(&row.tweet_id, "p3_conf", &row.p3_conf)?,
                is_dog: parse_bool(&row.tweet_id, "p3_dog", &row.p3_dog)?,
                label: row.p3,
            },
        ];
        records.push(PredictionRecord {
            tweet_id: row.tweet_id,
            candidates,
        });
    }
    debug!("normalized {} prediction rows", records.len());
    Ok(records)
}

/// Coerces metrics rows to typed records: counts to unsigned integers.
pub fn normalize_metrics(rows: Vec<RawMetricsRow>) -> Result<Vec<MetricsRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(MetricsRecord {
            retweet_count: parse_u64(&row.tweet_id, "retweet_count", &row.retweet_count)?,
            favorite_count: parse_u64(&row.tweet_id, "favorite_count", &row.favorite_count)?,
            tweet_id: row.tweet_id,
        });
    }
    debug!("normalized {} metrics rows", records.len());
    Ok(records)
}

/// A stage marker column is active when it carries anything other than the
/// `None` sentinel or an empty cell.
fn marker_active(value: Option<&str>) -> bool {
    match value {
        Some(v) => !v.is_empty() && v != NONE_SENTINEL,
        None => false,
    }
}

fn parse_timestamp(record_id: &str, column: &str, value: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_str(value, ARCHIVE_TIMESTAMP_FORMAT) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    Err(coercion_error(record_id, column, value))
}

fn parse_u32(record_id: &str, column: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| coercion_error(record_id, column, value))
}

fn parse_u64(record_id: &str, column: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| coercion_error(record_id, column, value))
}

fn parse_f64(record_id: &str, column: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| coercion_error(record_id, column, value))
}

fn parse_bool(record_id: &str, column: &str, value: &str) -> Result<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(coercion_error(record_id, column, value))
    }
}

fn coercion_error(record_id: &str, column: &str, value: &str) -> WrangleError {
    WrangleError::TypeCoercion {
        record_id: record_id.to_string(),
        column: column.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_archive_row(tweet_id: &str) -> RawArchiveRow {
        RawArchiveRow {
            tweet_id: tweet_id.to_string(),
            timestamp: "2017-08-01 16:23:56 +0000".to_string(),
            expanded_urls: Some(format!(
                "https://twitter.com/dog_rates/status/{tweet_id}/photo/1"
            )),
            rating_numerator: "13".to_string(),
            rating_denominator: "10".to_string(),
            name: Some("Phineas".to_string()),
            doggo: Some("None".to_string()),
            floofer: Some("None".to_string()),
            pupper: Some("None".to_string()),
            puppo: Some("None".to_string()),
            retweeted_status_id: None,
            retweeted_status_user_id: None,
            retweeted_status_timestamp: None,
        }
    }

    #[test]
    fn test_normalize_archive_parses_types() {
        let records = normalize_archive(vec![create_test_archive_row("892420643555336193")]).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.tweet_id, "892420643555336193");
        assert_eq!(record.created_at.to_rfc3339(), "2017-08-01T16:23:56+00:00");
        assert_eq!(record.rating, Rating::new(13, 10));
        assert!(!record.doggo && !record.floofer && !record.pupper && !record.puppo);
    }

    #[test]
    fn test_normalize_archive_accepts_rfc3339_timestamps() {
        let mut row = create_test_archive_row("1");
        row.timestamp = "2017-08-01T16:23:56Z".to_string();
        let records = normalize_archive(vec![row]).unwrap();
        assert_eq!(records[0].created_at.to_rfc3339(), "2017-08-01T16:23:56+00:00");
    }

    #[test]
    fn test_normalize_archive_marker_words_become_booleans() {
        let mut row = create_test_archive_row("1");
        row.doggo = Some("doggo".to_string());
        row.pupper = Some("pupper".to_string());
        let records = normalize_archive(vec![row]).unwrap();
        assert!(records[0].doggo);
        assert!(records[0].pupper);
        assert!(!records[0].floofer);
    }

    #[test]
    fn test_normalize_archive_rejects_bad_timestamp() {
        let mut row = create_test_archive_row("777");
        row.timestamp = "last tuesday".to_string();
        let err = normalize_archive(vec![row]).unwrap_err();
        match err {
            WrangleError::TypeCoercion {
                record_id, column, ..
            } => {
                assert_eq!(record_id, "777");
                assert_eq!(column, "timestamp");
            }
            other => panic!("expected TypeCoercion, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_archive_rejects_non_integer_rating() {
        let mut row = create_test_archive_row("778");
        row.rating_numerator = "13.5".to_string();
        let err = normalize_archive(vec![row]).unwrap_err();
        assert!(matches!(err, WrangleError::TypeCoercion { .. }));
    }

    #[test]
    fn test_normalize_archive_rejects_duplicate_ids() {
        let rows = vec![
            create_test_archive_row("892420643555336193"),
            create_test_archive_row("892420643555336193"),
        ];
        let err = normalize_archive(rows).unwrap_err();
        assert!(matches!(err, WrangleError::SourceIntegrity { .. }));
    }

    #[test]
    fn test_normalize_predictions_parses_flags_and_confidence() {
        let row = RawPredictionRow {
            tweet_id: "666020888022790149".to_string(),
            p1: "Welsh_springer_spaniel".to_string(),
            p1_conf: "0.465074".to_string(),
            p1_dog: "True".to_string(),
            p2: "collie".to_string(),
            p2_conf: "0.156665".to_string(),
            p2_dog: "True".to_string(),
            p3: "Shetland_sheepdog".to_string(),
            p3_conf: "0.061428".to_string(),
            p3_dog: "False".to_string(),
        };
        let records = normalize_predictions(vec![row]).unwrap();
        let record = &records[0];
        assert_eq!(record.candidates[0].label, "Welsh_springer_spaniel");
        assert!((record.candidates[0].confidence - 0.465074).abs() < 1e-9);
        assert!(record.candidates[1].is_dog);
        assert!(!record.candidates[2].is_dog);
    }

    #[test]
    fn test_normalize_predictions_rejects_bad_flag() {
        let row = RawPredictionRow {
            tweet_id: "1".to_string(),
            p1: "pug".to_string(),
            p1_conf: "0.9".to_string(),
            p1_dog: "yes".to_string(),
            p2: "collie".to_string(),
            p2_conf: "0.05".to_string(),
            p2_dog: "False".to_string(),
            p3: "mop".to_string(),
            p3_conf: "0.01".to_string(),
            p3_dog: "False".to_string(),
        };
        let err = normalize_predictions(vec![row]).unwrap_err();
        match err {
            WrangleError::TypeCoercion { column, value, .. } => {
                assert_eq!(column, "p1_dog");
                assert_eq!(value, "yes");
            }
            other => panic!("expected TypeCoercion, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_metrics_parses_counts() {
        let row = RawMetricsRow {
            tweet_id: "892420643555336193".to_string(),
            retweet_count: "8853".to_string(),
            favorite_count: "39467".to_string(),
        };
        let records = normalize_metrics(vec![row]).unwrap();
        assert_eq!(records[0].retweet_count, 8853);
        assert_eq!(records[0].favorite_count, 39467);
    }

    #[test]
    fn test_normalize_metrics_rejects_missing_count() {
        let row = RawMetricsRow {
            tweet_id: "892420643555336193".to_string(),
            retweet_count: String::new(),
            favorite_count: "39467".to_string(),
        };
        let err = normalize_metrics(vec![row]).unwrap_err();
        assert!(matches!(err, WrangleError::TypeCoercion { .. }));
    }
}
