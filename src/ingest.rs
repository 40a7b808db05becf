use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, WrangleError};

/// Wire shape of one enhanced-archive CSV row. Free-text columns (`text`,
/// `source`) and the reply markers are not read; the csv reader skips
/// headers this struct does not name.
#[derive(Debug, Clone, Deserialize)]
pub struct RawArchiveRow {
    pub tweet_id: String,
    pub timestamp: String,
    pub expanded_urls: Option<String>,
    pub rating_numerator: String,
    pub rating_denominator: String,
    pub name: Option<String>,
    pub doggo: Option<String>,
    pub floofer: Option<String>,
    pub pupper: Option<String>,
    pub puppo: Option<String>,
    pub retweeted_status_id: Option<String>,
    pub retweeted_status_user_id: Option<String>,
    pub retweeted_status_timestamp: Option<String>,
}

impl RawArchiveRow {
    pub fn has_derivative_markers(&self) -> bool {
        self.retweeted_status_id.is_some()
            || self.retweeted_status_user_id.is_some()
            || self.retweeted_status_timestamp.is_some()
    }
}

/// Wire shape of one image-prediction TSV row (`jpg_url` and `img_num` are
/// not read).
#[derive(Debug, Clone, Deserialize)]
pub struct RawPredictionRow {
    pub tweet_id: String,
    pub p1: String,
    pub p1_conf: String,
    pub p1_dog: String,
    pub p2: String,
    pub p2_conf: String,
    pub p2_dog: String,
    pub p3: String,
    pub p3_conf: String,
    pub p3_dog: String,
}

/// Wire shape of one engagement-metrics row, whether it arrived as CSV or
/// as a line of the API dump.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMetricsRow {
    #[serde(alias = "id")]
    pub tweet_id: String,
    pub retweet_count: String,
    pub favorite_count: String,
}

/// Reads the enhanced archive export (comma-delimited, headered).
pub fn read_archive(path: &Path) -> Result<Vec<RawArchiveRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    debug!("read {} archive rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Reads the image-prediction table (tab-delimited, headered).
pub fn read_predictions(path: &Path) -> Result<Vec<RawPredictionRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    debug!("read {} prediction rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Reads the engagement metrics table. `.json`/`.jsonl`/`.txt` files are
/// treated as the raw API dump (one JSON object per line); anything else is
/// read as headered CSV.
pub fn read_metrics(path: &Path) -> Result<Vec<RawMetricsRow>> {
    if is_json_lines(path) {
        read_metrics_json_lines(path)
    } else {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        debug!("read {} metrics rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}

fn is_json_lines(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("json" | "jsonl" | "txt")
    )
}

fn read_metrics_json_lines(path: &Path) -> Result<Vec<RawMetricsRow>> {
    let file = File::open(path)?;
    let mut rows = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)?;
        // id_str preserves precision; the numeric id is a fallback only
        let tweet_id = value
            .get("id_str")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| value.get("id").map(|id| id.to_string()))
            .ok_or_else(|| WrangleError::SourceIntegrity {
                message: format!("metrics line {} carries no tweet id", index + 1),
            })?;
        rows.push(RawMetricsRow {
            tweet_id,
            retweet_count: field_as_string(&value, "retweet_count"),
            favorite_count: field_as_string(&value, "favorite_count"),
        });
    }
    debug!("read {} metrics rows from API dump {}", rows.len(), path.display());
    Ok(rows)
}

fn field_as_string(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
