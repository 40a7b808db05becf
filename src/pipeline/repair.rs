use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{CleanRecord, DogStage, OriginalRecord, PredictionRecord, Rating, NONE_SENTINEL};
use crate::error::{Result, WrangleError};

/// One curated rating fix. These are free-text misparses (dates, fractions,
/// figures of speech captured as ratings) corrected from reading the
/// underlying post; they cannot be inferred generically.
#[derive(Debug, Clone)]
pub struct RatingCorrection {
    pub tweet_id: &'static str,
    pub expected: Rating,
    pub corrected: Rating,
    pub note: &'static str,
}

/// The known misparsed ratings in the archive export. Every other
/// denominator ≠ 10 is intentional rating-scale exuberance and stays as-is.
pub static RATING_CORRECTIONS: Lazy<Vec<RatingCorrection>> = Lazy::new(|| {
    vec![
        RatingCorrection {
            tweet_id: "740373189193256964",
            expected: Rating::new(9, 11),
            corrected: Rating::new(14, 10),
            note: "text cites the date 9/11; the stated rating is 14/10",
        },
        RatingCorrection {
            tweet_id: "722974582966214656",
            expected: Rating::new(4, 20),
            corrected: Rating::new(13, 10),
            note: "text cites 4/20; the stated rating is 13/10",
        },
        RatingCorrection {
            tweet_id: "682962037429899265",
            expected: Rating::new(7, 11),
            corrected: Rating::new(10, 10),
            note: "text cites 7/11; the stated rating is 10/10",
        },
        RatingCorrection {
            tweet_id: "666287406224695296",
            expected: Rating::new(1, 2),
            corrected: Rating::new(9, 10),
            note: "text cites the fraction 1/2; the stated rating is 9/10",
        },
        RatingCorrection {
            tweet_id: "810984652412424192",
            expected: Rating::new(24, 7),
            corrected: Rating::new(10, 10),
            note: "text cites 24/7 and carries no rating; set to 10/10",
        },
    ]
});

/// One correction as actually applied, for the audit manifest.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedCorrection {
    pub tweet_id: String,
    pub before: Rating,
    pub after: Rating,
    pub note: String,
}

/// What the repair stage changed, for the audit manifest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
    pub rating_corrections: Vec<AppliedCorrection>,
    pub names_cleared: Vec<String>,
    pub null_names: usize,
    pub unrecognized_stages: usize,
}

/// Applies the curated rating corrections, clears filler-word names to the
/// sentinel, and consolidates the four stage markers into one category.
///
/// The correction list is positional: every listed tweet id must still be
/// present in the filtered table, otherwise the list has drifted from the
/// data and the run aborts rather than partially applying it.
pub fn repair_archive(
    records: Vec<OriginalRecord>,
    corrections: &[RatingCorrection],
) -> Result<(Vec<CleanRecord>, RepairReport)> {
    let corrections_by_id: HashMap<&str, &RatingCorrection> = corrections
        .iter()
        .map(|correction| (correction.tweet_id, correction))
        .collect();

    let present: HashSet<&str> = records.iter().map(|r| r.tweet_id.as_str()).collect();
    for correction in corrections {
        if !present.contains(correction.tweet_id) {
            return Err(WrangleError::MissingRecord {
                record_id: correction.tweet_id.to_string(),
                stage: "rating repair".to_string(),
            });
        }
    }

    let mut report = RepairReport::default();
    let mut clean = Vec::with_capacity(records.len());
    for record in records {
        let rating = match corrections_by_id.get(record.tweet_id.as_str()) {
            Some(correction) => {
                if record.rating != correction.expected {
                    warn!(
                        "rating correction for {} applied over {} (expected the misparse {})",
                        record.tweet_id, record.rating, correction.expected
                    );
                }
                report.rating_corrections.push(AppliedCorrection {
                    tweet_id: record.tweet_id.clone(),
                    before: record.rating,
                    after: correction.corrected,
                    note: correction.note.to_string(),
                });
                correction.corrected
            }
            None => record.rating,
        };

        let name = match record.name {
            None => {
                report.null_names += 1;
                NONE_SENTINEL.to_string()
            }
            Some(name) if is_lowercase_token(&name) => {
                report.names_cleared.push(record.tweet_id.clone());
                NONE_SENTINEL.to_string()
            }
            Some(name) => name,
        };

        let dog_stage =
            DogStage::from_markers(record.doggo, record.floofer, record.pupper, record.puppo);
        if dog_stage.is_unrecognized() {
            warn!(
                "unrecognized stage combination '{}' on {} passed through",
                dog_stage, record.tweet_id
            );
            report.unrecognized_stages += 1;
        }

        clean.push(CleanRecord {
            tweet_id: record.tweet_id,
            created_at: record.created_at,
            url: record.url,
            name,
            dog_stage,
            rating,
        });
    }

    info!(
        "repaired archive fields: ratings_corrected={} names_cleared={} null_names={}",
        report.rating_corrections.len(),
        report.names_cleared.len(),
        report.null_names
    );
    Ok((clean, report))
}

/// Rewrites all three ranked labels to canonical capitalization: first
/// letter uppercase, remainder unchanged.
pub fn repair_predictions(records: Vec<PredictionRecord>) -> Vec<PredictionRecord> {
    records
        .into_iter()
        .map(|mut record| {
            for candidate in &mut record.candidates {
                candidate.label = capitalize_first(&candidate.label);
            }
            record
        })
        .collect()
}

/// Python `str.islower` semantics: at least one cased character and none
/// uppercase. Lowercase tokens in the name column are grammatical filler
/// ("a", "the", "an") mis-captured by the upstream text extraction.
pub(crate) fn is_lowercase_token(token: &str) -> bool {
    token.chars().any(char::is_lowercase) && !token.chars().any(char::is_uppercase)
}

fn capitalize_first(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
