use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{ArchiveRecord, OriginalRecord};

/// Rows dropped by the filter, by reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCounts {
    pub retweets_dropped: usize,
    pub missing_url_dropped: usize,
}

/// Keeps original posts only: retweets go first, then rows without a usable
/// reference URL. Of the comma-delimited URL candidates the first usable one
/// is kept as canonical; the rest are discarded (fixed tie-break, not a
/// ranking). Removal is final for the run.
pub fn filter_originals(records: Vec<ArchiveRecord>) -> (Vec<OriginalRecord>, FilterCounts) {
    let mut counts = FilterCounts::default();
    let mut originals = Vec::with_capacity(records.len());
    for record in records {
        if record.is_retweet() {
            counts.retweets_dropped += 1;
            continue;
        }
        let url = match first_url(record.expanded_urls.as_deref()) {
            Some(url) => url,
            None => {
                counts.missing_url_dropped += 1;
                continue;
            }
        };
        originals.push(OriginalRecord {
            tweet_id: record.tweet_id,
            created_at: record.created_at,
            url,
            rating: record.rating,
            name: record.name,
            doggo: record.doggo,
            floofer: record.floofer,
            pupper: record.pupper,
            puppo: record.puppo,
        });
    }
    info!(
        "filtered archive to originals: kept={} retweets_dropped={} missing_url_dropped={}",
        originals.len(),
        counts.retweets_dropped,
        counts.missing_url_dropped
    );
    (originals, counts)
}

fn first_url(raw: Option<&str>) -> Option<String> {
    raw.and_then(|candidates| {
        candidates
            .split(',')
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .map(str::to_string)
    })
}
