use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::MasterRecord;
use crate::error::{Result, WrangleError};
use crate::pipeline::audit::AuditManifest;

/// Serializes the master table to CSV bytes. Separate from the file write
/// so the manifest digest covers exactly what lands on disk.
pub fn master_csv_bytes(records: &[MasterRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| WrangleError::Io(e.into_error()))
}

/// Writes the master CSV and returns its digest.
pub fn write_master(path: &Path, records: &[MasterRecord]) -> Result<String> {
    let bytes = master_csv_bytes(records)?;
    fs::write(path, &bytes)?;
    let digest = sha256_digest(&bytes);
    info!(
        "wrote {} master rows to {} ({})",
        records.len(),
        path.display(),
        digest
    );
    Ok(digest)
}

/// Writes the audit manifest as pretty JSON.
pub fn write_manifest(path: &Path, manifest: &AuditManifest) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(manifest)?;
    fs::write(path, bytes)?;
    info!("wrote audit manifest to {}", path.display());
    Ok(())
}

pub fn sha256_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DogStage, Rating};
    use chrono::{TimeZone, Utc};

    fn create_test_master(tweet_id: &str) -> MasterRecord {
        MasterRecord {
            tweet_id: tweet_id.to_string(),
            created_at: Utc.with_ymd_and_hms(2017, 8, 1, 16, 23, 56).unwrap(),
            url: format!("https://twitter.com/dog_rates/status/{tweet_id}/photo/1"),
            name: "Phineas".to_string(),
            dog_stage: DogStage::DoggoPupper,
            rating: Rating::new(13, 10),
            retweet_count: 8853,
            favorite_count: 39467,
            predicted_breed: "Golden_retriever".to_string(),
        }
    }

    #[test]
    fn test_master_csv_header_and_display_forms() {
        let bytes = master_csv_bytes(&[create_test_master("892420643555336193")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "tweet_id,created_at,url,name,dog_stage,rating,retweet_count,favorite_count,predicted_breed"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("892420643555336193,2017-08-01T16:23:56Z,"));
        assert!(row.contains(",\"doggo,pupper\","));
        assert!(row.contains(",13/10,"));
        assert!(row.ends_with(",Golden_retriever"));
    }

    #[test]
    fn test_master_csv_bytes_deterministic() {
        let records = vec![create_test_master("1"), create_test_master("2")];
        let first = master_csv_bytes(&records).unwrap();
        let second = master_csv_bytes(&records).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_master_digest_matches_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.csv");
        let digest = write_master(&path, &[create_test_master("1")]).unwrap();

        let on_disk = fs::read(&path).unwrap();
        assert_eq!(digest, sha256_digest(&on_disk));
        assert!(digest.starts_with("sha256:"));
    }
}
