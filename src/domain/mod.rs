use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Sentinel used for absent names and absent stage markers.
pub const NONE_SENTINEL: &str = "None";

/// Sentinel used when no ranked prediction candidate is a dog.
pub const NO_PREDICTION: &str = "No correct prediction";

/// A WeRateDogs rating. Denominators other than 10 are legitimate (the scale
/// is intentionally exceeded for effect); only curated misparses are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rating {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl Serialize for Rating {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Consolidated dog life stage. The four archive marker columns decode into
/// one of these; combinations outside the known set are passed through
/// flagged rather than guessed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DogStage {
    None,
    Doggo,
    Floofer,
    Pupper,
    Puppo,
    DoggoFloofer,
    DoggoPupper,
    DoggoPuppo,
    Unrecognized(String),
}

impl DogStage {
    /// Decodes the four marker booleans, in fixed column order (doggo,
    /// floofer, pupper, puppo), into one categorical stage.
    pub fn from_markers(doggo: bool, floofer: bool, pupper: bool, puppo: bool) -> Self {
        match (doggo, floofer, pupper, puppo) {
            (false, false, false, false) => DogStage::None,
            (true, false, false, false) => DogStage::Doggo,
            (false, true, false, false) => DogStage::Floofer,
            (false, false, true, false) => DogStage::Pupper,
            (false, false, false, true) => DogStage::Puppo,
            (true, true, false, false) => DogStage::DoggoFloofer,
            (true, false, true, false) => DogStage::DoggoPupper,
            (true, false, false, true) => DogStage::DoggoPuppo,
            _ => {
                let mut active = Vec::new();
                if doggo {
                    active.push("doggo");
                }
                if floofer {
                    active.push("floofer");
                }
                if pupper {
                    active.push("pupper");
                }
                if puppo {
                    active.push("puppo");
                }
                DogStage::Unrecognized(active.join(","))
            }
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, DogStage::Unrecognized(_))
    }
}

impl fmt::Display for DogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DogStage::None => NONE_SENTINEL,
            DogStage::Doggo => "doggo",
            DogStage::Floofer => "floofer",
            DogStage::Pupper => "pupper",
            DogStage::Puppo => "puppo",
            DogStage::DoggoFloofer => "doggo,floofer",
            DogStage::DoggoPupper => "doggo,pupper",
            DogStage::DoggoPuppo => "doggo,puppo",
            DogStage::Unrecognized(raw) => raw,
        };
        f.write_str(s)
    }
}

impl Serialize for DogStage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// One archive row after type normalization. IDs stay strings so large
/// integer identifiers never round-trip through floats.
#[derive(Debug, Clone)]
pub struct ArchiveRecord {
    pub tweet_id: String,
    pub created_at: DateTime<Utc>,
    pub expanded_urls: Option<String>,
    pub rating: Rating,
    pub name: Option<String>,
    pub doggo: bool,
    pub floofer: bool,
    pub pupper: bool,
    pub puppo: bool,
    pub retweeted_status_id: Option<String>,
    pub retweeted_status_user_id: Option<String>,
    pub retweeted_status_timestamp: Option<String>,
}

impl ArchiveRecord {
    /// The three retweet markers are jointly null or jointly populated; any
    /// one of them present marks the row as a repost of someone else's post.
    pub fn is_retweet(&self) -> bool {
        self.retweeted_status_id.is_some()
            || self.retweeted_status_user_id.is_some()
            || self.retweeted_status_timestamp.is_some()
    }
}

/// An original (non-retweet) post with exactly one canonical URL.
#[derive(Debug, Clone)]
pub struct OriginalRecord {
    pub tweet_id: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub rating: Rating,
    pub name: Option<String>,
    pub doggo: bool,
    pub floofer: bool,
    pub pupper: bool,
    pub puppo: bool,
}

/// An original post after field repair: corrected rating, sentinel-filled
/// name, consolidated stage.
#[derive(Debug, Clone)]
pub struct CleanRecord {
    pub tweet_id: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub name: String,
    pub dog_stage: DogStage,
    pub rating: Rating,
}

#[derive(Debug, Clone)]
pub struct PredictionCandidate {
    pub label: String,
    pub confidence: f64,
    pub is_dog: bool,
}

/// One classifier run over a post's image: three candidates in rank order.
#[derive(Debug, Clone)]
pub struct PredictionRecord {
    pub tweet_id: String,
    pub candidates: [PredictionCandidate; 3],
}

#[derive(Debug, Clone)]
pub struct MetricsRecord {
    pub tweet_id: String,
    pub retweet_count: u64,
    pub favorite_count: u64,
}

/// One fully reconciled output row. Field order here is the master CSV
/// column order.
#[derive(Debug, Clone, Serialize)]
pub struct MasterRecord {
    pub tweet_id: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub name: String,
    pub dog_stage: DogStage,
    pub rating: Rating,
    pub retweet_count: u64,
    pub favorite_count: u64,
    pub predicted_breed: String,
}
