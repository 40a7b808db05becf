use thiserror::Error;

#[derive(Error, Debug)]
pub enum WrangleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("type coercion failed for record {record_id}, column '{column}': value '{value}'")]
    TypeCoercion {
        record_id: String,
        column: String,
        value: String,
    },

    #[error("record {record_id} missing at stage '{stage}'")]
    MissingRecord { record_id: String, stage: String },

    #[error("source integrity violation: {message}")]
    SourceIntegrity { message: String },
}

pub type Result<T> = std::result::Result<T, WrangleError>;
