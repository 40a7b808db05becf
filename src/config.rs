use crate::error::{Result, WrangleError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct WrangleConfig {
    pub sources: SourcesConfig,
    pub output: OutputConfig,
}

/// Paths to the three raw tables.
#[derive(Debug, Deserialize)]
pub struct SourcesConfig {
    pub archive: PathBuf,
    pub predictions: PathBuf,
    pub metrics: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub master: PathBuf,
    pub manifest: Option<PathBuf>,
}

impl WrangleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            WrangleError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: WrangleConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
