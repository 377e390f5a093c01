use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{RecommenderError, Result};
use crate::index::DistanceMetric;

/// Locations of the raw Book-Crossing tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSettings {
    pub ratings_file: PathBuf,
    pub books_file: PathBuf,
    pub users_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformSettings {
    pub min_ratings_per_user: usize,
    pub min_ratings_per_book: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSettings {
    pub metric: DistanceMetric,
    pub k_default: usize,
    /// Refuse to build over matrices with more cells than this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cells: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub data: DataSettings,
    pub artifacts_dir: PathBuf,
    pub transformation: TransformSettings,
    pub model: ModelSettings,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecommenderError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_yaml(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| RecommenderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive(
            "transformation.min_ratings_per_user",
            self.transformation.min_ratings_per_user,
        )?;
        ensure_positive(
            "transformation.min_ratings_per_book",
            self.transformation.min_ratings_per_book,
        )?;
        ensure_positive("model.k_default", self.model.k_default)?;
        if let Some(max_cells) = self.model.max_cells {
            ensure_positive("model.max_cells", max_cells)?;
        }
        Ok(())
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.artifacts_dir.join("catalog.db")
    }
}

fn ensure_positive(key: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(RecommenderError::Config(format!(
            "'{}' must be greater than zero",
            key
        )));
    }
    Ok(())
}
