use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings::DataSettings;
use crate::errors::{RecommenderError, Result};
use crate::table::RawTable;

pub const RATINGS_TABLE: &str = "ratings";
pub const BOOKS_TABLE: &str = "books";
pub const USERS_TABLE: &str = "users";

/// Raw tables in, JSON artifacts out
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
    data: DataSettings,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(artifacts_dir: P, data: DataSettings) -> Result<Self> {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        fs::create_dir_all(&artifacts_dir).map_err(|e| RecommenderError::io(&artifacts_dir, e))?;

        Ok(Self {
            artifacts_dir,
            data,
        })
    }

    /// Load one of the raw tables (`ratings`, `books`, `users`)
    pub fn load_table(&self, name: &str) -> Result<RawTable> {
        let path = match name {
            RATINGS_TABLE => &self.data.ratings_file,
            BOOKS_TABLE => &self.data.books_file,
            USERS_TABLE => &self.data.users_file,
            other => {
                return Err(RecommenderError::NotFound(format!(
                    "no raw table named '{}'",
                    other
                )))
            }
        };

        let table = RawTable::from_path(name, path)?;
        info!("Loaded table '{}' from {}: {} rows", name, path.display(), table.len());
        Ok(table)
    }

    /// Write an artifact; readers see either the old or the new file
    pub fn save_artifact<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let file_path = self.build_artifact_path(name);
        let temp_path = file_path.with_extension("json.tmp");

        let json = serde_json::to_vec(data).map_err(|source| RecommenderError::Serialization {
            name: name.to_string(),
            source,
        })?;

        fs::write(&temp_path, json).map_err(|e| RecommenderError::io(&temp_path, e))?;
        fs::rename(&temp_path, &file_path).map_err(|e| RecommenderError::io(&file_path, e))?;

        info!("Saved artifact '{}' to {}", name, file_path.display());
        Ok(())
    }

    pub fn load_artifact<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let file_path = self.build_artifact_path(name);
        if !file_path.exists() {
            return Err(RecommenderError::NotFound(format!(
                "artifact '{}' at {}",
                name,
                file_path.display()
            )));
        }

        let bytes = fs::read(&file_path).map_err(|e| RecommenderError::io(&file_path, e))?;
        let data = serde_json::from_slice(&bytes).map_err(|source| {
            RecommenderError::Serialization {
                name: name.to_string(),
                source,
            }
        })?;

        info!("Loaded artifact '{}' from {}", name, file_path.display());
        Ok(data)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.build_artifact_path(name).exists()
    }

    fn build_artifact_path(&self, name: &str) -> PathBuf {
        self.artifacts_dir.join(format!("{}.json", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DistanceMetric, SimilarityIndex};
    use crate::transform::UserItemMatrix;
    use ndarray::array;

    fn store(dir: &Path) -> ArtifactStore {
        let data = DataSettings {
            ratings_file: dir.join("ratings.csv"),
            books_file: dir.join("books.csv"),
            users_file: dir.join("users.csv"),
        };
        ArtifactStore::new(dir.join("artifacts"), data).unwrap()
    }

    #[test]
    fn test_index_artifact_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let matrix = UserItemMatrix::new(
            vec!["Alpha".into(), "Beta".into()],
            vec![10, 20, 30],
            array![[0.1, 7.0, 0.0], [1.0 / 3.0, 2.5, 10.0]],
        )
        .unwrap();
        let index = SimilarityIndex::build(matrix.clone(), DistanceMetric::Cosine).unwrap();

        store.save_artifact("book_pivot", &matrix).unwrap();
        store.save_artifact("model", &index).unwrap();

        assert!(store.exists("model"));
        assert_eq!(store.load_artifact::<UserItemMatrix>("book_pivot").unwrap(), matrix);
        assert_eq!(store.load_artifact::<SimilarityIndex>("model").unwrap(), index);
        assert!(!dir.path().join("artifacts/model.json.tmp").exists());
    }

    #[test]
    fn test_save_replaces_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.save_artifact("book_names", &vec!["Old"]).unwrap();
        store.save_artifact("book_names", &vec!["New", "Newer"]).unwrap();

        let names: Vec<String> = store.load_artifact("book_names").unwrap();
        assert_eq!(names, vec!["New", "Newer"]);
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = store(dir.path()).load_artifact::<Vec<String>>("model").unwrap_err();
        assert!(matches!(err, RecommenderError::NotFound(_)));
    }

    #[test]
    fn test_load_table_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("users.csv"), "\"User-ID\";\"Location\"\n\"1\";\"nyc, new york, usa\"\n")
            .unwrap();
        let store = store(dir.path());

        let users = store.load_table(USERS_TABLE).unwrap();
        assert_eq!(users.name, "users");
        assert_eq!(users.len(), 1);

        assert!(matches!(
            store.load_table(RATINGS_TABLE),
            Err(RecommenderError::NotFound(_))
        ));
        assert!(matches!(
            store.load_table("reviews"),
            Err(RecommenderError::NotFound(_))
        ));
    }
}
