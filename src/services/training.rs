use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::AppConfig;
use crate::database::{self, setup};
use crate::index::{DistanceMetric, SimilarityIndex};
use crate::services::recommendation::{open_catalog, Deployment};
use crate::store::{ArtifactStore, BOOKS_TABLE, RATINGS_TABLE, USERS_TABLE};
use crate::table::RawTable;
use crate::transform::{BookRecord, TransformSummary, Transformer};

pub const BOOK_PIVOT_ARTIFACT: &str = "book_pivot";
pub const BOOK_NAMES_ARTIFACT: &str = "book_names";
pub const MODEL_ARTIFACT: &str = "model";
pub const SUMMARY_ARTIFACT: &str = "training_summary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub trained_at: DateTime<Utc>,
    pub metric: DistanceMetric,
    pub transform: TransformSummary,
    pub catalog_books: usize,
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub index: SimilarityIndex,
    pub summary: TrainingSummary,
}

pub struct TrainingService {
    config: AppConfig,
    store: ArtifactStore,
}

impl TrainingService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = ArtifactStore::new(&config.artifacts_dir, config.data.clone())?;
        Ok(Self { config, store })
    }

    pub fn run(&self) -> Result<TrainingOutcome> {
        info!("=== Starting Training ===\n");

        // Step 1: Load raw tables
        let (ratings, books, users) = self.load_tables()?;
        info!("  → Loaded raw tables\n");

        // Step 2: Clean, filter, merge and pivot
        let transformation = Transformer::new(self.config.transformation.clone())
            .run(&ratings, &books, &users)
            .context("Data transformation failed")?;
        info!(
            "  → Pivot table has {} titles x {} users\n",
            transformation.matrix.n_rows(),
            transformation.matrix.n_cols()
        );

        // Step 3: Build the index before anything is written
        let index = SimilarityIndex::build_bounded(
            transformation.matrix,
            self.config.model.metric,
            self.config.model.max_cells,
        )
        .context("Failed to build similarity index")?;
        info!("  → Built {} index\n", index.metric().as_str());

        // Step 4: Persist the catalog, then the model that depends on it
        let catalog_books = self.write_catalog(&transformation.books)?;
        info!("  → Wrote {} catalog entries\n", catalog_books);
        self.save_artifacts(&index)?;

        let summary = TrainingSummary {
            trained_at: Utc::now(),
            metric: index.metric(),
            transform: transformation.summary,
            catalog_books,
        };
        self.store.save_artifact(SUMMARY_ARTIFACT, &summary)?;

        info!("=== Training Complete ===");
        Ok(TrainingOutcome { index, summary })
    }

    /// Train and open the fresh catalog, ready to be swapped in
    pub fn deploy(&self) -> Result<Deployment> {
        let outcome = self.run()?;
        let catalog = open_catalog(&self.config.catalog_path())?;
        Ok(Deployment::new(outcome.index, catalog))
    }

    fn load_tables(&self) -> Result<(RawTable, RawTable, RawTable)> {
        let ratings = self.store.load_table(RATINGS_TABLE)?;
        let books = self.store.load_table(BOOKS_TABLE)?;
        let users = self.store.load_table(USERS_TABLE)?;
        Ok((ratings, books, users))
    }

    fn save_artifacts(&self, index: &SimilarityIndex) -> Result<()> {
        let matrix = index.matrix()?;
        self.store.save_artifact(BOOK_PIVOT_ARTIFACT, matrix)?;
        self.store.save_artifact(BOOK_NAMES_ARTIFACT, &matrix.titles())?;
        // Last, so a restart never loads a model whose catalog was not written
        self.store.save_artifact(MODEL_ARTIFACT, index)?;
        Ok(())
    }

    fn write_catalog(&self, books: &[BookRecord]) -> Result<usize> {
        let db_path = self.config.catalog_path();
        let temp_db_path = db_path.with_extension("db.tmp");
        info!(
            "Target catalog: {}, Temp catalog: {}",
            db_path.display(),
            temp_db_path.display()
        );

        // Clean up previous temp file if exists
        if temp_db_path.exists() {
            std::fs::remove_file(&temp_db_path)?;
        }

        let inserted = fill_catalog(&temp_db_path, books)?;

        // Atomic swap
        std::fs::rename(&temp_db_path, &db_path)?;
        info!("Successfully swapped catalog to {}", db_path.display());
        Ok(inserted)
    }
}

fn fill_catalog(db_path: &Path, books: &[BookRecord]) -> Result<usize> {
    let pool = database::create_pool(db_path)?;
    let mut conn = database::get_connection(&pool)?;

    setup::reset_database(&mut conn)?;
    database::books::insert_books(&mut conn, books)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{DataSettings, ModelSettings, TransformSettings};
    use crate::errors::RecommenderError;
    use std::fmt::Write as _;
    use std::fs;

    pub const USERS: i64 = 60;
    pub const FILLER_PER_USER: usize = 200;

    /// Every user rates Alpha, Beta and Gamma plus 200 books nobody else
    /// rated. Beta follows Alpha closely, Gamma runs the other way.
    pub fn write_fixture(dir: &Path) -> AppConfig {
        let mut ratings = String::from("\"User-ID\";\"ISBN\";\"Book-Rating\"\n");
        let mut users = String::from("\"User-ID\";\"Location\";\"Age\"\n");

        for user in 1..=USERS {
            let alpha = 1 + user % 10;
            let beta = (alpha + 1).min(10);
            let gamma = 11 - alpha;
            writeln!(ratings, "\"{user}\";\"A\";\"{alpha}\"").unwrap();
            writeln!(ratings, "\"{user}\";\"B\";\"{beta}\"").unwrap();
            writeln!(ratings, "\"{user}\";\"G\";\"{gamma}\"").unwrap();
            for j in 0..FILLER_PER_USER {
                writeln!(ratings, "\"{user}\";\"F-{user}-{j}\";\"5\"").unwrap();
            }
            writeln!(users, "\"{user}\";\"warsaw, poland\";\"NULL\"").unwrap();
        }

        let books = "\"ISBN\";\"Book-Title\";\"Book-Author\";\"Year-Of-Publication\";\"Publisher\";\"Image-URL-L\"\n\
                     \"A\";\"Alpha\";\"Ann\";\"2001\";\"Pub\";\"http://images/a.jpg\"\n\
                     \"B\";\"Beta\";\"Bob\";\"2002\";\"Pub\";\"http://images/b.jpg\"\n\
                     \"G\";\"Gamma\";\"Gil\";\"2003\";\"Pub\";\"\"\n";

        fs::write(dir.join("ratings.csv"), ratings).unwrap();
        fs::write(dir.join("books.csv"), books).unwrap();
        fs::write(dir.join("users.csv"), users).unwrap();

        AppConfig {
            data: DataSettings {
                ratings_file: dir.join("ratings.csv"),
                books_file: dir.join("books.csv"),
                users_file: dir.join("users.csv"),
            },
            artifacts_dir: dir.join("artifacts"),
            transformation: TransformSettings {
                min_ratings_per_user: 200,
                min_ratings_per_book: 50,
            },
            model: ModelSettings {
                metric: DistanceMetric::Cosine,
                k_default: 5,
                max_cells: None,
            },
        }
    }

    #[test]
    fn test_training_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path());
        let service = TrainingService::new(config.clone()).unwrap();

        let outcome = service.run().unwrap();
        assert_eq!(outcome.index.titles().unwrap(), &["Alpha", "Beta", "Gamma"]);
        assert_eq!(outcome.summary.transform.matrix_rows, 3);
        assert_eq!(outcome.summary.transform.matrix_cols, USERS as usize);
        assert_eq!(outcome.summary.catalog_books, 3);

        let names: Vec<String> = service.store.load_artifact(BOOK_NAMES_ARTIFACT).unwrap();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);

        let model: SimilarityIndex = service.store.load_artifact(MODEL_ARTIFACT).unwrap();
        assert_eq!(model, outcome.index);

        assert!(config.catalog_path().exists());
        assert!(!config.catalog_path().with_extension("db.tmp").exists());
    }

    #[test]
    fn test_missing_table_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path());
        fs::remove_file(dir.path().join("books.csv")).unwrap();

        let err = TrainingService::new(config).unwrap().run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommenderError>(),
            Some(RecommenderError::NotFound(_))
        ));
    }

    #[test]
    fn test_failed_catalog_write_leaves_no_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path());
        // A directory in the way makes the final rename fail
        fs::create_dir_all(config.catalog_path()).unwrap();

        let service = TrainingService::new(config).unwrap();
        assert!(service.run().is_err());
        assert!(!service.store.exists(MODEL_ARTIFACT));
        assert!(!service.store.exists(BOOK_PIVOT_ARTIFACT));
    }

    #[test]
    fn test_thresholds_above_data_give_empty_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixture(dir.path());
        config.transformation.min_ratings_per_book = USERS as usize + 1;

        let err = TrainingService::new(config).unwrap().run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommenderError>(),
            Some(RecommenderError::EmptyMatrix)
        ));
    }
}
