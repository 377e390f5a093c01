use anyhow::Result;
use log::{info, warn};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{self, CatalogBook, DbPool};
use crate::errors::{self, RecommenderError};
use crate::index::{Neighbor, SimilarityIndex};
use crate::services::training::MODEL_ARTIFACT;
use crate::store::ArtifactStore;

/// A trained index together with the catalog written in the same run
#[derive(Debug)]
pub struct Deployment {
    pub index: SimilarityIndex,
    pub catalog: Option<DbPool>,
}

impl Deployment {
    pub fn new(index: SimilarityIndex, catalog: Option<DbPool>) -> Self {
        Self { index, catalog }
    }

    pub fn recommend(&self, title: &str, k: usize) -> errors::Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(RecommenderError::InvalidK);
        }
        self.index.query(title, k)
    }

    /// Catalog entry for `title`, `None` without a catalog
    pub fn book_details(&self, title: &str) -> Result<Option<CatalogBook>> {
        let Some(pool) = &self.catalog else {
            return Ok(None);
        };
        let mut conn = database::get_connection(pool)?;
        database::books::find_by_title(&mut conn, title)
    }
}

/// Serves recommendations from the current deployment.
///
/// Readers clone the `Arc` and query without holding the lock, so a
/// [`RecommendationService::replace`] never blocks behind a query and a
/// query never sees a half-replaced deployment.
pub struct RecommendationService {
    current: RwLock<Arc<Deployment>>,
}

impl RecommendationService {
    pub fn new(deployment: Deployment) -> Self {
        Self {
            current: RwLock::new(Arc::new(deployment)),
        }
    }

    /// Load the last trained model, or start unbuilt if there is none yet
    pub fn load(config: &AppConfig) -> Result<Self> {
        let store = ArtifactStore::new(&config.artifacts_dir, config.data.clone())?;

        let index = match store.load_artifact::<SimilarityIndex>(MODEL_ARTIFACT) {
            Ok(index) => {
                info!("Loaded model with {} titles", index.len());
                index
            }
            Err(RecommenderError::NotFound(what)) => {
                warn!("No trained model found ({}), run training first", what);
                SimilarityIndex::unbuilt(config.model.metric)
            }
            Err(e) => return Err(e.into()),
        };

        if index.is_built() && index.metric() != config.model.metric {
            warn!(
                "Model was trained with {} distance but config asks for {}; retrain to apply",
                index.metric().as_str(),
                config.model.metric.as_str()
            );
        }

        let catalog = open_catalog(&config.catalog_path())?;
        Ok(Self::new(Deployment::new(index, catalog)))
    }

    pub fn current(&self) -> Arc<Deployment> {
        self.current.read().clone()
    }

    /// The `k` titles most similar to `title`, as raw (title, distance) pairs
    pub fn recommend(&self, title: &str, k: usize) -> errors::Result<Vec<Neighbor>> {
        self.current().recommend(title, k)
    }

    pub fn titles(&self) -> errors::Result<Vec<String>> {
        Ok(self.current().index.titles()?.to_vec())
    }

    pub fn replace(&self, deployment: Deployment) {
        let titles = deployment.index.len();
        *self.current.write() = Arc::new(deployment);
        info!("Swapped in new model with {} titles", titles);
    }
}

/// Open the catalog database if training has written one
pub fn open_catalog(path: &Path) -> Result<Option<DbPool>> {
    if !path.exists() {
        warn!("No catalog at {}, recommendations will lack book details", path.display());
        return Ok(None);
    }
    Ok(Some(database::create_pool(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DistanceMetric;
    use crate::services::training::tests::write_fixture;
    use crate::services::training::TrainingService;
    use crate::transform::UserItemMatrix;
    use ndarray::array;

    fn built(titles: &[&str]) -> SimilarityIndex {
        let values = match titles.len() {
            2 => array![[1.0, 0.0], [0.9, 0.1]],
            _ => array![[1.0, 0.0], [0.9, 0.1], [0.0, 1.0]],
        };
        let matrix = UserItemMatrix::new(
            titles.iter().map(|t| t.to_string()).collect(),
            vec![1, 2],
            values,
        )
        .unwrap();
        SimilarityIndex::build(matrix, DistanceMetric::Cosine).unwrap()
    }

    #[test]
    fn test_alpha_is_closest_to_beta_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path());
        TrainingService::new(config.clone()).unwrap().run().unwrap();

        let service = RecommendationService::load(&config).unwrap();
        let top = service.recommend("Alpha", 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "Beta");

        let all = service.recommend("Alpha", 5).unwrap();
        let gamma = all.iter().find(|n| n.title == "Gamma").unwrap();
        assert!(top[0].distance < gamma.distance);

        let details = service.current().book_details("Beta").unwrap().unwrap();
        assert_eq!(details.author.as_deref(), Some("Bob"));
        assert_eq!(details.image_url.as_deref(), Some("http://images/b.jpg"));
    }

    #[test]
    fn test_starts_unbuilt_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path());

        let service = RecommendationService::load(&config).unwrap();
        assert!(matches!(
            service.recommend("Alpha", 1),
            Err(RecommenderError::NotBuilt)
        ));
        assert!(service.current().catalog.is_none());
    }

    #[test]
    fn test_zero_k_is_rejected() {
        let service = RecommendationService::new(Deployment::new(built(&["A", "B"]), None));
        assert!(matches!(service.recommend("A", 0), Err(RecommenderError::InvalidK)));
    }

    #[test]
    fn test_replace_keeps_in_flight_snapshot() {
        let service = RecommendationService::new(Deployment::new(built(&["A", "B"]), None));
        let snapshot = service.current();

        service.replace(Deployment::new(built(&["A", "B", "C"]), None));

        assert_eq!(snapshot.index.query("A", 5).unwrap().len(), 1);
        assert_eq!(service.recommend("A", 5).unwrap().len(), 2);
        assert_eq!(service.titles().unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_concurrent_readers_share_one_index() {
        let service = Arc::new(RecommendationService::new(Deployment::new(
            built(&["A", "B", "C"]),
            None,
        )));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || service.recommend("C", 2).unwrap())
            })
            .collect();

        let results: Vec<Vec<Neighbor>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
