use log::info;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::metric::{prepared_distance, DistanceMetric};
use super::types::Neighbor;
use crate::errors::{RecommenderError, Result};
use crate::transform::UserItemMatrix;

// Distances closer than this are ties; normalization leaves a few ulps of noise
const TIE_TOLERANCE: f64 = 1e-9;

/// Exact nearest-neighbor index over the rows of a [`UserItemMatrix`].
///
/// An index is either unbuilt or built; only [`SimilarityIndex::build`]
/// produces a built one and nothing turns it back. A built index is never
/// mutated, so it can be shared behind an `Arc` and replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityIndex {
    metric: DistanceMetric,
    state: IndexState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum IndexState {
    Unbuilt,
    Built(BuiltIndex),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BuiltIndex {
    matrix: UserItemMatrix,
    // row i of `matrix` passed through `metric.prepare`
    prepared: Array2<f64>,
    positions: HashMap<String, usize>,
}

impl SimilarityIndex {
    pub fn unbuilt(metric: DistanceMetric) -> Self {
        Self {
            metric,
            state: IndexState::Unbuilt,
        }
    }

    pub fn build(matrix: UserItemMatrix, metric: DistanceMetric) -> Result<Self> {
        Self::build_bounded(matrix, metric, None)
    }

    /// Like [`SimilarityIndex::build`], failing fast with `MatrixTooLarge`
    /// when `rows * cols` exceeds `max_cells`
    pub fn build_bounded(
        matrix: UserItemMatrix,
        metric: DistanceMetric,
        max_cells: Option<usize>,
    ) -> Result<Self> {
        if matrix.is_empty() {
            return Err(RecommenderError::EmptyMatrix);
        }

        let (rows, cols) = (matrix.n_rows(), matrix.n_cols());
        if let Some(max_cells) = max_cells {
            if rows.saturating_mul(cols) > max_cells {
                return Err(RecommenderError::MatrixTooLarge {
                    rows,
                    cols,
                    max_cells,
                });
            }
        }

        info!(
            "Building {} similarity index over {} titles x {} users",
            metric.as_str(),
            rows,
            cols
        );

        let mut prepared = Array2::<f64>::zeros((rows, cols));
        for (idx, mut target) in prepared.rows_mut().into_iter().enumerate() {
            target.assign(&metric.prepare(matrix.row(idx)));
        }

        let positions = matrix
            .titles()
            .iter()
            .enumerate()
            .map(|(idx, title)| (title.clone(), idx))
            .collect();

        Ok(Self {
            metric,
            state: IndexState::Built(BuiltIndex {
                matrix,
                prepared,
                positions,
            }),
        })
    }

    /// The `k` titles closest to `title`, nearest first.
    ///
    /// The query title itself is never part of the result. Equal distances
    /// keep matrix row order. Returns `min(k, len() - 1)` neighbors.
    pub fn query(&self, title: &str, k: usize) -> Result<Vec<Neighbor>> {
        let built = self.built()?;
        let target_idx = *built
            .positions
            .get(title)
            .ok_or_else(|| RecommenderError::UnknownTitle(title.to_string()))?;
        let target = built.prepared.row(target_idx);

        let mut scored: Vec<(usize, f64)> = built
            .prepared
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| *idx != target_idx)
            .map(|(idx, row)| (idx, prepared_distance(target, row)))
            .collect();

        scored.sort_by(|a, b| tie_key(a.1).total_cmp(&tie_key(b.1)).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        let titles = built.matrix.titles();
        Ok(scored
            .into_iter()
            .map(|(idx, distance)| Neighbor {
                title: titles[idx].clone(),
                distance,
            })
            .collect())
    }

    pub fn is_built(&self) -> bool {
        matches!(self.state, IndexState::Built(_))
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn titles(&self) -> Result<&[String]> {
        Ok(self.built()?.matrix.titles())
    }

    pub fn matrix(&self) -> Result<&UserItemMatrix> {
        Ok(&self.built()?.matrix)
    }

    /// Number of indexed titles, zero when unbuilt
    pub fn len(&self) -> usize {
        match &self.state {
            IndexState::Built(built) => built.matrix.n_rows(),
            IndexState::Unbuilt => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn built(&self) -> Result<&BuiltIndex> {
        match &self.state {
            IndexState::Built(built) => Ok(built),
            IndexState::Unbuilt => Err(RecommenderError::NotBuilt),
        }
    }
}

fn tie_key(distance: f64) -> f64 {
    (distance / TIE_TOLERANCE).round()
}
