use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Distance between two rating vectors; smaller means more alike
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - cos(a, b)`
    #[default]
    Cosine,
    /// `1 - pearson(a, b)`, i.e. cosine distance of mean-centered vectors
    Correlation,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Correlation => "correlation",
        }
    }

    /// Map a row to a vector whose dot product with another prepared row
    /// gives `1 - distance`. Zero-norm rows map to the zero vector.
    pub fn prepare(&self, row: ArrayView1<f64>) -> Array1<f64> {
        let mut v = row.to_owned();

        if *self == DistanceMetric::Correlation {
            let mean = v.mean().unwrap_or(0.0);
            v.mapv_inplace(|x| x - mean);
        }

        let norm = v.dot(&v).sqrt();
        if norm > 0.0 {
            v.mapv_inplace(|x| x / norm);
        } else {
            v.fill(0.0);
        }
        v
    }

    pub fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        prepared_distance(self.prepare(a).view(), self.prepare(b).view())
    }
}

/// Distance between two rows already passed through [`DistanceMetric::prepare`]
pub fn prepared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    (1.0 - a.dot(&b)).clamp(0.0, 2.0)
}
