pub mod metric;
pub mod similarity;
pub mod types;

pub use metric::DistanceMetric;
pub use similarity::SimilarityIndex;
pub use types::Neighbor;
