use serde::{Deserialize, Serialize};

/// A similar title and its distance from the queried one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub title: String,
    pub distance: f64,
}
