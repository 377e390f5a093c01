use log::info;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use super::types::{MergedRatingRow, UserId};
use crate::errors::{RecommenderError, Result};

/// Ratings laid out with one row per title and one column per user.
///
/// Rows keep the order in which titles were first seen while pivoting, so
/// `titles()[i]` always labels `values().row(i)`. Unrated cells hold 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserItemMatrix {
    titles: Vec<String>,
    user_ids: Vec<UserId>,
    values: Array2<f64>,
}

impl UserItemMatrix {
    pub fn new(titles: Vec<String>, user_ids: Vec<UserId>, values: Array2<f64>) -> Result<Self> {
        if values.dim() != (titles.len(), user_ids.len()) {
            return Err(RecommenderError::schema(
                "matrix",
                format!(
                    "shape {:?} does not match {} titles x {} users",
                    values.dim(),
                    titles.len(),
                    user_ids.len()
                ),
            ));
        }

        let mut distinct = HashSet::new();
        if let Some(dup) = titles.iter().find(|t| !distinct.insert(t.as_str())) {
            return Err(RecommenderError::schema(
                "matrix",
                format!("duplicate row label '{}'", dup),
            ));
        }

        Ok(Self {
            titles,
            user_ids,
            values,
        })
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.values.row(idx)
    }

    pub fn n_rows(&self) -> usize {
        self.titles.len()
    }

    pub fn n_cols(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Pivot merged rows into a title x user matrix.
///
/// When a user rated several ISBNs that share a title the first rating is
/// kept. Rows follow first-seen title order and columns first-seen user
/// order.
pub fn pivot(rows: &[MergedRatingRow]) -> UserItemMatrix {
    let mut titles: Vec<String> = Vec::new();
    let mut title_idx: HashMap<&str, usize> = HashMap::new();
    let mut user_ids: Vec<UserId> = Vec::new();
    let mut user_idx: HashMap<UserId, usize> = HashMap::new();
    let mut cells: HashMap<(usize, usize), f64> = HashMap::new();

    for row in rows {
        let r = *title_idx.entry(row.title.as_str()).or_insert_with(|| {
            titles.push(row.title.clone());
            titles.len() - 1
        });
        let c = *user_idx.entry(row.user_id).or_insert_with(|| {
            user_ids.push(row.user_id);
            user_ids.len() - 1
        });

        if let Entry::Vacant(cell) = cells.entry((r, c)) {
            cell.insert(row.rating);
        }
    }

    let mut values = Array2::<f64>::zeros((titles.len(), user_ids.len()));
    for ((r, c), rating) in cells {
        values[[r, c]] = rating;
    }

    info!(
        "Created pivot table: {} titles x {} users",
        titles.len(),
        user_ids.len()
    );

    UserItemMatrix {
        titles,
        user_ids,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn row(user_id: i64, title: &str, rating: f64) -> MergedRatingRow {
        MergedRatingRow {
            user_id,
            isbn: format!("isbn-{title}"),
            title: title.to_string(),
            rating,
        }
    }

    #[test]
    fn test_rows_in_first_seen_order() {
        let rows = vec![row(5, "Zebra", 1.0), row(3, "Apple", 2.0), row(5, "Mango", 3.0)];
        let matrix = pivot(&rows);

        assert_eq!(matrix.titles(), &["Zebra", "Apple", "Mango"]);
        assert_eq!(matrix.user_ids(), &[5, 3]);
    }

    #[test]
    fn test_missing_cells_are_zero() {
        let rows = vec![row(1, "Alpha", 8.0), row(2, "Beta", 6.0), row(2, "Alpha", 4.0)];
        let matrix = pivot(&rows);

        assert_eq!(matrix.values(), &array![[8.0, 4.0], [0.0, 6.0]]);
        assert!(matrix.values().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_first_rating_wins_for_duplicate_pair() {
        let rows = vec![row(1, "Alpha", 8.0), row(1, "Alpha", 2.0)];
        let matrix = pivot(&rows);

        assert_eq!(matrix.n_rows(), 1);
        assert_eq!(matrix.values()[[0, 0]], 8.0);
    }

    #[test]
    fn test_empty_input_gives_empty_matrix() {
        let matrix = pivot(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.n_cols(), 0);
    }

    #[test]
    fn test_new_rejects_duplicate_titles() {
        let err = UserItemMatrix::new(
            vec!["A".into(), "A".into()],
            vec![1],
            array![[1.0], [2.0]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate row label"));
    }

    #[test]
    fn test_new_rejects_shape_mismatch() {
        assert!(UserItemMatrix::new(vec!["A".into()], vec![1, 2], array![[1.0]]).is_err());
    }
}
