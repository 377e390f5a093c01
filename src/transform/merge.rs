use log::{debug, info};
use std::collections::HashMap;

use super::types::{BookRecord, MergedRatingRow, RatingRecord};

/// Inner join of ratings with the catalog on ISBN, in ratings order.
/// Ratings of ISBNs missing from the catalog are dropped.
pub fn merge(ratings: &[RatingRecord], books: &[BookRecord]) -> Vec<MergedRatingRow> {
    let titles_by_isbn: HashMap<&str, &str> = books
        .iter()
        .map(|book| (book.isbn.as_str(), book.title.as_str()))
        .collect();

    let merged: Vec<MergedRatingRow> = ratings
        .iter()
        .filter_map(|rating| {
            titles_by_isbn
                .get(rating.isbn.as_str())
                .map(|title| MergedRatingRow {
                    user_id: rating.user_id,
                    isbn: rating.isbn.clone(),
                    title: title.to_string(),
                    rating: rating.rating,
                })
        })
        .collect();

    debug!(
        "{} ratings had no catalog entry",
        ratings.len() - merged.len()
    );
    info!("Merged ratings with books: {} rows", merged.len());
    merged
}
