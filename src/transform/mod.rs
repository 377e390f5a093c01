pub mod clean;
pub mod columns;
pub mod filter;
pub mod merge;
pub mod pivot;
pub mod types;

pub use clean::clean;
pub use filter::{filter_active_users, filter_popular_books};
pub use merge::merge;
pub use pivot::{pivot, UserItemMatrix};
pub use types::{
    BookRecord, CleanedTables, MergedRatingRow, RatingRecord, TransformSummary, UserId, UserRecord,
};

use log::info;
use std::collections::HashMap;

use crate::config::settings::TransformSettings;
use crate::errors::Result;
use crate::table::RawTable;

/// Output of one transformation run
#[derive(Debug, Clone)]
pub struct Transformation {
    pub matrix: UserItemMatrix,
    /// One catalog entry per matrix row, in row order
    pub books: Vec<BookRecord>,
    pub summary: TransformSummary,
}

pub struct Transformer {
    settings: TransformSettings,
}

impl Transformer {
    pub fn new(settings: TransformSettings) -> Self {
        Self { settings }
    }

    /// Raw tables to user-item matrix.
    ///
    /// Users are filtered before books, so book popularity is counted over
    /// ratings from active users only.
    pub fn run(&self, ratings: &RawTable, books: &RawTable, users: &RawTable) -> Result<Transformation> {
        info!(
            "Shape of raw tables: {} ratings, {} books, {} users",
            ratings.len(),
            books.len(),
            users.len()
        );

        let cleaned = clean(ratings, books, users)?;
        let mut summary = TransformSummary {
            raw_ratings: ratings.len(),
            raw_books: books.len(),
            raw_users: users.len(),
            clean_ratings: cleaned.ratings.len(),
            clean_books: cleaned.books.len(),
            clean_users: cleaned.users.len(),
            ..Default::default()
        };

        let active = filter_active_users(cleaned.ratings, self.settings.min_ratings_per_user);
        summary.active_user_ratings = active.len();

        let popular = filter_popular_books(active, self.settings.min_ratings_per_book);
        summary.popular_book_ratings = popular.len();

        let merged = merge(&popular, &cleaned.books);
        summary.merged_rows = merged.len();

        let matrix = pivot(&merged);
        summary.matrix_rows = matrix.n_rows();
        summary.matrix_cols = matrix.n_cols();

        let books = catalog_for(&matrix, &cleaned.books);

        Ok(Transformation {
            matrix,
            books,
            summary,
        })
    }
}

// First catalog entry for each matrix title
fn catalog_for(matrix: &UserItemMatrix, books: &[BookRecord]) -> Vec<BookRecord> {
    let mut by_title: HashMap<&str, &BookRecord> = HashMap::new();
    for book in books {
        by_title.entry(book.title.as_str()).or_insert(book);
    }

    matrix
        .titles()
        .iter()
        .filter_map(|title| by_title.get(title.as_str()).map(|book| (*book).clone()))
        .collect()
}
