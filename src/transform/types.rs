use serde::{Deserialize, Serialize};

pub type UserId = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    pub user_id: UserId,
    pub isbn: String,
    pub rating: f64,
}

/// Catalog metadata for one ISBN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub isbn: String,
    pub title: String,
    pub author: Option<String>,
    pub year: Option<String>,
    pub publisher: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub location: Option<String>,
    pub age: Option<u32>,
}

/// A rating joined with the title of the book it refers to
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRatingRow {
    pub user_id: UserId,
    pub isbn: String,
    pub title: String,
    pub rating: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedTables {
    pub ratings: Vec<RatingRecord>,
    pub books: Vec<BookRecord>,
    pub users: Vec<UserRecord>,
}

/// Row counts after each stage of a transformation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformSummary {
    pub raw_ratings: usize,
    pub raw_books: usize,
    pub raw_users: usize,
    pub clean_ratings: usize,
    pub clean_books: usize,
    pub clean_users: usize,
    pub active_user_ratings: usize,
    pub popular_book_ratings: usize,
    pub merged_rows: usize,
    pub matrix_rows: usize,
    pub matrix_cols: usize,
}
