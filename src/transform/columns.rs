use std::collections::HashMap;

use crate::errors::{RecommenderError, Result};
use crate::table::RawTable;

pub const USER_ID: &str = "user_id";
pub const ISBN: &str = "isbn";
pub const RATING: &str = "rating";
pub const TITLE: &str = "title";
pub const AUTHOR: &str = "author";
pub const YEAR: &str = "year";
pub const PUBLISHER: &str = "publisher";
pub const IMAGE_URL: &str = "image_url";
pub const LOCATION: &str = "location";
pub const AGE: &str = "age";

/// Map a raw header ("Book-Rating", "User-ID", ...) to its canonical name.
/// Unknown headers come back lower-cased with punctuation stripped.
pub fn canonical_column(header: &str) -> String {
    let squashed: String = header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    let canonical = match squashed.as_str() {
        "userid" => USER_ID,
        "isbn" => ISBN,
        "bookrating" | "rating" => RATING,
        "booktitle" | "title" => TITLE,
        "bookauthor" | "author" => AUTHOR,
        "yearofpublication" | "year" => YEAR,
        "publisher" => PUBLISHER,
        "imageurll" | "imageurl" => IMAGE_URL,
        "location" => LOCATION,
        "age" => AGE,
        _ => return squashed,
    };
    canonical.to_string()
}

/// Canonical column name -> position, first occurrence wins
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(table: &RawTable) -> Self {
        let mut positions = HashMap::new();
        for (idx, header) in table.headers.iter().enumerate() {
            positions.entry(canonical_column(header)).or_insert(idx);
        }
        Self { positions }
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn require(&self, table: &RawTable, column: &str) -> Result<usize> {
        self.get(column).ok_or_else(|| {
            RecommenderError::schema(
                &table.name,
                format!(
                    "required column '{}' is missing (found: {})",
                    column,
                    table.headers.join(", ")
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_crossing_headers() {
        assert_eq!(canonical_column("User-ID"), USER_ID);
        assert_eq!(canonical_column("ISBN"), ISBN);
        assert_eq!(canonical_column("Book-Rating"), RATING);
        assert_eq!(canonical_column("Book-Title"), TITLE);
        assert_eq!(canonical_column("Year-Of-Publication"), YEAR);
        assert_eq!(canonical_column("Image-URL-L"), IMAGE_URL);
    }

    #[test]
    fn test_already_canonical_and_unknown_headers() {
        assert_eq!(canonical_column("user_id"), USER_ID);
        assert_eq!(canonical_column(" Title "), TITLE);
        assert_eq!(canonical_column("Image-URL-S"), "imageurls");
    }

    #[test]
    fn test_first_matching_header_wins() {
        let table = RawTable::from_rows("books", &["ISBN", "Book-Title", "title"], &[]);
        let columns = ColumnIndex::new(&table);
        assert_eq!(columns.get(TITLE), Some(1));
    }
}
