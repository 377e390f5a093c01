use log::{debug, info};
use std::collections::HashSet;

use super::columns::{self, ColumnIndex};
use super::types::{BookRecord, CleanedTables, RatingRecord, UserId, UserRecord};
use crate::errors::{RecommenderError, Result};
use crate::table::RawTable;

/// Validate, de-duplicate and type the three raw tables
pub fn clean(ratings: &RawTable, books: &RawTable, users: &RawTable) -> Result<CleanedTables> {
    let cleaned = CleanedTables {
        ratings: clean_ratings(ratings)?,
        books: clean_books(books)?,
        users: clean_users(users)?,
    };

    info!(
        "Cleaned tables: {} ratings, {} books, {} users",
        cleaned.ratings.len(),
        cleaned.books.len(),
        cleaned.users.len()
    );
    Ok(cleaned)
}

pub fn clean_ratings(table: &RawTable) -> Result<Vec<RatingRecord>> {
    let index = ColumnIndex::new(table);
    let user_col = index.require(table, columns::USER_ID)?;
    let isbn_col = index.require(table, columns::ISBN)?;
    let rating_col = index.require(table, columns::RATING)?;

    let mut seen: HashSet<(UserId, String)> = HashSet::new();
    let mut records = Vec::with_capacity(table.len());
    let mut incomplete = 0usize;

    for (idx, row) in table.rows.iter().enumerate() {
        let (Some(user), Some(isbn), Some(rating)) = (
            required_cell(row, user_col),
            required_cell(row, isbn_col),
            required_cell(row, rating_col),
        ) else {
            incomplete += 1;
            continue;
        };

        let user_id = parse_user_id(table, idx, user)?;
        let rating = parse_rating(table, idx, rating)?;

        if seen.insert((user_id, isbn.to_string())) {
            records.push(RatingRecord {
                user_id,
                isbn: isbn.to_string(),
                rating,
            });
        }
    }

    log_dropped(table, incomplete, records.len());
    Ok(records)
}

pub fn clean_books(table: &RawTable) -> Result<Vec<BookRecord>> {
    let index = ColumnIndex::new(table);
    let isbn_col = index.require(table, columns::ISBN)?;
    let title_col = index.require(table, columns::TITLE)?;
    let author_col = index.get(columns::AUTHOR);
    let year_col = index.get(columns::YEAR);
    let publisher_col = index.get(columns::PUBLISHER);
    let image_col = index.get(columns::IMAGE_URL);

    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::with_capacity(table.len());
    let mut incomplete = 0usize;

    for row in &table.rows {
        let (Some(isbn), Some(title)) = (required_cell(row, isbn_col), required_cell(row, title_col))
        else {
            incomplete += 1;
            continue;
        };

        if seen.insert(isbn.to_string()) {
            records.push(BookRecord {
                isbn: isbn.to_string(),
                title: title.to_string(),
                author: optional_cell(row, author_col),
                year: optional_cell(row, year_col),
                publisher: optional_cell(row, publisher_col),
                image_url: optional_cell(row, image_col),
            });
        }
    }

    log_dropped(table, incomplete, records.len());
    Ok(records)
}

pub fn clean_users(table: &RawTable) -> Result<Vec<UserRecord>> {
    let index = ColumnIndex::new(table);
    let user_col = index.require(table, columns::USER_ID)?;
    let location_col = index.get(columns::LOCATION);
    let age_col = index.get(columns::AGE);

    let mut seen: HashSet<UserId> = HashSet::new();
    let mut records = Vec::with_capacity(table.len());
    let mut incomplete = 0usize;

    for (idx, row) in table.rows.iter().enumerate() {
        let Some(user) = required_cell(row, user_col) else {
            incomplete += 1;
            continue;
        };

        let user_id = parse_user_id(table, idx, user)?;
        if seen.insert(user_id) {
            records.push(UserRecord {
                user_id,
                location: optional_cell(row, location_col),
                // Book-Crossing stores unknown ages as NULL
                age: optional_cell(row, age_col).and_then(|age| age.parse().ok()),
            });
        }
    }

    log_dropped(table, incomplete, records.len());
    Ok(records)
}

fn required_cell(row: &[String], column: usize) -> Option<&str> {
    RawTable::cell(row, column)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn optional_cell(row: &[String], column: Option<usize>) -> Option<String> {
    column
        .and_then(|col| required_cell(row, col))
        .filter(|value| !value.eq_ignore_ascii_case("null"))
        .map(str::to_string)
}

fn parse_user_id(table: &RawTable, row_idx: usize, value: &str) -> Result<UserId> {
    value
        .parse::<UserId>()
        .map_err(|_| malformed(table, row_idx, columns::USER_ID, value, "an integer"))
}

fn parse_rating(table: &RawTable, row_idx: usize, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(rating) if rating.is_finite() && rating >= 0.0 => Ok(rating),
        _ => Err(malformed(
            table,
            row_idx,
            columns::RATING,
            value,
            "a non-negative number",
        )),
    }
}

fn malformed(
    table: &RawTable,
    row_idx: usize,
    column: &str,
    value: &str,
    expected: &str,
) -> RecommenderError {
    // +2: one for the header line, one for 1-based numbering
    RecommenderError::schema(
        &table.name,
        format!(
            "line {}: column '{}' has value '{}', expected {}",
            row_idx + 2,
            column,
            value,
            expected
        ),
    )
}

fn log_dropped(table: &RawTable, incomplete: usize, kept: usize) {
    let duplicates = table.len() - incomplete - kept;
    debug!(
        "Table '{}': dropped {} incomplete and {} duplicate rows, kept {}",
        table.name, incomplete, duplicates, kept
    );
}
