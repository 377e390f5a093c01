use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::CatalogBook;
use crate::transform::BookRecord;

const BOOK_COLUMNS: &str = "id, title, isbn, author, year, publisher, image_url, created_at";

/// Insert all books in one transaction
pub fn insert_books(conn: &mut DbConn, books: &[BookRecord]) -> Result<usize> {
    let tx = conn.transaction().context("Failed to start catalog transaction")?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO books (title, isbn, author, year, publisher, image_url) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for book in books {
            stmt.execute(params![
                book.title,
                book.isbn,
                book.author,
                book.year,
                book.publisher,
                book.image_url
            ])
            .with_context(|| format!("Failed to insert catalog entry for '{}'", book.title))?;
        }
    }
    tx.commit().context("Failed to commit catalog transaction")?;
    Ok(books.len())
}

pub fn find_by_title(conn: &mut DbConn, title: &str) -> Result<Option<CatalogBook>> {
    let sql = format!("SELECT {} FROM books WHERE title = ?1", BOOK_COLUMNS);

    conn.query_row(&sql, params![title], parse_book_row)
        .optional()
        .context("Failed to query book by title")
}

pub fn count_books(conn: &mut DbConn) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
        .context("Failed to count catalog books")
}

fn parse_book_row(row: &rusqlite::Row) -> rusqlite::Result<CatalogBook> {
    Ok(CatalogBook {
        id: row.get(0)?,
        title: row.get(1)?,
        isbn: row.get(2)?,
        author: row.get(3)?,
        year: row.get(4)?,
        publisher: row.get(5)?,
        image_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}
