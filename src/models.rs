//! Domain model that mirrors the `books` table. The struct stays a plain data
//! holder so the store and the form controller can pass it around freely.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the `books` table.
pub struct Book {
    /// Primary key assigned by SQLite. Never reused after a delete because the
    /// column is declared `AUTOINCREMENT`.
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Stored as nullable text; `NULL` reads back as an empty string.
    pub genre: String,
    /// Stored as a nullable integer. Rows written through the form always
    /// carry a year.
    pub year_published: Option<i64>,
}

impl Book {
    /// Year rendered the way the form field expects it (empty when absent).
    pub fn year_text(&self) -> String {
        self.year_published
            .map(|year| year.to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for Book {
    /// Render the list line as `(id, title, author, genre, year_published)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.id,
            self.title,
            self.author,
            self.genre,
            self.year_text()
        )
    }
}
