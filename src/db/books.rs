use anyhow::{Context, Result};
use rusqlite::params;
use tracing::{info, warn};

use super::connection::BookStore;
use crate::models::Book;

impl BookStore {
    /// Insert a new book. Values are stored verbatim; validation belongs to
    /// the form. The hydrated row is returned so callers can log the new id.
    pub fn create(
        &self,
        title: &str,
        author: &str,
        genre: &str,
        year_published: i64,
    ) -> Result<Book> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO books (title, author, genre, year_published) VALUES (?1, ?2, ?3, ?4)",
            params![title, author, genre, year_published],
        )
        .context("failed to insert book")?;

        let id = conn.last_insert_rowid();
        info!(id, title, "book added");
        Ok(Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            year_published: Some(year_published),
        })
    }

    /// Every row in storage order. No sorting or filtering is applied.
    pub fn list_all(&self) -> Result<Vec<Book>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT id, title, author, genre, year_published FROM books")
            .context("failed to prepare book query")?;

        let books = stmt
            .query_map([], |row| {
                Ok(Book {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    author: row.get(2)?,
                    genre: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    year_published: row.get(4)?,
                })
            })
            .context("failed to load books")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect books")?;

        Ok(books)
    }

    /// Rewrite all four fields of the row keyed by `id`. Returns whether a row
    /// matched; a missing id is a silent no-op.
    pub fn update(
        &self,
        id: i64,
        title: &str,
        author: &str,
        genre: &str,
        year_published: i64,
    ) -> Result<bool> {
        let conn = self.connect()?;
        let updated = conn
            .execute(
                "UPDATE books SET title = ?1, author = ?2, genre = ?3, year_published = ?4 WHERE id = ?5",
                params![title, author, genre, year_published, id],
            )
            .context("failed to update book")?;

        if updated == 0 {
            warn!(id, "update matched no book");
        } else {
            info!(id, "book updated");
        }
        Ok(updated > 0)
    }

    /// Remove the row keyed by `id`. Returns whether a row matched; a missing
    /// id is a silent no-op.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let deleted = conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])
            .context("failed to delete book")?;

        if deleted == 0 {
            warn!(id, "delete matched no book");
        } else {
            info!(id, "book deleted");
        }
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, BookStore) {
        let dir = TempDir::new().unwrap();
        let store = BookStore::new(dir.path().join("library.db"));
        store.ensure_schema().unwrap();
        (dir, store)
    }

    #[test]
    fn dune_walkthrough() {
        let (_dir, store) = store();

        let added = store
            .create("Dune", "Frank Herbert", "Sci-Fi", 1965)
            .unwrap();
        assert_eq!(added.id, 1);
        assert_eq!(store.list_all().unwrap(), vec![added.clone()]);

        assert!(store
            .update(1, "Dune", "F. Herbert", "Sci-Fi", 1965)
            .unwrap());
        let books = store.list_all().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, 1);
        assert_eq!(books[0].author, "F. Herbert");

        assert!(store.delete(1).unwrap());
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn create_assigns_unique_ids_and_keeps_insertion_order() {
        let (_dir, store) = store();
        let first = store.create("Emma", "Jane Austen", "Novel", 1815).unwrap();
        let second = store
            .create("Neuromancer", "William Gibson", "Cyberpunk", 1984)
            .unwrap();
        let third = store.create("Emma", "Jane Austen", "Novel", 1815).unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.id, third.id);
        assert_ne!(second.id, third.id);

        let books = store.list_all().unwrap();
        let ids: Vec<i64> = books.iter().map(|book| book.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
        assert_eq!(books[1].title, "Neuromancer");
        assert_eq!(books[1].author, "William Gibson");
        assert_eq!(books[1].genre, "Cyberpunk");
        assert_eq!(books[1].year_published, Some(1984));
    }

    #[test]
    fn create_stores_values_verbatim() {
        let (_dir, store) = store();
        store.create("  spaced  ", "", "", 0).unwrap();

        let books = store.list_all().unwrap();
        assert_eq!(books[0].title, "  spaced  ");
        assert_eq!(books[0].author, "");
        assert_eq!(books[0].genre, "");
        assert_eq!(books[0].year_published, Some(0));
    }

    #[test]
    fn update_only_touches_matching_row() {
        let (_dir, store) = store();
        let keep = store.create("Emma", "Jane Austen", "Novel", 1815).unwrap();
        let change = store.create("Dune", "Frank Herbert", "Sci-Fi", 1965).unwrap();

        assert!(store
            .update(change.id, "Dune Messiah", "Frank Herbert", "Sci-Fi", 1969)
            .unwrap());

        let books = store.list_all().unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0], keep);
        assert_eq!(books[1].id, change.id);
        assert_eq!(books[1].title, "Dune Messiah");
        assert_eq!(books[1].year_published, Some(1969));
    }

    #[test]
    fn missing_ids_are_silent_noops() {
        let (_dir, store) = store();
        let existing = store.create("Emma", "Jane Austen", "Novel", 1815).unwrap();

        assert!(!store.update(99, "X", "Y", "Z", 1).unwrap());
        assert!(!store.delete(99).unwrap());

        assert_eq!(store.list_all().unwrap(), vec![existing]);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let (_dir, store) = store();
        let first = store.create("Emma", "Jane Austen", "Novel", 1815).unwrap();
        let second = store.create("Dune", "Frank Herbert", "Sci-Fi", 1965).unwrap();

        assert!(store.delete(second.id).unwrap());
        let third = store.create("Ubik", "Philip K. Dick", "Sci-Fi", 1969).unwrap();

        assert!(third.id > second.id);
        let ids: Vec<i64> = store.list_all().unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
    }

    #[test]
    fn null_columns_read_as_defaults() {
        let (_dir, store) = store();
        store
            .connect()
            .unwrap()
            .execute(
                "INSERT INTO books (title, author) VALUES ('Beowulf', 'Unknown')",
                [],
            )
            .unwrap();

        let books = store.list_all().unwrap();
        assert_eq!(books[0].genre, "");
        assert_eq!(books[0].year_published, None);
    }

    #[test]
    fn operations_fail_before_schema_exists() {
        let dir = TempDir::new().unwrap();
        let store = BookStore::new(dir.path().join("library.db"));

        assert!(store.list_all().is_err());
        assert!(store.create("Dune", "Frank Herbert", "Sci-Fi", 1965).is_err());
    }
}
