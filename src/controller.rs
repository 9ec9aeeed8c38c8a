//! Form controller: owns the field values and the list snapshot, and turns
//! the three button presses into store calls. It knows nothing about the
//! terminal so every flow can be exercised against a temporary database.

use anyhow::Result;
use tracing::{debug, error};

use crate::db::BookStore;
use crate::form::{BookForm, ValidationError};
use crate::models::Book;

/// Severity of a dialog shown after an action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// Modal message produced by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Storage Error".to_string(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for Notice {
    fn from(err: ValidationError) -> Self {
        Self {
            kind: NoticeKind::Warning,
            title: err.title().to_string(),
            message: err.to_string(),
        }
    }
}

pub struct FormController {
    store: BookStore,
    form: BookForm,
    books: Vec<Book>,
    selected: Option<usize>,
}

impl FormController {
    /// Wrap a store with empty fields and an empty list. Call `refresh` to
    /// load the rows.
    pub fn new(store: BookStore) -> Self {
        Self {
            store,
            form: BookForm::default(),
            books: Vec::new(),
            selected: None,
        }
    }

    pub fn form(&self) -> &BookForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BookForm {
        &mut self.form
    }

    /// Rows as of the last refresh.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.selected.and_then(|idx| self.books.get(idx))
    }

    /// Replace the list with the current table contents. The selection is
    /// cleared; field contents are left alone.
    pub fn refresh(&mut self) -> Result<()> {
        self.books = self.store.list_all()?;
        self.selected = None;
        debug!(count = self.books.len(), "book list refreshed");
        Ok(())
    }

    /// Select a row and copy it into the fields. `None` or an out-of-range
    /// index clears the selection without touching the fields.
    pub fn select(&mut self, index: Option<usize>) {
        match index.and_then(|idx| self.books.get(idx).map(|book| (idx, book))) {
            Some((idx, book)) => {
                self.form.load(book);
                self.selected = Some(idx);
            }
            None => self.selected = None,
        }
    }

    /// Reload the list after a committed write. The write already happened, so
    /// a failed reload still reports it, alongside the reload error.
    fn refresh_after(&mut self, done: &str) -> Notice {
        match self.refresh() {
            Ok(()) => Notice::success(done),
            Err(err) => {
                error!(error = %format!("{err:#}"), "book list reload failed");
                self.selected = None;
                let cause = err
                    .chain()
                    .last()
                    .map(|cause| cause.to_string())
                    .unwrap_or_else(|| err.to_string());
                Notice {
                    kind: NoticeKind::Warning,
                    title: "Refresh Error".to_string(),
                    message: format!("{done} The book list could not be reloaded: {cause}"),
                }
            }
        }
    }

    /// Validate the fields and insert a new row.
    pub fn add(&mut self) -> Result<Notice> {
        let valid = match self.form.parse_inputs() {
            Ok(valid) => valid,
            Err(err) => return Ok(err.into()),
        };

        self.store.create(
            &valid.title,
            &valid.author,
            &valid.genre,
            valid.year_published,
        )?;
        Ok(self.refresh_after("Book added successfully!"))
    }

    /// Rewrite the selected row with the field values.
    pub fn update(&mut self) -> Result<Notice> {
        let Some(id) = self.selected_book().map(|book| book.id) else {
            return Ok(ValidationError::NoSelection("update").into());
        };
        let valid = match self.form.parse_inputs() {
            Ok(valid) => valid,
            Err(err) => return Ok(err.into()),
        };

        self.store.update(
            id,
            &valid.title,
            &valid.author,
            &valid.genre,
            valid.year_published,
        )?;
        Ok(self.refresh_after("Book updated successfully!"))
    }

    /// Remove the selected row. No confirmation and no field checks.
    pub fn delete(&mut self) -> Result<Notice> {
        let Some(id) = self.selected_book().map(|book| book.id) else {
            return Ok(ValidationError::NoSelection("delete").into());
        };

        self.store.delete(id)?;
        Ok(self.refresh_after("Book deleted successfully!"))
    }
}
