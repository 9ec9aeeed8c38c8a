//! The four editable text fields behind the book form, plus the checks that
//! run before anything is written to the store.

use thiserror::Error;

use crate::models::Book;

/// Reasons an action is refused before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("Published Year must contain digits only.")]
    InvalidYear,
    #[error("Please select a book to {0}.")]
    NoSelection(&'static str),
}

impl ValidationError {
    /// Dialog title shown alongside the message.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) | ValidationError::InvalidYear => "Input Error",
            ValidationError::NoSelection(_) => "Selection Error",
        }
    }
}

/// Fields available within the form, in focus order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Genre,
    Year,
}

impl BookField {
    pub const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Author,
        BookField::Genre,
        BookField::Year,
    ];

    /// Label printed in front of the input.
    pub fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title of The Book",
            BookField::Author => "Author Name",
            BookField::Genre => "Category",
            BookField::Year => "Published Year",
        }
    }
}

/// Raw text of the four inputs. Nothing is parsed until `parse_inputs`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: String,
}

/// Field values that passed validation and can go straight to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year_published: i64,
}

impl BookForm {
    /// Overwrite every field with the contents of a stored row.
    pub fn load(&mut self, book: &Book) {
        self.title = book.title.clone();
        self.author = book.author.clone();
        self.genre = book.genre.clone();
        self.year = book.year_text();
    }

    pub fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Genre => &self.genre,
            BookField::Year => &self.year,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Genre => &mut self.genre,
            BookField::Year => &mut self.year,
        }
    }

    /// Append a character to a field. Control characters are rejected.
    pub fn push_char(&mut self, field: BookField, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(field).push(ch);
        true
    }

    /// Remove the last character from a field.
    pub fn backspace(&mut self, field: BookField) {
        self.value_mut(field).pop();
    }

    /// Character count for cursor placement.
    pub fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }

    /// Check the inputs and return typed values. Text is handed on verbatim;
    /// only an empty field counts as missing.
    pub fn parse_inputs(&self) -> Result<ValidBook, ValidationError> {
        for field in [BookField::Title, BookField::Author, BookField::Genre] {
            if self.value(field).is_empty() {
                return Err(ValidationError::MissingField(field.label()));
            }
        }

        if self.year.is_empty() || !self.year.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ValidationError::InvalidYear);
        }
        let year_published = self
            .year
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidYear)?;

        Ok(ValidBook {
            title: self.title.clone(),
            author: self.author.clone(),
            genre: self.genre.clone(),
            year_published,
        })
    }
}
