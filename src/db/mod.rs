//! Persistence layer: one SQLite table of books behind `BookStore`.

mod books;
mod connection;

pub use connection::BookStore;
