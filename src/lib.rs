//! Library surface for the book manager. The binary only wires these pieces
//! together; tests drive the store and the controller directly.
pub mod config;
pub mod controller;
pub mod db;
pub mod form;
pub mod logging;
pub mod models;
pub mod ui;

pub use config::AppConfig;
pub use controller::{FormController, Notice, NoticeKind};
pub use db::BookStore;
pub use form::{BookField, BookForm, ValidationError};
pub use logging::init_tracing;
pub use models::Book;
pub use ui::{run_app, App};
