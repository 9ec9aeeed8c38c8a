//! Ratatui front-end for the book form: four inputs and three buttons on the
//! left, the stored books on the right, and modal dialogs for outcomes.

mod app;
mod helpers;
mod terminal;

pub use app::{Action, App};
pub use terminal::run_app;
