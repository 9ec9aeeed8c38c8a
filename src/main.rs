//! Binary entry point: read settings, open the log, make sure the book table
//! exists, load the list, and hand control to the terminal form.
use library_manager::{init_tracing, run_app, App, AppConfig, BookStore, FormController};
use tracing::info;

/// Any failure before the form appears (unreadable config, unwritable data
/// directory) is returned to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config)?;

    let store = BookStore::new(&config.database_path);
    store.ensure_schema()?;
    info!(path = %store.path().display(), "library opened");

    let mut controller = FormController::new(store);
    controller.refresh()?;

    let mut app = App::new(controller);
    run_app(&mut app)
}
