//! Desktop front end for judgy.
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`state`]: Background messages and per-frame user actions
//! - [`upload`]: File picker and drag-and-drop intake
//! - [`rendering`]: Drawing helpers for the form, progress, error and result views
//! - [`app`]: The `eframe::App` that ties them to the [`Coordinator`](crate::Coordinator)
//!
//! # Usage
//!
//! ```ignore
//! use judgy_core::{ui, Config};
//!
//! #[tokio::main]
//! async fn main() -> judgy_core::Result<()> {
//!     ui::run_roast_ui(Config::load()?)
//! }
//! ```

mod app;
mod rendering;
mod state;
mod upload;

// Public API exports
pub use app::RoastApp;
pub use upload::{PICKER_EXTENSIONS, declared_content_type};

use crate::config::Config;
use crate::error::Result;

/// Opens the roast window and blocks until it is closed.
///
/// Must be called from within a tokio runtime.
pub fn run_roast_ui(config: Config) -> Result<()> {
    app::run(config)
}
