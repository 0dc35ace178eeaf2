//! Judgy Core Library
//!
//! Client for the judgy-buddy photo roasting service: pick a photo, choose
//! how hard to be roasted, and read the critique next to whatever analysis
//! the service chose to return.
//!
//! # Overview
//!
//! - **Lifecycle**: one top-level state (`Idle`, `Loading`, `Success`,
//!   `Error`) deciding which view is shown, in [`lifecycle`]
//! - **Submission**: selection, preview, roast level and the single request,
//!   in [`controller`]
//! - **Rendering**: result to display blocks, tolerant of any feature group
//!   being absent or unknown, in [`render`]
//! - **Transport**: multipart upload to the analysis endpoint, in [`client`]
//! - **User Interface**: egui window, in [`ui`]
//!
//! # Quick Start
//!
//! ```ignore
//! use judgy_core::{Judgy, RoastLevel};
//!
//! let judgy = Judgy::new()?;
//! let result = judgy.roast_file("me.jpg".as_ref(), RoastLevel::Savage).await?;
//! println!("{}", judgy_core::render(&result));
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod image_processing;
pub mod lifecycle;
pub mod model;
pub mod render;
pub mod ui;

// Re-export primary types for convenience
pub use client::{AnalysisService, HttpAnalysisClient};
pub use config::Config;
pub use controller::SubmissionController;
pub use error::{AppError, Result};
pub use lifecycle::{Coordinator, LifecycleEvent, LifecycleState, View};
pub use model::{AnalysisResult, FeatureSet, ImageFile, RoastLevel};
pub use render::{RenderedView, render};

use std::path::Path;

/// Main entry point for the judgy client.
///
/// Holds the configuration and the HTTP client, and offers both the
/// interactive window and a one-shot headless roast.
pub struct Judgy {
    config: Config,
    client: HttpAnalysisClient,
}

impl Judgy {
    /// Creates an instance from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `JUDGY_API_URL` is set but invalid.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        let client = HttpAnalysisClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// Opens the roast window. Blocks until it is closed.
    pub fn run_interactive(&self) -> Result<()> {
        ui::run_roast_ui(self.config.clone())
    }

    /// Roasts one file without a window.
    ///
    /// Drives the same lifecycle as the window: select, submit, dispatch.
    ///
    /// # Errors
    ///
    /// - [`AppError::Io`] if the file cannot be read
    /// - [`AppError::InvalidInput`] if it is not declared as an image
    /// - [`AppError::RequestFailed`] with the user-facing message if the
    ///   analysis fails
    pub async fn roast_file(&self, path: &Path, level: RoastLevel) -> Result<AnalysisResult> {
        let file = ImageFile::open(path).await?;
        roast_with(&self.client, file, level).await
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Runs one full lifecycle against any [`AnalysisService`].
pub async fn roast_with<S: AnalysisService>(
    service: &S,
    file: ImageFile,
    level: RoastLevel,
) -> Result<AnalysisResult> {
    let mut coordinator = Coordinator::new();
    {
        let controller = coordinator
            .controller_mut()
            .ok_or_else(|| AppError::ui("Coordinator did not start idle"))?;
        controller.select_image(file)?;
        controller.set_roast_level(level);
    }

    let request = coordinator.submit()?;
    let event = controller::dispatch(service, request).await;
    coordinator.handle(event);

    match coordinator.state() {
        LifecycleState::Success(result) => Ok(result.clone()),
        LifecycleState::Error(message) => Err(AppError::request_failed(message.clone())),
        other => Err(AppError::ui(format!("Unexpected state after dispatch: {}", other.name()))),
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
pub fn init() {
    let _ = dotenvy::dotenv();
}
