//! Messages and actions passed around the UI.

use crate::controller::PreviewOutcome;
use crate::error::Result;
use crate::lifecycle::LifecycleEvent;
use crate::model::{ImageFile, RoastLevel};
use std::path::PathBuf;

/// Results of background work, delivered to the UI thread over a channel.
pub(crate) enum AppMessage {
    /// The file picker closed; `None` if it was dismissed.
    PickerClosed(Option<PathBuf>),
    /// A picked file was read for the given intake.
    FilePicked { intake: u64, file: Result<ImageFile> },
    /// A dropped file was read for the given intake.
    FileDropped { intake: u64, file: Result<ImageFile> },
    /// A preview read finished.
    PreviewReady(PreviewOutcome),
    /// The outbound request finished.
    Lifecycle(LifecycleEvent),
}

/// Something the user asked for during this frame.
///
/// Views only borrow the coordinator, so they report actions and the app
/// applies them once drawing is done.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UiAction {
    PickFile,
    SetRoastLevel(RoastLevel),
    Submit,
    Reset,
    CopyRoast(String),
}
