//! Submission controller: image selection, preview, roast level and the one
//! outbound request.
//!
//! File reads and preview reads are asynchronous and may finish out of
//! order. A pick or drop reserves its sequence number up front with
//! [`SubmissionController::begin_intake`]; a file arriving for an intake older
//! than the current selection is discarded. Every selection then hands out a
//! [`PreviewTicket`] carrying the same number, and a preview is only applied
//! if its ticket still names the current selection. The latest *selection*
//! wins, not the latest *completion*.

use crate::client::AnalysisService;
use crate::error::{AppError, Result};
use crate::image_processing::ImageProcessor;
use crate::lifecycle::LifecycleEvent;
use crate::model::{AnalysisRequest, ImageFile, Preview, RoastLevel, SelectedImage};

/// Surfaced when the picker hands over a non-image file.
pub const INVALID_IMAGE_MESSAGE: &str = "Please select a valid image file";

/// Handle for one outstanding preview read.
#[derive(Debug, Clone)]
pub struct PreviewTicket {
    seq: u64,
    file: ImageFile,
}

impl PreviewTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// A finished preview read, tagged with the selection it belongs to.
#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    pub seq: u64,
    pub preview: Preview,
}

/// Derives the preview for a ticket on the blocking pool.
pub async fn load_preview(ticket: PreviewTicket) -> PreviewOutcome {
    let PreviewTicket { seq, file } = ticket;
    let preview = match tokio::task::spawn_blocking({
        let file = file.clone();
        move || ImageProcessor::derive_preview(&file)
    })
    .await
    {
        Ok(preview) => preview,
        Err(e) => {
            tracing::warn!(seq, error = %e, "preview task aborted, deriving inline");
            ImageProcessor::derive_preview(&file)
        }
    };

    PreviewOutcome { seq, preview }
}

/// Performs the single outbound call for a request.
///
/// Never retries. Any failure becomes [`LifecycleEvent::Failed`] with the
/// message the user should see.
pub async fn dispatch<S: AnalysisService>(
    service: &S,
    request: AnalysisRequest,
) -> LifecycleEvent {
    match service.analyze(request).await {
        Ok(result) => {
            tracing::info!(request_id = %result.request_id, "analysis succeeded");
            LifecycleEvent::ResultReady(result)
        }
        Err(e) => {
            tracing::info!(error = %e, "analysis failed");
            LifecycleEvent::Failed(e.user_message())
        }
    }
}

/// Owns everything the upload form edits.
#[derive(Debug, Default)]
pub struct SubmissionController {
    selected: Option<SelectedImage>,
    roast_level: RoastLevel,
    notice: Option<String>,
    // Both survive reset() so tickets and intakes from before it stay stale.
    last_seq: u64,
    intake_floor: u64,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the sequence number for a pick or drop whose file is still
    /// being read.
    pub fn begin_intake(&mut self) -> u64 {
        self.last_seq += 1;
        self.last_seq
    }

    /// Whether a later selection, or a reset, has overtaken `intake`.
    fn is_superseded(&self, intake: u64) -> bool {
        intake <= self.intake_floor || self.selected.as_ref().is_some_and(|s| s.seq() > intake)
    }

    /// Selects a file from the picker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] if the declared content type is not
    /// an image type. The prior selection and preview are left untouched.
    pub fn select_image(&mut self, file: ImageFile) -> Result<PreviewTicket> {
        let intake = self.begin_intake();
        self.check_picked(&file)?;
        Ok(self.replace_selection(intake, file))
    }

    /// Completes a picker intake started with [`Self::begin_intake`].
    ///
    /// Returns `Ok(None)` when a later selection already won; such a file is
    /// dropped without a notice even if it is not an image.
    ///
    /// # Errors
    ///
    /// Same as [`Self::select_image`].
    pub fn complete_pick(&mut self, intake: u64, file: ImageFile) -> Result<Option<PreviewTicket>> {
        if self.is_superseded(intake) {
            tracing::debug!(intake, name = file.name(), "discarded superseded pick");
            return Ok(None);
        }
        self.check_picked(&file)?;
        Ok(Some(self.replace_selection(intake, file)))
    }

    fn check_picked(&mut self, file: &ImageFile) -> Result<()> {
        if file.is_image() {
            return Ok(());
        }
        tracing::debug!(
            name = file.name(),
            content_type = file.content_type(),
            "rejected non-image selection"
        );
        self.notice = Some(INVALID_IMAGE_MESSAGE.to_string());
        Err(AppError::invalid_input(INVALID_IMAGE_MESSAGE))
    }

    /// Selects a file dropped onto the upload area.
    ///
    /// Non-image drops are ignored without a notice, unlike the picker.
    pub fn select_via_drop(&mut self, file: ImageFile) -> Option<PreviewTicket> {
        let intake = self.begin_intake();
        self.complete_drop(intake, file)
    }

    /// Completes a drop intake started with [`Self::begin_intake`].
    ///
    /// Returns `None` for non-images and for drops a later selection has
    /// overtaken.
    pub fn complete_drop(&mut self, intake: u64, file: ImageFile) -> Option<PreviewTicket> {
        if self.is_superseded(intake) {
            tracing::debug!(intake, name = file.name(), "discarded superseded drop");
            return None;
        }
        if !file.is_image() {
            tracing::debug!(
                name = file.name(),
                content_type = file.content_type(),
                "ignored non-image drop"
            );
            return None;
        }

        Some(self.replace_selection(intake, file))
    }

    fn replace_selection(&mut self, seq: u64, file: ImageFile) -> PreviewTicket {
        tracing::debug!(seq, name = file.name(), "image selected");

        self.selected = Some(SelectedImage::new(file.clone(), seq));
        self.notice = None;
        PreviewTicket { seq, file }
    }

    /// Applies a finished preview read.
    ///
    /// Returns `false` (and drops the preview) when a later selection has
    /// superseded the one the read was issued for.
    pub fn apply_preview(&mut self, outcome: PreviewOutcome) -> bool {
        match self.selected.as_mut() {
            Some(selected) if selected.seq() == outcome.seq => {
                selected.set_preview(outcome.preview);
                true
            }
            _ => {
                tracing::debug!(seq = outcome.seq, "dropped superseded preview");
                false
            }
        }
    }

    pub fn set_roast_level(&mut self, level: RoastLevel) {
        self.roast_level = level;
    }

    pub fn roast_level(&self) -> RoastLevel {
        self.roast_level
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.selected.as_ref().and_then(SelectedImage::preview)
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        self.selected.is_some()
    }

    /// Local error text currently shown under the form.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Builds the request for the current selection and level.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoImageSelected`] when nothing is selected.
    pub fn submit(&mut self) -> Result<AnalysisRequest> {
        let Some(selected) = self.selected.as_ref() else {
            let err = AppError::NoImageSelected;
            self.notice = Some(err.to_string());
            return Err(err);
        };

        Ok(AnalysisRequest::new(selected.file().clone(), self.roast_level))
    }

    /// Back to a blank form. The sequence counter is kept and every intake
    /// begun so far becomes stale.
    pub fn reset(&mut self) {
        self.intake_floor = self.last_seq;
        self.selected = None;
        self.roast_level = RoastLevel::default();
        self.notice = None;
    }
}
