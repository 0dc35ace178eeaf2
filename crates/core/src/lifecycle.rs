//! Lifecycle coordinator.
//!
//! The coordinator holds the single top-level state and decides which view
//! is presented:
//!
//! ```text
//! Idle --LoadingStarted--> Loading --ResultReady--> Success --ResetRequested--> Idle
//!                                  \--Failed------> Error   --ResetRequested--> Idle
//! ```
//!
//! Components never talk to each other; everything flows through
//! [`Coordinator::handle`]. Events without a transition from the current
//! state are ignored.

use crate::controller::{PreviewOutcome, SubmissionController};
use crate::error::{AppError, Result};
use crate::model::{AnalysisRequest, AnalysisResult};

/// Top-level UI state. Exactly one holds at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LifecycleState {
    #[default]
    Idle,
    Loading,
    Success(AnalysisResult),
    Error(String),
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }
}

/// Named events accepted by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    LoadingStarted,
    ResultReady(AnalysisResult),
    Failed(String),
    ResetRequested,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadingStarted => "loading-started",
            Self::ResultReady(_) => "result-ready",
            Self::Failed(_) => "failed",
            Self::ResetRequested => "reset-requested",
        }
    }
}

/// What the window shows for the current state. Mutually exclusive.
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    /// Upload form only.
    Submission(&'a SubmissionController),
    /// Progress indicator only.
    Progress,
    /// Error message plus a reset control.
    Failure(&'a str),
    /// Rendered result plus a reset control.
    Result(&'a AnalysisResult),
}

/// Owns the lifecycle state and the submission controller.
#[derive(Debug, Default)]
pub struct Coordinator {
    state: LifecycleState,
    controller: SubmissionController,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn view(&self) -> View<'_> {
        match &self.state {
            LifecycleState::Idle => View::Submission(&self.controller),
            LifecycleState::Loading => View::Progress,
            LifecycleState::Error(message) => View::Failure(message),
            LifecycleState::Success(result) => View::Result(result),
        }
    }

    /// The submission controller, reachable only while `Idle`.
    pub fn controller(&self) -> Option<&SubmissionController> {
        matches!(self.state, LifecycleState::Idle).then_some(&self.controller)
    }

    /// Mutable access to the controller, reachable only while `Idle`.
    pub fn controller_mut(&mut self) -> Option<&mut SubmissionController> {
        match self.state {
            LifecycleState::Idle => Some(&mut self.controller),
            _ => None,
        }
    }

    /// Routes a preview read to the controller.
    ///
    /// Accepted in every state: the selection is still owned while a request
    /// for it is in flight.
    pub fn apply_preview(&mut self, outcome: PreviewOutcome) -> bool {
        self.controller.apply_preview(outcome)
    }

    /// Starts a submission.
    ///
    /// The state moves to `Loading` before this returns, so a second call in
    /// the same frame fails with [`AppError::RequestInFlight`]. The caller
    /// dispatches the returned request and feeds the outcome to
    /// [`Coordinator::handle`].
    ///
    /// # Errors
    ///
    /// - [`AppError::RequestInFlight`] unless the state is `Idle`.
    /// - [`AppError::NoImageSelected`] when nothing is selected; the state
    ///   stays `Idle`.
    pub fn submit(&mut self) -> Result<AnalysisRequest> {
        if !matches!(self.state, LifecycleState::Idle) {
            tracing::debug!(state = self.state.name(), "submit rejected");
            return Err(AppError::RequestInFlight);
        }

        let request = self.controller.submit()?;
        self.handle(LifecycleEvent::LoadingStarted);
        Ok(request)
    }

    /// Applies an event. Returns whether a transition happened.
    pub fn handle(&mut self, event: LifecycleEvent) -> bool {
        let from = self.state.name();
        let event_name = event.name();

        let next = match (&self.state, event) {
            (LifecycleState::Idle, LifecycleEvent::LoadingStarted) => LifecycleState::Loading,
            (LifecycleState::Loading, LifecycleEvent::ResultReady(result)) => {
                LifecycleState::Success(result)
            }
            (LifecycleState::Loading, LifecycleEvent::Failed(message)) => {
                LifecycleState::Error(message)
            }
            (
                LifecycleState::Success(_) | LifecycleState::Error(_),
                LifecycleEvent::ResetRequested,
            ) => {
                self.controller.reset();
                LifecycleState::Idle
            }
            // Reset while loading is ignored: the request runs to completion.
            _ => {
                tracing::debug!(state = from, event = event_name, "event ignored");
                return false;
            }
        };

        self.state = next;
        tracing::info!(from, to = self.state.name(), event = event_name, "lifecycle transition");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageFile, RoastLevel};

    fn result() -> AnalysisResult {
        AnalysisResult {
            roast: "roasted".into(),
            features: None,
            total_processing_time_ms: 5.0,
            request_id: "abc".into(),
        }
    }

    fn with_selection() -> Coordinator {
        let mut coordinator = Coordinator::new();
        coordinator
            .controller_mut()
            .unwrap()
            .select_image(ImageFile::new("me.png", "image/png", vec![1, 2, 3]))
            .unwrap();
        coordinator
    }

    #[test]
    fn starts_idle_with_submission_view() {
        let coordinator = Coordinator::new();
        assert_eq!(coordinator.state(), &LifecycleState::Idle);
        assert!(matches!(coordinator.view(), View::Submission(_)));
    }

    #[test]
    fn submit_without_image_stays_idle() {
        let mut coordinator = Coordinator::new();
        assert!(matches!(coordinator.submit(), Err(AppError::NoImageSelected)));
        assert_eq!(coordinator.state(), &LifecycleState::Idle);
        assert!(coordinator.controller().unwrap().notice().is_some());
    }

    #[test]
    fn submit_moves_to_loading_and_hides_controller() {
        let mut coordinator = with_selection();
        coordinator.controller_mut().unwrap().set_roast_level(RoastLevel::Mild);
        let request = coordinator.submit().unwrap();

        assert_eq!(request.roast_level(), RoastLevel::Mild);
        assert_eq!(coordinator.state(), &LifecycleState::Loading);
        assert!(matches!(coordinator.view(), View::Progress));
        assert!(coordinator.controller().is_none());
        assert!(coordinator.controller_mut().is_none());
    }

    #[test]
    fn second_submit_before_completion_is_rejected() {
        let mut coordinator = with_selection();
        coordinator.submit().unwrap();
        assert!(matches!(coordinator.submit(), Err(AppError::RequestInFlight)));
        assert_eq!(coordinator.state(), &LifecycleState::Loading);
    }

    #[test]
    fn success_then_reset_returns_to_blank_idle() {
        let mut coordinator = with_selection();
        coordinator.submit().unwrap();
        assert!(coordinator.handle(LifecycleEvent::ResultReady(result())));
        assert!(matches!(coordinator.view(), View::Result(r) if r.request_id == "abc"));

        assert!(coordinator.handle(LifecycleEvent::ResetRequested));
        assert_eq!(coordinator.state(), &LifecycleState::Idle);
        assert!(coordinator.controller().unwrap().selected().is_none());
    }

    #[test]
    fn failure_then_reset_returns_to_blank_idle() {
        let mut coordinator = with_selection();
        coordinator.submit().unwrap();
        assert!(coordinator.handle(LifecycleEvent::Failed("nope".into())));
        assert!(matches!(coordinator.view(), View::Failure("nope")));

        assert!(coordinator.handle(LifecycleEvent::ResetRequested));
        assert!(matches!(coordinator.view(), View::Submission(c) if c.selected().is_none()));
    }

    #[test]
    fn reset_while_loading_is_ignored() {
        let mut coordinator = with_selection();
        coordinator.submit().unwrap();
        assert!(!coordinator.handle(LifecycleEvent::ResetRequested));
        assert_eq!(coordinator.state(), &LifecycleState::Loading);

        assert!(coordinator.handle(LifecycleEvent::Failed("late".into())));
        assert_eq!(coordinator.state(), &LifecycleState::Error("late".into()));
    }

    #[test]
    fn events_without_transition_are_ignored() {
        let mut coordinator = Coordinator::new();
        assert!(!coordinator.handle(LifecycleEvent::ResultReady(result())));
        assert!(!coordinator.handle(LifecycleEvent::Failed("x".into())));
        assert!(!coordinator.handle(LifecycleEvent::ResetRequested));
        assert_eq!(coordinator.state(), &LifecycleState::Idle);

        coordinator.handle(LifecycleEvent::LoadingStarted);
        coordinator.handle(LifecycleEvent::ResultReady(result()));
        assert!(!coordinator.handle(LifecycleEvent::Failed("late".into())));
        assert!(!coordinator.handle(LifecycleEvent::LoadingStarted));
        assert!(matches!(coordinator.state(), LifecycleState::Success(_)));
    }
}
