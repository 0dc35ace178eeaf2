//! Main roast window.
//!
//! `RoastApp` implements `eframe::App`. All state lives in the
//! [`Coordinator`]; background work (file reads, previews, the analysis
//! request) runs on the tokio runtime and reports back over a channel that
//! is drained at the start of every frame.

use super::rendering::{
    draw_error, draw_footer, draw_header, draw_level_selector, draw_progress, draw_result,
    draw_upload_area,
};
use super::state::{AppMessage, UiAction};
use super::upload::{image_file_from_drop, pick_image_path};
use crate::client::HttpAnalysisClient;
use crate::config::Config;
use crate::controller::{PreviewTicket, dispatch, load_preview};
use crate::error::{AppError, Result};
use crate::lifecycle::{Coordinator, LifecycleEvent, View};
use crate::model::ImageFile;
use crate::render::render;
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};
use tokio::runtime::Handle;

/// The roast window.
pub struct RoastApp {
    coordinator: Coordinator,
    client: HttpAnalysisClient,
    runtime: Handle,
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,

    // Texture for the current selection's preview, keyed by selection seq
    preview_texture: Option<(u64, egui::TextureHandle)>,
    picker_open: bool,
}

impl RoastApp {
    /// Creates the app.
    ///
    /// # Arguments
    /// * `config` - Application configuration (analysis endpoint)
    /// * `runtime` - Handle of the runtime that runs background work
    pub fn new(config: &Config, runtime: Handle) -> Result<Self> {
        let (tx, rx) = channel();
        Ok(Self {
            coordinator: Coordinator::new(),
            client: HttpAnalysisClient::new(config)?,
            runtime,
            tx,
            rx,
            preview_texture: None,
            picker_open: false,
        })
    }

    /// Applies messages from background tasks.
    fn process_messages(&mut self, ctx: &egui::Context) {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                AppMessage::PickerClosed(path) => {
                    self.picker_open = false;
                    match path {
                        Some(path) => self.read_picked(ctx, path),
                        None => tracing::debug!("picker dismissed"),
                    }
                }
                AppMessage::FilePicked { intake, file } => match file {
                    Ok(file) => self.select_from_picker(ctx, intake, file),
                    Err(e) => tracing::warn!(intake, error = %e, "failed to read picked file"),
                },
                AppMessage::FileDropped { intake, file } => match file {
                    Ok(file) => self.select_from_drop(ctx, intake, file),
                    Err(e) => tracing::debug!(intake, error = %e, "ignored unreadable drop"),
                },
                AppMessage::PreviewReady(outcome) => {
                    self.coordinator.apply_preview(outcome);
                }
                AppMessage::Lifecycle(event) => {
                    self.coordinator.handle(event);
                }
            }
            ctx.request_repaint();
        }
    }

    fn select_from_picker(&mut self, ctx: &egui::Context, intake: u64, file: ImageFile) {
        let Some(controller) = self.coordinator.controller_mut() else {
            return;
        };
        // Rejections are surfaced through the controller's notice
        if let Ok(Some(ticket)) = controller.complete_pick(intake, file) {
            self.spawn_preview(ctx, ticket);
        }
    }

    fn select_from_drop(&mut self, ctx: &egui::Context, intake: u64, file: ImageFile) {
        let Some(controller) = self.coordinator.controller_mut() else {
            return;
        };
        if let Some(ticket) = controller.complete_drop(intake, file) {
            self.spawn_preview(ctx, ticket);
        }
    }

    /// Reserves the selection slot for a confirmed pick, then reads the file.
    fn read_picked(&mut self, ctx: &egui::Context, path: PathBuf) {
        let Some(controller) = self.coordinator.controller_mut() else {
            return;
        };
        let intake = controller.begin_intake();

        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let file = ImageFile::open(&path).await;
            let _ = tx.send(AppMessage::FilePicked { intake, file });
            ctx.request_repaint();
        });
    }

    fn spawn_preview(&self, ctx: &egui::Context, ticket: PreviewTicket) {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = load_preview(ticket).await;
            let _ = tx.send(AppMessage::PreviewReady(outcome));
            ctx.request_repaint();
        });
    }

    fn open_picker(&mut self, ctx: &egui::Context) {
        if self.picker_open {
            return;
        }
        self.picker_open = true;

        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(AppMessage::PickerClosed(pick_image_path().await));
            ctx.request_repaint();
        });
    }

    /// Reads files dropped on the window. Drops outside `Idle` are ignored.
    ///
    /// The selection slot is reserved in the frame the drop lands, so a slow
    /// read cannot overtake a later pick or drop.
    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        // Only the first file counts, as with a single-file input
        let Some(dropped) = ctx.input(|i| i.raw.dropped_files.first().cloned()) else {
            return;
        };
        let Some(controller) = self.coordinator.controller_mut() else {
            return;
        };
        let intake = controller.begin_intake();

        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let file = image_file_from_drop(dropped).await;
            let _ = tx.send(AppMessage::FileDropped { intake, file });
            ctx.request_repaint();
        });
    }

    fn submit(&mut self, ctx: &egui::Context) {
        let request = match self.coordinator.submit() {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "submit refused");
                return;
            }
        };

        let client = self.client.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let event = dispatch(&client, request).await;
            let _ = tx.send(AppMessage::Lifecycle(event));
            ctx.request_repaint();
        });
    }

    /// Keeps the preview texture in step with the current selection.
    fn sync_preview_texture(&mut self, ctx: &egui::Context) {
        let Some(selected) = self.coordinator.controller().and_then(|c| c.selected()) else {
            if self.coordinator.controller().is_some() {
                self.preview_texture = None;
            }
            return;
        };

        let seq = selected.seq();
        if matches!(&self.preview_texture, Some((loaded, _)) if *loaded == seq) {
            return;
        }

        let Some(bitmap) = selected.preview().and_then(|p| p.bitmap.as_ref()) else {
            self.preview_texture = None;
            return;
        };

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [bitmap.width as usize, bitmap.height as usize],
            &bitmap.rgba,
        );
        let texture = ctx.load_texture("preview", image, egui::TextureOptions::LINEAR);
        self.preview_texture = Some((seq, texture));
    }

    /// Renders the submission form.
    fn render_idle_ui(&self, ui: &mut egui::Ui, hovering: bool, actions: &mut Vec<UiAction>) {
        let Some(controller) = self.coordinator.controller() else {
            return;
        };

        let texture = self
            .preview_texture
            .as_ref()
            .filter(|(seq, _)| controller.selected().map(|s| s.seq()) == Some(*seq))
            .map(|(_, texture)| texture);
        let file_name = controller.selected().map(|s| s.file().name());
        let pending = controller.selected().is_some_and(|s| s.preview().is_none());

        if draw_upload_area(ui, texture, file_name, pending, hovering).clicked() {
            actions.push(UiAction::PickFile);
        }

        ui.add_space(12.0);
        if let Some(level) = draw_level_selector(ui, controller.roast_level()) {
            actions.push(UiAction::SetRoastLevel(level));
        }

        ui.add_space(12.0);
        let submit_button = egui::Button::new(egui::RichText::new("Generate Roast").strong())
            .min_size(egui::vec2(160.0, 32.0));
        let submit = ui.add_enabled(controller.can_submit(), submit_button);
        if submit.clicked() {
            actions.push(UiAction::Submit);
        }

        if let Some(notice) = controller.notice() {
            ui.add_space(8.0);
            ui.label(egui::RichText::new(notice).color(egui::Color32::RED));
        }
    }

    fn apply_actions(&mut self, ctx: &egui::Context, actions: Vec<UiAction>) {
        for action in actions {
            match action {
                UiAction::PickFile => self.open_picker(ctx),
                UiAction::SetRoastLevel(level) => {
                    if let Some(controller) = self.coordinator.controller_mut() {
                        controller.set_roast_level(level);
                    }
                }
                UiAction::Submit => self.submit(ctx),
                UiAction::Reset => {
                    if self.coordinator.handle(LifecycleEvent::ResetRequested) {
                        self.preview_texture = None;
                    }
                }
                UiAction::CopyRoast(text) => match arboard::Clipboard::new() {
                    Ok(mut clipboard) => {
                        if let Err(e) = clipboard.set_text(text) {
                            tracing::warn!(error = %e, "failed to copy roast");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
                },
            }
        }
    }
}

impl eframe::App for RoastApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.process_messages(ctx);
        self.collect_dropped_files(ctx);
        self.sync_preview_texture(ctx);

        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("header").show(ctx, draw_header);
        egui::TopBottomPanel::bottom("footer").show(ctx, draw_footer);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.coordinator.view() {
                View::Submission(_) => self.render_idle_ui(ui, hovering, &mut actions),
                View::Progress => draw_progress(ui),
                View::Failure(message) => {
                    if draw_error(ui, message) {
                        actions.push(UiAction::Reset);
                    }
                }
                View::Result(result) => {
                    let view = render(result);
                    let clicks = draw_result(ui, &view);
                    if clicks.copy {
                        actions.push(UiAction::CopyRoast(view.roast.clone()));
                    }
                    if clicks.reset {
                        actions.push(UiAction::Reset);
                    }
                }
            });
        });

        self.apply_actions(ctx, actions);
    }
}

/// Launches the roast window and returns when it is closed.
///
/// Must be called from within a tokio runtime; background work is spawned
/// on it.
pub fn run(config: Config) -> Result<()> {
    let runtime = Handle::try_current()
        .map_err(|e| AppError::ui(format!("No async runtime available: {}", e)))?;
    let app = RoastApp::new(&config, runtime)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("I Judge")
            .with_inner_size([560.0, 760.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "I Judge",
        options,
        Box::new(move |_cc| Ok(Box::new(app) as Box<dyn eframe::App>)),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::tests::png_bytes;

    fn app() -> RoastApp {
        let config = Config::builder().build().unwrap();
        RoastApp::new(&config, Handle::current()).unwrap()
    }

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", png_bytes(2, 2))
    }

    fn selected_name(app: &RoastApp) -> Option<String> {
        let controller = app.coordinator.controller()?;
        controller.selected().map(|s| s.file().name().to_string())
    }

    #[tokio::test]
    async fn slow_first_drop_does_not_override_second() {
        let ctx = egui::Context::default();
        let mut app = app();
        let controller = app.coordinator.controller_mut().unwrap();
        let first = controller.begin_intake();
        let second = controller.begin_intake();

        // The second drop's read finishes first.
        let reads = [(second, "second_dropped.png"), (first, "first_dropped.png")];
        for (intake, name) in reads {
            app.tx.send(AppMessage::FileDropped { intake, file: Ok(png(name)) }).unwrap();
        }
        app.process_messages(&ctx);

        assert_eq!(selected_name(&app).as_deref(), Some("second_dropped.png"));
    }

    #[tokio::test]
    async fn drop_after_pick_wins_over_late_picked_read() {
        let ctx = egui::Context::default();
        let mut app = app();
        let controller = app.coordinator.controller_mut().unwrap();
        let picked = controller.begin_intake();
        let dropped = controller.begin_intake();

        let drop_read = AppMessage::FileDropped { intake: dropped, file: Ok(png("drop.png")) };
        let pick_read = AppMessage::FilePicked { intake: picked, file: Ok(png("pick.png")) };
        app.tx.send(drop_read).unwrap();
        app.tx.send(pick_read).unwrap();
        app.process_messages(&ctx);

        assert_eq!(selected_name(&app).as_deref(), Some("drop.png"));
        assert!(app.coordinator.controller().unwrap().notice().is_none());
    }

    #[tokio::test]
    async fn dismissed_picker_leaves_selection_alone() {
        let ctx = egui::Context::default();
        let mut app = app();
        app.picker_open = true;

        app.tx.send(AppMessage::PickerClosed(None)).unwrap();
        app.process_messages(&ctx);

        assert!(!app.picker_open);
        assert_eq!(selected_name(&app), None);
    }
}
