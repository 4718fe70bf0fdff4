use std::time::{Duration, Instant};

use egui::{Color32, RichText, TextureHandle, TextureOptions};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::controller::{SessionController, SessionState};
use crate::app::notifier::{ChannelNotifier, Notification, NotificationLevel};
use crate::app::views::{ResultsView, UploadAction, UploadView, View};
use crate::config::Settings;
use crate::error::AppError;
use crate::intake::{ImageSource, SelectedImage, SystemClipboard};
use crate::network::AnalysisClient;
use crate::pipeline::services::{EXPORT_FILE_NAME, ProgressSimulator};

const APP_TITLE: &str = "Idfi-2.0";
const PASTE_HINT: &str = "Press Ctrl+V to paste an image from clipboard";
const TOAST_LIFETIME: Duration = Duration::from_secs(4);
const COPIED_FLAG_LIFETIME: Duration = Duration::from_secs(2);

struct Toast {
    notification: Notification,
    shown_at: Instant,
}

pub struct AnalyzerApp {
    controller: SessionController<AnalysisClient>,
    notification_rx: mpsc::Receiver<Notification>,
    toasts: Vec<Toast>,
    clipboard: SystemClipboard,
    preview: Option<(Uuid, Option<TextureHandle>)>,
    copied_at: Option<Instant>,
    max_image_bytes: u64,
}

impl AnalyzerApp {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let (notifier, notification_rx) = ChannelNotifier::new(100);
        let client = AnalysisClient::new(&settings.api.base_url)?;
        info!("Analysis endpoint: {}", client.endpoint());
        let controller = SessionController::new(
            ImageSource::new(settings.upload.max_image_bytes),
            ProgressSimulator::new(&settings.progress),
            client,
            Box::new(notifier),
        );
        Ok(Self {
            controller,
            notification_rx,
            toasts: Vec::new(),
            clipboard: SystemClipboard::new(),
            preview: None,
            copied_at: None,
            max_image_bytes: settings.upload.max_image_bytes,
        })
    }

    pub fn start_gui(settings: &Settings) -> Result<(), AppError> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(egui::vec2(1100.0, 760.0))
                .with_title(APP_TITLE),
            ..Default::default()
        };

        let app = AnalyzerApp::new(settings)?;
        eframe::run_native(APP_TITLE, options, Box::new(move |_cc| Ok(Box::new(app))))
            .map_err(|e| AppError::Ui(e.to_string()))
    }

    fn drain_notifications(&mut self) {
        loop {
            match self.notification_rx.try_recv() {
                Ok(notification) => self.toasts.push(Toast {
                    notification,
                    shown_at: Instant::now(),
                }),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("Notification channel disconnected");
                    break;
                }
            }
        }
        self.toasts
            .retain(|toast| toast.shown_at.elapsed() < TOAST_LIFETIME);
    }

    fn paste_requested(ctx: &egui::Context) -> bool {
        ctx.input(|input| {
            input.events.iter().any(|event| match event {
                egui::Event::Paste(_) => true,
                egui::Event::Key {
                    key: egui::Key::V,
                    pressed: true,
                    modifiers,
                    ..
                } => modifiers.command,
                _ => false,
            })
        })
    }

    fn paste_from_clipboard(&mut self) {
        let items = self.clipboard.read_items();
        debug!("Clipboard holds {} entries", items.len());
        if let Err(e) = self.controller.paste(items) {
            debug!("Paste rejected: {}", e);
        }
    }

    fn pick_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
            .pick_file()
        {
            if let Err(e) = self.controller.select_from_path(&path) {
                debug!("File {} rejected: {}", path.display(), e);
            }
        }
    }

    fn save_results(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        {
            if let Err(e) = self.controller.export_results(&path) {
                warn!("Export to {} failed: {}", path.display(), e);
            }
        }
    }

    fn copy_results(&mut self) {
        if self.controller.copy_results(&mut self.clipboard).is_ok() {
            self.copied_at = Some(Instant::now());
        }
    }

    fn handle_upload_action(&mut self, action: UploadAction) {
        match action {
            UploadAction::PickFile => self.pick_file(),
            UploadAction::PasteHint => self.controller.notify_info(PASTE_HINT),
            UploadAction::Remove => self.controller.remove_image(),
            UploadAction::Analyze => {
                if let Err(e) = self.controller.dispatch_analysis() {
                    debug!("Analysis not started: {}", e);
                }
            }
        }
    }

    /// Decodes the preview once per selection.
    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let current = self.controller.session().image().map(SelectedImage::id);
        let cached = self.preview.as_ref().map(|(id, _)| *id);
        if current == cached {
            return;
        }
        self.preview = self
            .controller
            .session()
            .image()
            .map(|image| (image.id(), load_preview(ctx, image)));
    }

    fn draw_toasts(&self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let color = match toast.notification.level {
                        NotificationLevel::Info => Color32::from_rgb(30, 64, 175),
                        NotificationLevel::Success => Color32::from_rgb(22, 101, 52),
                        NotificationLevel::Error => Color32::from_rgb(153, 27, 27),
                    };
                    ui.label(
                        RichText::new(format!(
                            "[{}] {}",
                            toast.notification.timestamp.format("%H:%M:%S"),
                            toast.notification.message
                        ))
                        .color(color),
                    );
                }
            });
    }

    fn draw_results_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Analysis Results");
            if self.controller.state() == SessionState::ResultReady {
                let copied = self
                    .copied_at
                    .is_some_and(|at| at.elapsed() < COPIED_FLAG_LIFETIME);
                let copy_label = if copied { "Copied" } else { "Copy" };
                if ui.button(copy_label).clicked() {
                    self.copy_results();
                }
                if ui.button("Download").clicked() {
                    self.save_results();
                }
            }
        });
        ui.separator();

        match self.controller.session().result() {
            Some(result) => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ResultsView::new(result).draw(ui);
                });
            }
            None => {
                ui.vertical_centered(|ui| {
                    ui.add_space(48.0);
                    ui.label(
                        RichText::new("Upload and analyze an image to see AI-powered insights")
                            .weak(),
                    );
                });
            }
        }
    }
}

fn load_preview(ctx: &egui::Context, image: &SelectedImage) -> Option<TextureHandle> {
    match image::load_from_memory(image.bytes()) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            Some(ctx.load_texture(
                format!("preview-{}", image.id()),
                color_image,
                TextureOptions::default(),
            ))
        }
        Err(e) => {
            warn!("Cannot render preview for {}: {}", image.mime_hint(), e);
            None
        }
    }
}

impl eframe::App for AnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll_completions();
        self.drain_notifications();

        if Self::paste_requested(ctx) {
            self.paste_from_clipboard();
        }
        self.refresh_preview(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(APP_TITLE);
                ui.label(
                    RichText::new(
                        "Advanced AI-powered image analysis. Upload or paste images to detect objects and tags.",
                    )
                    .weak(),
                );
            });
        });

        let mut upload_action = None;
        egui::SidePanel::left("upload_panel")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                let session = self.controller.session();
                let preview = self.preview.as_ref().and_then(|(_, texture)| texture.as_ref());
                let mut view =
                    UploadView::new(session.state(), session.image(), preview, session.progress())
                        .settling(session.progress_settling())
                        .size_limit(self.max_image_bytes);
                view.draw(ui);
                upload_action = view.action();
            });
        if let Some(action) = upload_action {
            self.handle_upload_action(action);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_results_panel(ui);
        });

        self.draw_toasts(ctx);

        if self.controller.state() == SessionState::Analyzing
            || self.controller.session().progress_settling()
            || !self.toasts.is_empty()
            || self.copied_at.is_some()
        {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if self
            .copied_at
            .is_some_and(|at| at.elapsed() >= COPIED_FLAG_LIFETIME)
        {
            self.copied_at = None;
        }
    }
}
