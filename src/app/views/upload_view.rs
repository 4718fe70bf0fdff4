use egui::{ProgressBar, RichText, TextureHandle};

use crate::app::controller::SessionState;
use crate::app::views::View;
use crate::intake::SelectedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    PickFile,
    PasteHint,
    Remove,
    Analyze,
}

pub struct UploadView<'a> {
    state: SessionState,
    image: Option<&'a SelectedImage>,
    preview: Option<&'a TextureHandle>,
    progress: f32,
    settling: bool,
    size_limit_megabytes: f64,
    action: Option<UploadAction>,
}

impl<'a> UploadView<'a> {
    pub fn new(
        state: SessionState,
        image: Option<&'a SelectedImage>,
        preview: Option<&'a TextureHandle>,
        progress: f32,
    ) -> Self {
        Self {
            state,
            image,
            preview,
            progress,
            settling: false,
            size_limit_megabytes: 10.0,
            action: None,
        }
    }

    /// Keeps the progress bar on screen while the final value is held.
    pub fn settling(mut self, settling: bool) -> Self {
        self.settling = settling;
        self
    }

    pub fn size_limit(mut self, max_image_bytes: u64) -> Self {
        self.size_limit_megabytes = max_image_bytes as f64 / (1024.0 * 1024.0);
        self
    }

    /// Action requested by the user during the last draw.
    pub fn action(&self) -> Option<UploadAction> {
        self.action
    }

    fn draw_empty(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            if ui.button("Click to upload an image").clicked() {
                self.action = Some(UploadAction::PickFile);
            }
            ui.label(
                RichText::new(format!("PNG, JPG, GIF up to {}MB", self.size_limit_megabytes)).weak(),
            );
            ui.add_space(8.0);
            if ui.button("Paste from clipboard").clicked() {
                self.action = Some(UploadAction::PasteHint);
            }
            ui.add_space(24.0);
        });
    }

    fn draw_selected(&mut self, ui: &mut egui::Ui, image: &SelectedImage) {
        match self.preview {
            Some(texture) => {
                ui.add(egui::Image::new(texture).max_width(ui.available_width()).max_height(320.0));
            }
            None => {
                ui.label(RichText::new("Preview unavailable").italics().weak());
            }
        }

        ui.horizontal(|ui| {
            ui.label(image.name().unwrap_or("Pasted image"));
            ui.label(RichText::new(format!("{:.2} MB", image.size_megabytes())).weak());
        });

        let analyzing = self.state == SessionState::Analyzing;
        if analyzing || self.settling {
            ui.label(if analyzing { "Analyzing image..." } else { "Analysis finished" });
            ui.add(ProgressBar::new(self.progress / 100.0).show_percentage());
        }

        ui.horizontal(|ui| {
            let label = if analyzing { "Analyzing..." } else { "Analyze Image" };
            if ui.add_enabled(!analyzing, egui::Button::new(label)).clicked() {
                self.action = Some(UploadAction::Analyze);
            }
            if ui.add_enabled(!analyzing, egui::Button::new("Remove")).clicked() {
                self.action = Some(UploadAction::Remove);
            }
        });
    }
}

impl View for UploadView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui) {
        ui.heading("Upload Image");
        ui.separator();
        match self.image {
            Some(image) => self.draw_selected(ui, image),
            None => self.draw_empty(ui),
        }
    }
}
