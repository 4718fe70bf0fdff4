use egui::{Color32, RichText};

use crate::app::views::View;
use crate::pipeline::types::{ConfidenceBand, NormalizedResult};

pub struct ResultsView<'a> {
    result: &'a NormalizedResult,
}

impl<'a> ResultsView<'a> {
    pub fn new(result: &'a NormalizedResult) -> Self {
        Self { result }
    }

    fn band_colors(band: ConfidenceBand) -> (Color32, Color32) {
        match band {
            ConfidenceBand::High => (
                Color32::from_rgb(220, 252, 231),
                Color32::from_rgb(22, 101, 52),
            ),
            ConfidenceBand::Medium => (
                Color32::from_rgb(254, 249, 195),
                Color32::from_rgb(133, 77, 14),
            ),
            ConfidenceBand::Low => (
                Color32::from_rgb(254, 226, 226),
                Color32::from_rgb(153, 27, 27),
            ),
        }
    }

    fn badge(ui: &mut egui::Ui, text: String, band: ConfidenceBand) {
        let (background, foreground) = Self::band_colors(band);
        ui.label(
            RichText::new(format!(" {} ", text))
                .background_color(background)
                .color(foreground),
        );
    }

    fn draw_description(&self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.strong("AI Description");
            ui.label(&self.result.description);
            if let Some(confidence) = self.result.description_confidence {
                ui.label(RichText::new(format!("Confidence: {}%", confidence)).weak());
            }
        });
    }

    fn draw_tags(&self, ui: &mut egui::Ui) {
        if self.result.tags.is_empty() {
            return;
        }
        ui.strong(format!("Detected Tags ({})", self.result.tags.len()));
        ui.horizontal_wrapped(|ui| {
            for tag in self.result.displayed_tags() {
                Self::badge(
                    ui,
                    format!("{} ({}%)", tag.name, tag.confidence_percent),
                    tag.band(),
                );
            }
        });
    }

    fn draw_objects(&self, ui: &mut egui::Ui) {
        if self.result.objects.is_empty() {
            return;
        }
        ui.strong(format!("Detected Objects ({})", self.result.objects.len()));
        for object in &self.result.objects {
            ui.horizontal(|ui| {
                ui.label(&object.label);
                Self::badge(ui, format!("{}%", object.confidence_percent), object.band());
            });
        }
    }

    fn draw_categories(&self, ui: &mut egui::Ui) {
        if self.result.categories.is_empty() {
            return;
        }
        ui.strong(format!("Categories ({})", self.result.categories.len()));
        for category in &self.result.categories {
            ui.label(format!("{} ({}%)", category.name, category.score_percent));
        }
    }
}

impl View for ResultsView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui) {
        self.draw_description(ui);
        ui.separator();
        self.draw_tags(ui);
        ui.separator();
        self.draw_objects(ui);
        self.draw_categories(ui);
    }
}
