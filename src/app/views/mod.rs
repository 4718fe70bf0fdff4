pub mod results_view;
pub mod upload_view;

pub use results_view::ResultsView;
pub use upload_view::{UploadAction, UploadView};

pub trait View {
    fn draw(&mut self, ui: &mut egui::Ui);
}
