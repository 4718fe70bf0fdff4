pub mod analyzer_app;
pub mod controller;
pub mod notifier;
pub mod views;

pub use analyzer_app::AnalyzerApp;
pub use controller::{SessionController, SessionState};
pub use notifier::{ChannelNotifier, Notification, NotificationLevel, Notifier};
