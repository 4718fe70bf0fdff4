use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

/// Fire-and-forget user notification.
pub trait Notifier: Send {
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// Forwards notifications to the UI thread over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Error => warn!("Notify [{:?}]: {}", level, message),
            _ => info!("Notify [{:?}]: {}", level, message),
        }
        let notification = Notification {
            level,
            message: message.to_string(),
            timestamp: Local::now(),
        };
        if let Err(e) = self.tx.try_send(notification) {
            error!("Dropping notification: {}", e);
        }
    }
}
