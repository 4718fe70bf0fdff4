use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ProgressSettings;

/// Synthetic progress state. A fresh model starts at 0 for every analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressModel {
    value: f32,
    cap: f32,
    capped: bool,
}

impl ProgressModel {
    pub fn new(cap: f32) -> Self {
        Self {
            value: 0.0,
            cap,
            capped: false,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_capped(&self) -> bool {
        self.capped
    }

    /// Applies one tick. Once the value would reach the cap it is pinned there
    /// and later ticks do nothing. Returns whether the value changed.
    pub fn tick(&mut self, increment: f32) -> bool {
        if self.capped {
            return false;
        }
        let next = self.value + increment.max(0.0);
        if next >= self.cap {
            self.value = self.cap;
            self.capped = true;
        } else {
            self.value = next;
        }
        true
    }
}

/// Drives a [`ProgressModel`] on a fixed cadence while a request is pending.
#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    tick_interval: Duration,
    max_increment: f32,
    cap: f32,
}

/// Handle to a running simulation. Dropping it does not stop the task; call
/// [`ProgressSimulator::stop`].
#[derive(Debug)]
pub struct ProgressHandle {
    task: JoinHandle<()>,
    value_rx: watch::Receiver<f32>,
}

impl ProgressHandle {
    pub fn value(&self) -> f32 {
        *self.value_rx.borrow()
    }
}

impl ProgressSimulator {
    pub fn new(settings: &ProgressSettings) -> Self {
        Self {
            tick_interval: settings.tick_interval().max(Duration::from_millis(1)),
            max_increment: settings.max_increment,
            cap: settings.cap,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> ProgressHandle {
        let (value_tx, value_rx) = watch::channel(0.0);
        let tick_interval = self.tick_interval;
        let max_increment = self.max_increment;
        let mut model = ProgressModel::new(self.cap);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            // The first tick of a tokio interval fires immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let increment = if max_increment > 0.0 {
                    rand::rng().random_range(0.0..max_increment)
                } else {
                    0.0
                };
                if model.tick(increment) {
                    value_tx.send_replace(model.value());
                }
                if model.is_capped() {
                    debug!("Progress capped at {}", model.value());
                    break;
                }
            }
        });

        ProgressHandle { task, value_rx }
    }

    pub fn stop(&self, handle: ProgressHandle) {
        handle.task.abort();
    }
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(&ProgressSettings::default())
    }
}
