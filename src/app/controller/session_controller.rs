use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::time::Instant;
use tower::{Service, ServiceExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::notifier::{NotificationLevel, Notifier};
use crate::error::{AnalysisError, AppError, SessionError, ValidationError};
use crate::intake::{ClipboardItem, FileInput, ImageSource, SelectedImage, TextClipboard};
use crate::network::AnalysisRequest;
use crate::pipeline::services::{ProgressHandle, ProgressSimulator, clipboard_text, write_export};
use crate::pipeline::{AnalysisResult, Normalized, NormalizedResult, normalize};

const MSG_NO_CLIPBOARD_IMAGE: &str = "No image detected. Only image pasting is supported.";
const MSG_UNREADABLE: &str = "Failed to process image";
const MSG_PASTED: &str = "Image pasted successfully!";
const MSG_NO_IMAGE: &str = "Please select an image first";
const MSG_ALREADY_ANALYZING: &str = "An analysis is already running";
const MSG_NOT_RECOGNIZED: &str = "Image not recognized or contains no detectable content.";
const MSG_ANALYZED: &str = "Image analyzed successfully!";
const MSG_ANALYSIS_FAILED: &str = "Failed to analyze image. Please try again.";
const MSG_COPIED: &str = "Results copied to clipboard!";
const MSG_COPY_FAILED: &str = "Failed to copy results";
const MSG_DOWNLOADED: &str = "Results downloaded!";
const MSG_DOWNLOAD_FAILED: &str = "Failed to download results";
const MSG_NO_RESULT: &str = "No analysis results to export";

/// How long the final progress value stays visible after a response.
pub const PROGRESS_HOLD: Duration = Duration::from_millis(500);
const PROGRESS_COMPLETE: f32 = 100.0;

fn size_exceeded_message(limit: u64) -> String {
    let megabytes = limit as f64 / (1024.0 * 1024.0);
    format!("Image size should be less than {}MB", megabytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ImageReady,
    Analyzing,
    ResultReady,
}

/// Mutable session state. Only the controller writes to it.
#[derive(Debug)]
pub struct AnalysisSession {
    state: SessionState,
    image: Option<SelectedImage>,
    progress: Option<ProgressHandle>,
    settled_progress: Option<(f32, Instant)>,
    result: Option<NormalizedResult>,
}

impl AnalysisSession {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            image: None,
            progress: None,
            settled_progress: None,
            result: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&NormalizedResult> {
        self.result.as_ref()
    }

    /// Synthetic progress in `[0,100]`. After a response the final value is
    /// held for [`PROGRESS_HOLD`], then it reads 0.
    pub fn progress(&self) -> f32 {
        match (&self.state, &self.progress) {
            (SessionState::Analyzing, Some(handle)) => handle.value(),
            _ => self.held_progress().unwrap_or(0.0),
        }
    }

    /// True while a finished analysis still shows its final progress value.
    pub fn progress_settling(&self) -> bool {
        self.state != SessionState::Analyzing && self.held_progress().is_some()
    }

    fn held_progress(&self) -> Option<f32> {
        self.settled_progress
            .filter(|(_, at)| at.elapsed() < PROGRESS_HOLD)
            .map(|(value, _)| value)
    }
}

/// Result of an analysis exchange, tagged with the selection it belongs to.
#[derive(Debug)]
pub struct AnalysisCompletion {
    pub image_id: Uuid,
    pub outcome: Result<AnalysisResult, AnalysisError>,
}

pub struct SessionController<S> {
    session: AnalysisSession,
    image_source: ImageSource,
    progress_simulator: ProgressSimulator,
    analysis_service: S,
    notifier: Box<dyn Notifier>,
    completion_tx: Sender<AnalysisCompletion>,
    completion_rx: Receiver<AnalysisCompletion>,
}

impl<S> SessionController<S>
where
    S: Service<AnalysisRequest, Response = AnalysisResult, Error = AnalysisError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    pub fn new(
        image_source: ImageSource,
        progress_simulator: ProgressSimulator,
        analysis_service: S,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel(16);
        Self {
            session: AnalysisSession::new(),
            image_source,
            progress_simulator,
            analysis_service,
            notifier,
            completion_tx,
            completion_rx,
        }
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn notify_info(&self, message: &str) {
        self.notifier.notify(NotificationLevel::Info, message);
    }

    fn notify_validation(&self, err: &ValidationError) {
        let message = match err {
            ValidationError::SizeExceeded { limit, .. } => size_exceeded_message(*limit),
            ValidationError::NoImageInClipboard => MSG_NO_CLIPBOARD_IMAGE.to_string(),
            ValidationError::Unreadable(_) => MSG_UNREADABLE.to_string(),
        };
        warn!("Image rejected: {}", err);
        self.notifier.notify(NotificationLevel::Error, &message);
    }

    /// Replaces the current image and clears any result. An in-flight analysis
    /// keeps running but its response will be discarded.
    pub fn select_image(&mut self, image: SelectedImage) {
        if self.session.state == SessionState::Analyzing {
            warn!("New image selected while analyzing; pending response will be discarded");
        }
        self.stop_progress();
        self.session.settled_progress = None;
        info!(
            "Image {} selected ({} bytes)",
            image.id(),
            image.size_bytes()
        );
        self.session.image = Some(image);
        self.session.result = None;
        self.session.state = SessionState::ImageReady;
    }

    pub fn select_from_file(&mut self, file: FileInput) -> Result<(), AppError> {
        match self.image_source.select_from_file(file) {
            Ok(image) => {
                self.select_image(image);
                Ok(())
            }
            Err(e) => {
                self.notify_validation(&e);
                Err(e.into())
            }
        }
    }

    pub fn select_from_path(&mut self, path: &Path) -> Result<(), AppError> {
        match self.image_source.select_from_path(path) {
            Ok(image) => {
                self.select_image(image);
                Ok(())
            }
            Err(e) => {
                self.notify_validation(&e);
                Err(e.into())
            }
        }
    }

    pub fn paste(&mut self, items: Vec<ClipboardItem>) -> Result<(), AppError> {
        match self.image_source.select_from_clipboard(items) {
            Ok(image) => {
                self.select_image(image);
                self.notifier.notify(NotificationLevel::Success, MSG_PASTED);
                Ok(())
            }
            Err(e) => {
                self.notify_validation(&e);
                Err(e.into())
            }
        }
    }

    pub fn remove_image(&mut self) {
        self.stop_progress();
        self.session.settled_progress = None;
        self.session.image = None;
        self.session.result = None;
        self.session.state = SessionState::Idle;
        info!("Image removed");
    }

    /// Enters `Analyzing` and returns the request to send.
    pub fn begin_analysis(&mut self) -> Result<AnalysisRequest, AppError> {
        if self.session.state == SessionState::Analyzing {
            self.notifier
                .notify(NotificationLevel::Error, MSG_ALREADY_ANALYZING);
            return Err(SessionError::AlreadyAnalyzing.into());
        }
        let Some(image) = self.session.image.as_ref() else {
            self.notifier.notify(NotificationLevel::Error, MSG_NO_IMAGE);
            return Err(SessionError::NoImageSelected.into());
        };
        let request = AnalysisRequest {
            image_id: image.id(),
            bytes: image.shared_bytes(),
        };
        self.session.result = None;
        self.session.settled_progress = None;
        self.session.progress = Some(self.progress_simulator.start());
        self.session.state = SessionState::Analyzing;
        info!("Analyzing image {}", request.image_id);
        Ok(request)
    }

    /// Applies a response. Returns `false` when it belongs to a selection that
    /// is no longer current and was discarded.
    pub fn complete_analysis(&mut self, completion: AnalysisCompletion) -> bool {
        let current = self.session.image.as_ref().map(SelectedImage::id);
        if current != Some(completion.image_id) || self.session.state != SessionState::Analyzing {
            info!(
                "Discarding stale analysis response for image {}",
                completion.image_id
            );
            return false;
        }

        // A response completes the bar; a request that never got one keeps the
        // last simulated value.
        let last = self.session.progress.as_ref().map_or(0.0, ProgressHandle::value);
        let terminal = match &completion.outcome {
            Err(AnalysisError::Transport(_)) => last,
            _ => PROGRESS_COMPLETE,
        };
        self.stop_progress();
        self.session.settled_progress = Some((terminal, Instant::now()));
        match completion.outcome {
            Ok(raw) => match normalize(&raw) {
                Normalized::Result(result) => {
                    debug!(
                        "Result ready: {} tags, {} objects",
                        result.tags.len(),
                        result.objects.len()
                    );
                    self.session.result = Some(result);
                    self.session.state = SessionState::ResultReady;
                    self.notifier.notify(NotificationLevel::Success, MSG_ANALYZED);
                }
                Normalized::Empty => {
                    self.session.result = None;
                    self.session.state = SessionState::ImageReady;
                    self.notifier
                        .notify(NotificationLevel::Error, MSG_NOT_RECOGNIZED);
                }
            },
            Err(e) => {
                error!("Analysis error: {}", e);
                self.session.result = None;
                self.session.state = SessionState::ImageReady;
                self.notifier
                    .notify(NotificationLevel::Error, MSG_ANALYSIS_FAILED);
            }
        }
        true
    }

    /// Runs a full analysis in place.
    pub async fn analyze(&mut self) -> Result<(), AppError> {
        let request = self.begin_analysis()?;
        let image_id = request.image_id;
        let outcome = self.analysis_service.clone().oneshot(request).await;
        self.complete_analysis(AnalysisCompletion { image_id, outcome });
        Ok(())
    }

    /// Starts an analysis on a background task. The response is applied by a
    /// later [`Self::poll_completions`].
    pub fn dispatch_analysis(&mut self) -> Result<(), AppError> {
        let request = self.begin_analysis()?;
        let service = self.analysis_service.clone();
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let image_id = request.image_id;
            let outcome = service.oneshot(request).await;
            if completion_tx
                .send(AnalysisCompletion { image_id, outcome })
                .await
                .is_err()
            {
                debug!("Session dropped before analysis of {} completed", image_id);
            }
        });
        Ok(())
    }

    /// Applies every completed analysis. Returns how many were applied.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self.complete_analysis(completion) {
                applied += 1;
            }
        }
        applied
    }

    fn current_result(&self) -> Result<&NormalizedResult, AppError> {
        match (&self.session.state, &self.session.result) {
            (SessionState::ResultReady, Some(result)) => Ok(result),
            _ => {
                self.notifier.notify(NotificationLevel::Error, MSG_NO_RESULT);
                Err(SessionError::NoResult.into())
            }
        }
    }

    pub fn copy_results(&self, clipboard: &mut dyn TextClipboard) -> Result<(), AppError> {
        let text = clipboard_text(self.current_result()?);
        match clipboard.write_text(&text) {
            Ok(()) => {
                self.notifier.notify(NotificationLevel::Success, MSG_COPIED);
                Ok(())
            }
            Err(e) => {
                error!("Copy failed: {}", e);
                self.notifier.notify(NotificationLevel::Error, MSG_COPY_FAILED);
                Err(e.into())
            }
        }
    }

    pub fn export_results(&self, path: &Path) -> Result<PathBuf, AppError> {
        match write_export(self.current_result()?, path) {
            Ok(written) => {
                self.notifier.notify(NotificationLevel::Success, MSG_DOWNLOADED);
                Ok(written)
            }
            Err(e) => {
                error!("Export failed: {}", e);
                self.notifier
                    .notify(NotificationLevel::Error, MSG_DOWNLOAD_FAILED);
                Err(e.into())
            }
        }
    }

    fn stop_progress(&mut self) {
        if let Some(handle) = self.session.progress.take() {
            self.progress_simulator.stop(handle);
        }
    }
}

impl<S> Drop for SessionController<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.session.progress.take() {
            self.progress_simulator.stop(handle);
        }
    }
}
