pub mod session_controller;

pub use session_controller::{
    AnalysisCompletion, AnalysisSession, PROGRESS_HOLD, SessionController, SessionState,
};
