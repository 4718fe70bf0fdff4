use idfi::{AnalyzerApp, AppError, Settings};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load()?;
    init_logging(&settings.log_level);
    tracing::info!("Starting {}", env!("CARGO_PKG_NAME"));
    AnalyzerApp::start_gui(&settings)
}
