mod auth;
mod errors;
mod layout;
mod models;
mod redaction;
mod registry;
mod session;
mod sync;

pub use auth::{TokenSource, TokenStore, ENV_TOKEN};
pub use errors::{AppError, AppResult};
pub use layout::LayoutModel;
pub use models::{
    GridPosition, GridReport, SaveWidgetSettingsPayload, SyncStatus, WidgetInstance, WidgetKind,
    WidgetSettingsEnvelope,
};
pub use redaction::scrub_secrets;
pub use registry::{all_descriptors, descriptor, is_disabled, sorted_for_picker, PickerEntry, WidgetDescriptor};
pub use session::DashboardSession;
pub use sync::{ClientConfig, HttpSettingsClient, SettingsBackend, DEFAULT_BASE_URL, ENV_BASE_URL};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(app_data_dir: &Path) -> AppResult<()> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| AppError::Io(error.to_string()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "dashboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
