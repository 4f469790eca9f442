use crate::errors::AppError;
use crate::layout::LayoutModel;
use crate::models::{GridReport, SyncStatus, WidgetInstance, WidgetKind};
use crate::redaction::scrub_secrets;
use crate::registry::{self, PickerEntry};
use crate::sync::SettingsBackend;
use uuid::Uuid;

/// One dashboard session: owns the layout collection, loads it once on
/// mount, and writes the whole collection back after every user mutation.
pub struct DashboardSession<B: SettingsBackend> {
    session_id: Uuid,
    backend: B,
    layout: LayoutModel,
    status: SyncStatus,
    sync_error: Option<String>,
}

impl<B: SettingsBackend> DashboardSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            backend,
            layout: LayoutModel::new(),
            status: SyncStatus::Loading,
            sync_error: None,
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// Inline banner text, if the last processed response was a failure.
    pub fn sync_error(&self) -> Option<&str> {
        self.sync_error.as_deref()
    }

    pub fn widgets(&self) -> &[WidgetInstance] {
        self.layout.instances()
    }

    pub fn picker_entries(&self) -> Vec<PickerEntry> {
        registry::sorted_for_picker(self.layout.instances())
    }

    /// Loads the persisted layout. Any failure falls back to an empty
    /// dashboard; the session stays usable either way.
    pub async fn mount(&mut self) {
        match self.backend.fetch_settings().await {
            Ok(envelope) if envelope.success => {
                let settings = envelope.settings.unwrap_or_default();
                tracing::info!(
                    session = %self.session_id,
                    widgets = settings.len(),
                    "loaded widget settings"
                );
                self.layout.replace_all(settings);
                self.status = SyncStatus::Ready;
                self.sync_error = None;
            }
            Ok(envelope) => {
                let error = AppError::Backend(
                    envelope
                        .error
                        .unwrap_or_else(|| "no usable widget settings".to_string()),
                );
                let message = scrub_secrets(&error.to_string());
                tracing::warn!(session = %self.session_id, %message, "backend reported no usable widget settings");
                self.layout.replace_all(Vec::new());
                self.status = SyncStatus::LoadFailed;
                self.sync_error = Some(message);
            }
            Err(err) => {
                let message = scrub_secrets(&err.to_string());
                tracing::warn!(session = %self.session_id, %message, "widget settings load failed");
                self.layout.replace_all(Vec::new());
                self.status = SyncStatus::LoadFailed;
                self.sync_error = Some(message);
            }
        }
    }

    /// Adds a widget of `kind` and persists. Returns the placed instance,
    /// or `None` when the kind is at capacity (a silent, expected outcome).
    pub async fn add_widget(&mut self, kind: WidgetKind) -> Option<WidgetInstance> {
        let placed = self.layout.add_widget(kind).cloned();
        if let Some(instance) = placed.as_ref() {
            tracing::info!(
                session = %self.session_id,
                widget = %instance.id,
                x = instance.x,
                y = instance.y,
                "widget added"
            );
        }
        self.persist_if_dirty().await;
        placed
    }

    /// Removes a widget by id and persists. Unknown ids are a no-op.
    pub async fn remove_widget(&mut self, id: &str) -> bool {
        let removed = self.layout.remove_widget(id);
        if removed {
            tracing::info!(session = %self.session_id, widget = id, "widget removed");
        }
        self.persist_if_dirty().await;
        removed
    }

    /// Consumes a drag-driven grid report. Only the largest breakpoint's
    /// positions are applied and persisted; the rest are discarded because
    /// the backend schema stores a single layout.
    pub async fn apply_grid_report(&mut self, report: &GridReport) {
        if let Some(positions) = report.largest() {
            let moved = self.layout.apply_layout_change(positions);
            if moved > 0 {
                tracing::info!(session = %self.session_id, moved, "widgets repositioned");
            }
        }
        self.persist_if_dirty().await;
    }

    /// One full-collection PUT per discrete mutation. No diffing, no
    /// coalescing, no rollback on failure, no automatic retry.
    async fn persist_if_dirty(&mut self) {
        if !self.layout.take_dirty() || self.layout.is_empty() {
            return;
        }

        match self.backend.store_settings(self.layout.instances()).await {
            Ok(envelope) if envelope.success => {
                tracing::debug!(
                    session = %self.session_id,
                    widgets = self.layout.len(),
                    "widget settings saved"
                );
                self.sync_error = None;
            }
            Ok(envelope) => {
                let error = AppError::Backend(
                    envelope
                        .error
                        .unwrap_or_else(|| "the dashboard could not be saved".to_string()),
                );
                let message = scrub_secrets(&error.to_string());
                tracing::warn!(session = %self.session_id, %message, "backend rejected widget settings");
                self.sync_error = Some(message);
            }
            Err(err) => {
                let message = scrub_secrets(&err.to_string());
                tracing::warn!(session = %self.session_id, %message, "widget settings save failed");
                self.sync_error = Some(message);
            }
        }
    }
}
