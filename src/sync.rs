use crate::auth::TokenSource;
use crate::errors::{AppError, AppResult};
use crate::models::{SaveWidgetSettingsPayload, WidgetInstance, WidgetSettingsEnvelope};
use reqwest::StatusCode;
use std::future::Future;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://api.commandly.app";
pub const ENV_BASE_URL: &str = "COMMANDLY_API_BASE";

const SETTINGS_PATH: &str = "/widget-settings";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn from_env() -> Self {
        match std::env::var(ENV_BASE_URL) {
            Ok(value) if !value.is_empty() => Self::new(value),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    pub fn settings_url(&self) -> String {
        format!("{}{}", self.base_url, SETTINGS_PATH)
    }
}

/// Seam between the dashboard session and the persisted settings resource.
/// Production uses [`HttpSettingsClient`]; tests inject an in-memory fake.
pub trait SettingsBackend {
    fn fetch_settings(&self) -> impl Future<Output = AppResult<WidgetSettingsEnvelope>> + Send;

    fn store_settings(
        &self,
        settings: &[WidgetInstance],
    ) -> impl Future<Output = AppResult<WidgetSettingsEnvelope>> + Send;
}

pub struct HttpSettingsClient {
    http: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenSource>,
}

impl HttpSettingsClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            tokens,
        }
    }

    fn bearer(&self) -> AppResult<String> {
        match self.tokens.token()? {
            Some(token) => Ok(format!("Bearer {token}")),
            None => Err(AppError::Auth("no bearer token available".to_string())),
        }
    }
}

impl SettingsBackend for HttpSettingsClient {
    async fn fetch_settings(&self) -> AppResult<WidgetSettingsEnvelope> {
        let bearer = self.bearer()?;
        let response = self
            .http
            .get(self.config.settings_url())
            .header(reqwest::header::AUTHORIZATION, bearer)
            .send()
            .await?;
        parse_envelope(response).await
    }

    async fn store_settings(&self, settings: &[WidgetInstance]) -> AppResult<WidgetSettingsEnvelope> {
        let bearer = self.bearer()?;
        let payload = SaveWidgetSettingsPayload {
            settings: settings.to_vec(),
        };
        let response = self
            .http
            .put(self.config.settings_url())
            .header(reqwest::header::AUTHORIZATION, bearer)
            .json(&payload)
            .send()
            .await?;
        parse_envelope(response).await
    }
}

async fn parse_envelope(response: reqwest::Response) -> AppResult<WidgetSettingsEnvelope> {
    if let Some(error) = map_status(response.status()) {
        return Err(error);
    }
    response
        .json::<WidgetSettingsEnvelope>()
        .await
        .map_err(|err| AppError::Http(format!("malformed settings payload: {err}")))
}

fn map_status(status: StatusCode) -> Option<AppError> {
    if status.is_success() {
        return None;
    }
    let code = status.as_u16();
    Some(match code {
        401 => AppError::Auth("bearer token rejected".to_string()),
        500..=599 => AppError::Http(format!("backend unavailable ({code})")),
        _ => AppError::Http(format!("unexpected status {code}")),
    })
}
