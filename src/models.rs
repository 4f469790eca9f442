use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Stats,
    Clips,
    Clock,
    Diagram,
    Chat,
}

impl WidgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::Clips => "clips",
            Self::Clock => "clock",
            Self::Diagram => "diagram",
            Self::Chat => "chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub static_h: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
}

/// Per-breakpoint positions as reported by the grid component after a drag.
/// Only the `lg` breakpoint is ever persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridReport {
    pub breakpoints: HashMap<String, HashMap<String, GridPosition>>,
}

impl GridReport {
    pub const PERSISTED_BREAKPOINT: &'static str = "lg";

    pub fn largest(&self) -> Option<&HashMap<String, GridPosition>> {
        self.breakpoints.get(Self::PERSISTED_BREAKPOINT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettingsEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<WidgetInstance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWidgetSettingsPayload {
    pub settings: Vec<WidgetInstance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    Loading,
    Ready,
    LoadFailed,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::LoadFailed => "load-failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_kind_serializes_lowercase() {
        let json = serde_json::to_string(&WidgetKind::Diagram).unwrap();
        assert_eq!(json, "\"diagram\"");
        let kind: WidgetKind = serde_json::from_str("\"clips\"").unwrap();
        assert_eq!(kind, WidgetKind::Clips);
    }

    #[test]
    fn widget_instance_uses_backend_field_names() {
        let instance = WidgetInstance {
            id: "clock-1700000000000".to_string(),
            kind: WidgetKind::Clock,
            x: 0,
            y: 2,
            w: 2,
            h: 2,
            static_h: true,
        };
        let value = serde_json::to_value(&instance).unwrap();
        assert_eq!(value["type"], "clock");
        assert_eq!(value["staticH"], true);
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn settings_round_trip_preserves_collection() {
        let settings = vec![
            WidgetInstance {
                id: "stats-1700000000001".to_string(),
                kind: WidgetKind::Stats,
                x: 0,
                y: 0,
                w: 4,
                h: 2,
                static_h: true,
            },
            WidgetInstance {
                id: "chat-1700000000002".to_string(),
                kind: WidgetKind::Chat,
                x: 4,
                y: 0,
                w: 3,
                h: 4,
                static_h: true,
            },
        ];

        let body = serde_json::to_value(&SaveWidgetSettingsPayload {
            settings: settings.clone(),
        })
        .unwrap();
        let response = serde_json::json!({ "success": true, "settings": body["settings"] });

        let envelope: WidgetSettingsEnvelope = serde_json::from_value(response).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.settings.unwrap(), settings);
    }

    #[test]
    fn envelope_tolerates_missing_settings() {
        let envelope: WidgetSettingsEnvelope =
            serde_json::from_str("{\"success\":false,\"error\":\"no saved layout\"}").unwrap();
        assert!(!envelope.success);
        assert!(envelope.settings.is_none());
        assert_eq!(envelope.error.as_deref(), Some("no saved layout"));
    }
}
