//! Benachrichtigungen für die Host-UI (Spinner, Toasts, Legende, Datumsanzeige).

use chrono::NaiveDate;
use serde::Serialize;

use super::RenderDirective;

/// Art einer Benachrichtigung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    LoadingStart,
    LoadingEnd,
    Error,
    FrameChanged,
    Legend,
}

/// Ereignis für die Host-UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NotificationEvent {
    /// Ein Abruf für `layer_key` läuft (Spinner an)
    LoadingStart { layer_key: String, message: String },
    /// Der Abruf für `layer_key` ist beendet, egal mit welchem Ergebnis
    LoadingEnd { layer_key: String },
    /// Nutzer-sichtbarer Fehler (Toast)
    Error { message: String },
    /// Aktuell dargestellte Beobachtung der Zeitreihe
    FrameChanged {
        index: usize,
        total: usize,
        date: NaiveDate,
        value: Option<f64>,
        cloud_cover: Option<f64>,
    },
    /// Legende einer Heatmap
    Legend {
        layer_key: String,
        min: f64,
        max: f64,
        palette: Vec<String>,
        first_image_date: Option<String>,
    },
}

impl NotificationEvent {
    /// Gibt die Art der Benachrichtigung zurück.
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::LoadingStart { .. } => NotificationKind::LoadingStart,
            NotificationEvent::LoadingEnd { .. } => NotificationKind::LoadingEnd,
            NotificationEvent::Error { .. } => NotificationKind::Error,
            NotificationEvent::FrameChanged { .. } => NotificationKind::FrameChanged,
            NotificationEvent::Legend { .. } => NotificationKind::Legend,
        }
    }
}

/// Ein Eintrag der Ausgabeströme der Engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stream", content = "event", rename_all = "camelCase")]
pub enum EngineEvent {
    Render(RenderDirective),
    Notify(NotificationEvent),
}

impl EngineEvent {
    /// Gibt die Render-Direktive zurück, falls es eine ist.
    pub fn as_render(&self) -> Option<&RenderDirective> {
        match self {
            EngineEvent::Render(directive) => Some(directive),
            EngineEvent::Notify(_) => None,
        }
    }

    /// Gibt die Benachrichtigung zurück, falls es eine ist.
    pub fn as_notification(&self) -> Option<&NotificationEvent> {
        match self {
            EngineEvent::Notify(event) => Some(event),
            EngineEvent::Render(_) => None,
        }
    }
}
