//! Fehlertypen der Engine.

use agrimap_raster_api::BackendError;

/// Fehlschlag eines Remote-Abrufs.
///
/// `Clone`, da mehrere Wartende dasselbe Ergebnis eines laufenden Abrufs teilen.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Backend-Fehler: {0}")]
    Backend(String),
    #[error("Ungültige Antwort: {0}")]
    InvalidPayload(String),
}

impl From<BackendError> for FetchError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Decode(e) => FetchError::InvalidPayload(e.to_string()),
            other => FetchError::Backend(other.to_string()),
        }
    }
}

/// Fehler bei der Ausführung eines Commands.
///
/// Keiner ist fatal; die Fassade protokolliert sie und meldet nur
/// `FetchFailed` an die Host-UI.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Abruf für '{key}' fehlgeschlagen: {source}")]
    FetchFailed {
        key: String,
        #[source]
        source: FetchError,
    },
    #[error("Unbekannter Layer oder Gruppe: '{0}'")]
    InvalidKey(String),
    #[error("Zeitreihe ist leer")]
    EmptySequence,
    #[error("Kein Feld ausgewählt")]
    NoActiveField,
    #[error("Für '{0}' liegt keine Anfrage vor")]
    MissingQuery(String),
    #[error("Antwort für '{0}' ist veraltet")]
    Superseded(String),
}

impl EngineError {
    /// Gibt `true` zurück, wenn der Fehler dem Nutzer gemeldet wird.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, EngineError::FetchFailed { .. })
    }
}
