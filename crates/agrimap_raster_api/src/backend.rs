//! Backend-Schnittstelle für Raster-Produkte.

use async_trait::async_trait;

use crate::{
    DemandLayerResponse, Field, HeatMapQuery, HeatMapResponse, TimeSeriesQuery,
    TimeSeriesResponse,
};

/// Fehler beim Zugriff auf das Raster-Backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Netzwerk- oder Transportfehler
    #[error("Transportfehler: {0}")]
    Transport(String),
    /// Antwort nicht deserialisierbar
    #[error("Antwort nicht lesbar: {0}")]
    Decode(#[from] serde_json::Error),
    /// Für die Anfrage liegen keine Daten vor
    #[error("Keine Daten für '{0}'")]
    NotFound(String),
}

/// Abstrakter Raster-Dienst.
///
/// Implementierungen dürfen beliebig lange brauchen; die Engine ruft sie
/// nie unter einem Lock auf und startet pro Cache-Key höchstens einen
/// Demand-Fetch gleichzeitig.
#[async_trait]
pub trait RasterBackend: Send + Sync {
    /// Holt die Tile-URL einer Anbauflächen-Maske für das Feld.
    async fn fetch_demand_layer(
        &self,
        key: &str,
        field: &Field,
    ) -> Result<DemandLayerResponse, BackendError>;

    /// Holt die Bildliste einer Index-Zeitreihe.
    async fn fetch_time_series(
        &self,
        query: &TimeSeriesQuery,
    ) -> Result<TimeSeriesResponse, BackendError>;

    /// Holt eine Index-Heatmap mit Legendenparametern.
    async fn fetch_heat_map(&self, query: &HeatMapQuery) -> Result<HeatMapResponse, BackendError>;
}
