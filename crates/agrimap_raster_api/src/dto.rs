//! Anfragen und Antwortformen des Raster-Backends.
//!
//! Die Feldnamen folgen dem JSON des Backends (`snake_case`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::FieldGeometry;

/// Antwort auf eine Anbauflächen-Anfrage (z.B. "maize").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandLayerResponse {
    /// Backend-Erfolgsflag; `false` gilt als Fehlschlag, auch bei HTTP 200
    pub success: bool,
    /// Tile-URL-Template (`{z}/{x}/{y}`)
    #[serde(default)]
    pub tile_url: Option<String>,
    /// Optionale Fehlermeldung des Backends
    #[serde(default)]
    pub message: Option<String>,
}

impl DemandLayerResponse {
    /// Erfolgreiche Antwort mit Tile-URL.
    pub fn ok(tile_url: impl Into<String>) -> Self {
        Self {
            success: true,
            tile_url: Some(tile_url.into()),
            message: None,
        }
    }

    /// Gibt die Tile-URL nur zurück, wenn die Antwort verwertbar ist.
    pub fn usable_tile_url(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.tile_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Zeitreihen-Anfrage für einen Index über einen Datumsbereich.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesQuery {
    /// Index-Name (z.B. "NDVI")
    pub index_key: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub geometry: FieldGeometry,
}

/// Zeitreihen-Antwort.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeriesResponse {
    #[serde(default)]
    pub results: Vec<TimeSeriesRecord>,
}

/// Ein Eintrag der Zeitreihe, so wie ihn das Backend liefert.
///
/// Das Datum bleibt roh (`YYYY-MM-DD`); die Engine parst und sortiert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    pub date: String,
    #[serde(default)]
    pub mean_index_value: Option<f64>,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
    #[serde(default)]
    pub tile_url: Option<String>,
}

/// Heatmap-Anfrage für einen Index an einem Datum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMapQuery {
    pub index_key: String,
    pub date: NaiveDate,
    pub geometry: FieldGeometry,
}

/// Heatmap-Antwort inkl. Legendenparametern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMapResponse {
    pub tile_url: String,
    pub vis_params: VisParams,
    /// Datum des tatsächlich verwendeten Bildes (kann vom angefragten abweichen)
    #[serde(default)]
    pub first_image_date: Option<String>,
}

/// Visualisierungsparameter (Farbskala der Legende).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    /// Hex-Farben von `min` nach `max`
    #[serde(default)]
    pub palette: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_series_response_accepts_missing_optional_fields() {
        let json = r#"{ "results": [ { "date": "2024-01-01", "tile_url": "https://t/1/{z}/{x}/{y}" } ] }"#;
        let response: TimeSeriesResponse = serde_json::from_str(json).expect("gültiges JSON");

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].mean_index_value, None);
        assert_eq!(response.results[0].cloud_cover, None);
    }

    #[test]
    fn demand_response_without_success_is_not_usable() {
        let json = r#"{ "success": false, "tile_url": "https://t/{z}/{x}/{y}" }"#;
        let response: DemandLayerResponse = serde_json::from_str(json).expect("gültiges JSON");
        assert!(response.usable_tile_url().is_none());
    }

    #[test]
    fn demand_response_with_blank_url_is_not_usable() {
        let response = DemandLayerResponse::ok("   ");
        assert!(response.usable_tile_url().is_none());
    }

    #[test]
    fn heat_map_response_parses_vis_params() {
        let json = r##"{
            "tile_url": "https://t/heat/{z}/{x}/{y}",
            "vis_params": { "min": -0.2, "max": 0.9, "palette": ["#d7191c", "#1a9641"] },
            "first_image_date": "2024-05-03"
        }"##;
        let response: HeatMapResponse = serde_json::from_str(json).expect("gültiges JSON");

        assert_eq!(response.vis_params.palette.len(), 2);
        assert_eq!(response.first_image_date.as_deref(), Some("2024-05-03"));
    }
}
