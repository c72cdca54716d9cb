//! `agrimap_raster_api` — Verträge zum Raster-Backend der Feld-Überwachung.
//!
//! Beschreibt, was die Overlay-Engine vom Backend konsumiert:
//! - Anbauflächen-Masken (Crop-Area-Tiles) pro Layer-Key
//! - Index-Zeitreihen (Datum, Mittelwert, Wolkenbedeckung, Tile-URL)
//! - Index-Heatmaps inkl. Visualisierungsparametern für die Legende
//!
//! Der HTTP-Transport selbst liegt außerhalb dieses Crates; hier leben nur
//! die Antwortformen, der `RasterBackend`-Trait und ein Fixture-Backend.
//!
//! # Beispiel
//! ```no_run
//! use agrimap_raster_api::{FixtureBackend, RasterBackend, TimeSeriesQuery};
//!
//! # async fn demo(query: TimeSeriesQuery) -> Result<(), agrimap_raster_api::BackendError> {
//! let backend = FixtureBackend::from_json(r#"{ "time_series": {} }"#)?;
//! let response = backend.fetch_time_series(&query).await;
//! assert!(response.is_err());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod dto;
pub mod fixture;
pub mod geometry;

pub use backend::{BackendError, RasterBackend};
pub use dto::{
    DemandLayerResponse, HeatMapQuery, HeatMapResponse, TimeSeriesQuery, TimeSeriesRecord,
    TimeSeriesResponse, VisParams,
};
pub use fixture::{FixtureBackend, FixtureSet};
pub use geometry::{Field, FieldGeometry};
