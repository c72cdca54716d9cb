//! Overlay-Layer: Art, Quelle und Darstellungszustand.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Art eines Overlays. Bestimmt die feste Z-Ordnung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    /// Bilddienst mit Parametern (z.B. WMS-Layer mit TIME)
    StaticParam,
    /// Erst auf Anfrage vom Backend geholte Tile-URL
    DemandFetched,
    /// Einzelbild einer animierten Zeitreihe
    Animated,
}

impl LayerKind {
    /// Z-Ordnung der Basiskarte.
    pub const BASE_Z_ORDER: i32 = 0;
    /// Z-Ordnung der Feldgrenzen (Vektor-Overlay, liegt über allen Rastern).
    pub const FIELD_BOUNDARY_Z_ORDER: i32 = 100;

    /// Feste Z-Ordnung dieser Layer-Art.
    pub fn z_order(self) -> i32 {
        match self {
            LayerKind::StaticParam => 10,
            LayerKind::DemandFetched => 20,
            LayerKind::Animated => 30,
        }
    }
}

/// Quelle eines Overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LayerSource {
    /// Parametrisierter Bilddienst (Dienst-URL + benannte Parameter)
    ImageService {
        url: String,
        #[serde(default)]
        params: IndexMap<String, String>,
        /// Name des zeitartigen Parameters (z.B. "TIME"), falls vorhanden
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_param: Option<String>,
    },
    /// Tile-URL-Template (`{z}/{x}/{y}`)
    TileTemplate { url: String },
}

impl LayerSource {
    /// Kurzform für ein Tile-Template.
    pub fn tiles(url: impl Into<String>) -> Self {
        LayerSource::TileTemplate { url: url.into() }
    }

    /// Aktueller Wert des Zeitparameters, falls die Quelle einen hat.
    pub fn time(&self) -> Option<&str> {
        match self {
            LayerSource::ImageService {
                params, time_param, ..
            } => time_param
                .as_deref()
                .and_then(|name| params.get(name))
                .map(String::as_str),
            LayerSource::TileTemplate { .. } => None,
        }
    }

    /// Gibt eine Kopie mit neuem Zeitwert zurück.
    ///
    /// `None`, wenn die Quelle keinen Zeitparameter kennt.
    pub fn with_time(&self, time: &str) -> Option<Self> {
        match self {
            LayerSource::ImageService {
                url,
                params,
                time_param: Some(name),
            } => {
                let mut params = params.clone();
                params.insert(name.clone(), time.to_string());
                Some(LayerSource::ImageService {
                    url: url.clone(),
                    params,
                    time_param: Some(name.clone()),
                })
            }
            _ => None,
        }
    }
}

/// Kanonischer Zustand eines Overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub key: String,
    pub kind: LayerKind,
    pub visible: bool,
    /// Deckkraft in [0, 1]
    pub opacity: f32,
    pub z_order: i32,
    /// `None` bis zum ersten erfolgreichen Abruf (Demand/Animated)
    pub source: Option<LayerSource>,
}

impl OverlayLayer {
    /// Erstellt einen unsichtbaren Layer mit der Z-Ordnung seiner Art.
    pub fn new(key: impl Into<String>, kind: LayerKind, source: Option<LayerSource>) -> Self {
        Self {
            key: key.into(),
            kind,
            visible: false,
            opacity: 1.0,
            z_order: kind.z_order(),
            source,
        }
    }

    /// Setzt die Start-Deckkraft (geklemmt).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        if opacity.is_finite() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        self
    }
}
