//! Zentrale Konfiguration der Overlay-Engine.
//!
//! `EngineOptions` enthält Layer-Katalog, Gruppen und Verhaltensschalter.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{ExclusiveGroup, LayerKind, LayerSource, OverlayLayer, PlaybackSpeed};

// ── Ansicht ─────────────────────────────────────────────────────────

/// Ziel-Zoom nach Aktivierung eines exklusiven Layers.
pub const NORMALIZE_ZOOM: u8 = 9;
/// Zoom beim Wechsel auf ein Feld.
pub const FIELD_ZOOM: u8 = 14;

// ── Layer-Keys ──────────────────────────────────────────────────────

/// Layer, in dem die Zeitreihen-Bilder erscheinen.
pub const TIME_SERIES_LAYER_KEY: &str = "timeSeries";
/// Layer der Index-Heatmap.
pub const HEAT_MAP_LAYER_KEY: &str = "heatMap";
/// Gruppe der parametrisierten WMS-Layer.
pub const WMS_GROUP_ID: &str = "wms";

// ── Meldungen ───────────────────────────────────────────────────────

/// Nutzer-Meldung bei fehlgeschlagenem Abruf.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch valid data. Please try again.";
/// Nutzer-Meldung, wenn eine Zeitreihe keine Bilder enthält.
pub const EMPTY_SERIES_MESSAGE: &str = "No images found for the selected period.";

const WMS_URL: &str = "https://wms.agrimap.example/geoserver/ows";
const DEFAULT_TIME: &str = "2024-01-01";

/// Ein Eintrag des Layer-Katalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub key: String,
    pub kind: LayerKind,
    /// Statische Quelle; bei abgerufenen Layern leer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<LayerSource>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl LayerSpec {
    /// Baut den (unsichtbaren) Registry-Eintrag.
    pub fn to_layer(&self) -> OverlayLayer {
        OverlayLayer::new(self.key.clone(), self.kind, self.source.clone()).with_opacity(self.opacity)
    }
}

fn default_opacity() -> f32 {
    1.0
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle konfigurierbaren Engine-Optionen.
/// Wird als `agrimap_overlay.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    // ── Ansicht ─────────────────────────────────────────────────
    /// `NormalizeView` nach Aktivierung eines Gruppenmitglieds senden
    #[serde(default = "default_true")]
    pub normalize_view_on_activate: bool,
    /// Ziel-Zoom der Normalisierung
    #[serde(default = "default_normalize_zoom")]
    pub normalize_zoom: u8,
    /// Zoom beim Feldwechsel
    #[serde(default = "default_field_zoom")]
    pub field_zoom: u8,

    // ── Zeitreihen ──────────────────────────────────────────────
    /// Start-Geschwindigkeit des Playbacks
    #[serde(default)]
    pub playback_speed: PlaybackSpeed,
    /// Layer-Key der Zeitreihen-Bilder
    #[serde(default = "default_time_series_layer_key")]
    pub time_series_layer_key: String,
    /// Layer-Key der Heatmap
    #[serde(default = "default_heat_map_layer_key")]
    pub heat_map_layer_key: String,

    // ── Demand-Cache ────────────────────────────────────────────
    /// Maximales Alter gecachter Abrufe in Sekunden (`None` = kein Ablauf)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_cache_max_age_secs: Option<u64>,
    /// Meldung bei fehlgeschlagenem Abruf
    #[serde(default = "default_fetch_error_message")]
    pub fetch_error_message: String,

    // ── Katalog ─────────────────────────────────────────────────
    /// Nach Feldwechsel sichtbare Layer
    #[serde(default)]
    pub default_visible_layers: Vec<String>,
    /// Alle Overlays der Sitzung
    pub layers: Vec<LayerSpec>,
    /// Exklusive Gruppen
    #[serde(default)]
    pub groups: Vec<ExclusiveGroup>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        let mut layers: Vec<LayerSpec> = ["yield", "vhi", "precipitation"]
            .into_iter()
            .map(|name| LayerSpec {
                key: name.to_string(),
                kind: LayerKind::StaticParam,
                source: Some(wms_source(name)),
                opacity: 0.8,
            })
            .collect();
        layers.extend(["maize", "wheat", "soybean"].into_iter().map(|crop| LayerSpec {
            key: crop.to_string(),
            kind: LayerKind::DemandFetched,
            source: None,
            opacity: 1.0,
        }));
        layers.push(LayerSpec {
            key: HEAT_MAP_LAYER_KEY.to_string(),
            kind: LayerKind::DemandFetched,
            source: None,
            opacity: 1.0,
        });
        layers.push(LayerSpec {
            key: TIME_SERIES_LAYER_KEY.to_string(),
            kind: LayerKind::Animated,
            source: None,
            opacity: 1.0,
        });

        Self {
            normalize_view_on_activate: true,
            normalize_zoom: NORMALIZE_ZOOM,
            field_zoom: FIELD_ZOOM,
            playback_speed: PlaybackSpeed::default(),
            time_series_layer_key: TIME_SERIES_LAYER_KEY.to_string(),
            heat_map_layer_key: HEAT_MAP_LAYER_KEY.to_string(),
            demand_cache_max_age_secs: None,
            fetch_error_message: FETCH_ERROR_MESSAGE.to_string(),
            default_visible_layers: Vec::new(),
            layers,
            groups: vec![ExclusiveGroup::new(
                WMS_GROUP_ID,
                ["yield", "vhi", "precipitation"],
            )],
        }
    }
}

fn wms_source(layer: &str) -> LayerSource {
    let mut params = IndexMap::new();
    params.insert("SERVICE".to_string(), "WMS".to_string());
    params.insert("LAYERS".to_string(), format!("agrimap:{}", layer));
    params.insert("FORMAT".to_string(), "image/png".to_string());
    params.insert("TRANSPARENT".to_string(), "true".to_string());
    params.insert("TIME".to_string(), DEFAULT_TIME.to_string());
    LayerSource::ImageService {
        url: WMS_URL.to_string(),
        params,
        time_param: Some("TIME".to_string()),
    }
}

fn default_true() -> bool {
    true
}

fn default_normalize_zoom() -> u8 {
    NORMALIZE_ZOOM
}

fn default_field_zoom() -> u8 {
    FIELD_ZOOM
}

fn default_time_series_layer_key() -> String {
    TIME_SERIES_LAYER_KEY.to_string()
}

fn default_heat_map_layer_key() -> String {
    HEAT_MAP_LAYER_KEY.to_string()
}

fn default_fetch_error_message() -> String {
    FETCH_ERROR_MESSAGE.to_string()
}

impl EngineOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("agrimap_overlay"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("agrimap_overlay.toml")
    }

    /// Ziel-Zoom für `NormalizeView` nach Gruppen-Aktivierung, falls aktiv.
    pub fn normalize_target(&self) -> Option<u8> {
        self.normalize_view_on_activate.then_some(self.normalize_zoom)
    }

    /// Maximales Cache-Alter als `chrono::Duration`.
    pub fn demand_cache_max_age(&self) -> Option<chrono::Duration> {
        self.demand_cache_max_age_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }

    /// Registry-Einträge des Katalogs.
    pub fn catalog(&self) -> Vec<OverlayLayer> {
        self.layers.iter().map(LayerSpec::to_layer).collect()
    }

    /// Katalog-Eintrag zu `key`.
    pub fn layer_spec(&self, key: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|spec| spec.key == key)
    }
}
