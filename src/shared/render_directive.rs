//! Render-Direktiven als expliziter Übergabevertrag zwischen Engine und Kartenoberfläche.
//!
//! Lebt im shared-Modul, da `app` sie erzeugt und die (externe) Render-Fläche
//! sie konsumiert. Die Engine zeichnet nie selbst.

use glam::DVec2;
use serde::Serialize;

use crate::core::LayerSource;

/// Art einer Render-Direktive (für Filter und Assertions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectiveOp {
    Show,
    Hide,
    SetOpacity,
    SetSource,
    NormalizeView,
}

/// Eine Anweisung an die Render-Fläche.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RenderDirective {
    /// Layer einblenden (inkl. vollständiger Quelle)
    Show {
        layer_key: String,
        z_order: i32,
        opacity: f32,
        source: LayerSource,
        /// Monoton steigendes Token gegen Transport-Caches
        cache_bust: u64,
    },
    /// Layer ausblenden
    Hide { layer_key: String },
    /// Transparenz eines Layers ändern
    SetOpacity { layer_key: String, opacity: f32 },
    /// Quelle eines sichtbaren Layers austauschen oder neu laden
    SetSource {
        layer_key: String,
        source: LayerSource,
        cache_bust: u64,
    },
    /// Ansicht auf festen Zoom (und optional Feld-Schwerpunkt) normalisieren
    NormalizeView {
        target_zoom: u8,
        center: Option<DVec2>,
    },
}

impl RenderDirective {
    /// Gibt die Art der Direktive zurück.
    pub fn op(&self) -> DirectiveOp {
        match self {
            RenderDirective::Show { .. } => DirectiveOp::Show,
            RenderDirective::Hide { .. } => DirectiveOp::Hide,
            RenderDirective::SetOpacity { .. } => DirectiveOp::SetOpacity,
            RenderDirective::SetSource { .. } => DirectiveOp::SetSource,
            RenderDirective::NormalizeView { .. } => DirectiveOp::NormalizeView,
        }
    }

    /// Betroffener Layer-Key (`None` für Ansichts-Direktiven).
    pub fn layer_key(&self) -> Option<&str> {
        match self {
            RenderDirective::Show { layer_key, .. }
            | RenderDirective::Hide { layer_key }
            | RenderDirective::SetOpacity { layer_key, .. }
            | RenderDirective::SetSource { layer_key, .. } => Some(layer_key),
            RenderDirective::NormalizeView { .. } => None,
        }
    }

    /// Kurzform für Hide.
    pub fn hide(layer_key: &str) -> Self {
        RenderDirective::Hide {
            layer_key: layer_key.to_string(),
        }
    }
}
