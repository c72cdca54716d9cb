//! Kanonischer Zustand aller Overlays (Sichtbarkeit, Deckkraft, Z-Ordnung, Quelle).
//!
//! Jede Mutation liefert genau die Render-Direktiven für tatsächlich
//! geänderte Layer. Wiederholte Aufrufe mit gleichem Zielzustand sind leer.

use indexmap::IndexMap;

use super::{LayerSource, OverlayLayer};
use crate::shared::RenderDirective;

/// Registry der Overlays einer Sitzung.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: IndexMap<String, OverlayLayer>,
    /// Monotoner Zähler für `cache_bust`, überlebt `reset`
    cache_bust: u64,
}

impl LayerRegistry {
    /// Erstellt eine leere Registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Erstellt eine Registry aus einem Layer-Katalog.
    pub fn from_layers(layers: impl IntoIterator<Item = OverlayLayer>) -> Self {
        let mut registry = Self::new();
        for layer in layers {
            registry.register(layer);
        }
        registry
    }

    /// Registriert einen Layer (ersetzt einen gleichnamigen).
    pub fn register(&mut self, layer: OverlayLayer) {
        self.layers.insert(layer.key.clone(), layer);
    }

    /// Ersetzt alle Layer durch den übergebenen Katalog.
    ///
    /// Erzeugt keine Direktiven; sichtbare Layer müssen vorher per
    /// `hide_all` entfernt werden.
    pub fn reset(&mut self, layers: impl IntoIterator<Item = OverlayLayer>) {
        self.layers.clear();
        for layer in layers {
            self.register(layer);
        }
    }

    /// Anzahl registrierter Layer.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Gibt `true` zurück, wenn keine Layer registriert sind.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Gibt `true` zurück, wenn `key` registriert ist.
    pub fn contains(&self, key: &str) -> bool {
        self.layers.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&OverlayLayer> {
        self.layers.get(key)
    }

    /// Gibt `true` zurück, wenn `key` registriert und sichtbar ist.
    pub fn is_visible(&self, key: &str) -> bool {
        self.layers.get(key).is_some_and(|layer| layer.visible)
    }

    /// Keys aller sichtbaren Layer in Registrierungsreihenfolge.
    pub fn visible_keys(&self) -> Vec<String> {
        self.layers
            .values()
            .filter(|layer| layer.visible)
            .map(|layer| layer.key.clone())
            .collect()
    }

    /// Setzt die Sichtbarkeit eines Layers.
    ///
    /// Unbekannte Keys sind ein stiller No-op. Ein Layer ohne Quelle wird
    /// nicht eingeblendet.
    pub fn set_visibility(&mut self, key: &str, visible: bool) -> Vec<RenderDirective> {
        let Some(layer) = self.layers.get(key) else {
            log::debug!("Sichtbarkeit für unbekannten Layer '{}' ignoriert", key);
            return Vec::new();
        };
        if layer.visible == visible {
            return Vec::new();
        }
        if visible && layer.source.is_none() {
            log::warn!("Layer '{}' hat keine Quelle und bleibt ausgeblendet", key);
            return Vec::new();
        }

        if visible {
            let cache_bust = self.next_cache_bust();
            let Some(layer) = self.layers.get_mut(key) else {
                return Vec::new();
            };
            let Some(source) = layer.source.clone() else {
                return Vec::new();
            };
            layer.visible = true;
            vec![RenderDirective::Show {
                layer_key: layer.key.clone(),
                z_order: layer.z_order,
                opacity: layer.opacity,
                source,
                cache_bust,
            }]
        } else {
            if let Some(layer) = self.layers.get_mut(key) {
                layer.visible = false;
            }
            vec![RenderDirective::hide(key)]
        }
    }

    /// Setzt die Deckkraft (auf [0, 1] geklemmt).
    ///
    /// Liefert `None` bei unbekanntem Key, nicht-endlichem Wert oder
    /// unverändertem Ergebnis.
    pub fn set_opacity(&mut self, key: &str, value: f32) -> Option<RenderDirective> {
        if !value.is_finite() {
            log::debug!("Ungültige Deckkraft {} für '{}' ignoriert", value, key);
            return None;
        }
        let Some(layer) = self.layers.get_mut(key) else {
            log::debug!("Deckkraft für unbekannten Layer '{}' ignoriert", key);
            return None;
        };
        let opacity = value.clamp(0.0, 1.0);
        if layer.opacity == opacity {
            return None;
        }
        layer.opacity = opacity;
        Some(RenderDirective::SetOpacity {
            layer_key: layer.key.clone(),
            opacity,
        })
    }

    /// Ersetzt die Quelle eines Layers.
    ///
    /// Eine Direktive entsteht nur, wenn der Layer sichtbar ist und sich die
    /// Quelle geändert hat.
    pub fn set_source(&mut self, key: &str, source: LayerSource) -> Option<RenderDirective> {
        let Some(layer) = self.layers.get_mut(key) else {
            log::debug!("Quelle für unbekannten Layer '{}' ignoriert", key);
            return None;
        };
        if layer.source.as_ref() == Some(&source) {
            return None;
        }
        layer.source = Some(source.clone());
        if !layer.visible {
            return None;
        }
        let layer_key = layer.key.clone();
        Some(RenderDirective::SetSource {
            layer_key,
            source,
            cache_bust: self.next_cache_bust(),
        })
    }

    /// Setzt den Zeitparameter eines Bilddienst-Layers.
    ///
    /// Ein geänderter Zeitwert erzwingt bei sichtbarem Layer ein Neuladen
    /// mit frischem `cache_bust`.
    pub fn set_time(&mut self, key: &str, time: &str) -> Option<RenderDirective> {
        let source = self.layers.get(key)?.source.as_ref()?;
        if source.time() == Some(time) {
            return None;
        }
        let Some(updated) = source.with_time(time) else {
            log::debug!("Layer '{}' hat keinen Zeitparameter", key);
            return None;
        };
        self.set_source(key, updated)
    }

    /// Lädt einen sichtbaren Layer mit neuem `cache_bust` neu.
    pub fn refresh(&mut self, key: &str) -> Option<RenderDirective> {
        let layer = self.layers.get(key)?;
        if !layer.visible {
            return None;
        }
        let source = layer.source.clone()?;
        Some(RenderDirective::SetSource {
            layer_key: key.to_string(),
            source,
            cache_bust: self.next_cache_bust(),
        })
    }

    /// Blendet alle sichtbaren Layer aus.
    pub fn hide_all(&mut self) -> Vec<RenderDirective> {
        self.layers
            .values_mut()
            .filter(|layer| layer.visible)
            .map(|layer| {
                layer.visible = false;
                RenderDirective::hide(&layer.key)
            })
            .collect()
    }

    /// Sichtbarkeit aller Layer.
    pub fn snapshot_visibility(&self) -> IndexMap<String, bool> {
        self.layers
            .values()
            .map(|layer| (layer.key.clone(), layer.visible))
            .collect()
    }

    /// Deckkraft aller Layer.
    pub fn snapshot_opacity(&self) -> IndexMap<String, f32> {
        self.layers
            .values()
            .map(|layer| (layer.key.clone(), layer.opacity))
            .collect()
    }

    fn next_cache_bust(&mut self) -> u64 {
        self.cache_bust += 1;
        self.cache_bust
    }
}
