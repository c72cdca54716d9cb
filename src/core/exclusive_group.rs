//! Exklusive Gruppen: höchstens ein sichtbares Mitglied pro Gruppe.

use glam::DVec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::LayerRegistry;
use crate::shared::RenderDirective;

/// Benannte Gruppe sich gegenseitig ausschließender Layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusiveGroup {
    pub id: String,
    pub members: Vec<String>,
}

impl ExclusiveGroup {
    pub fn new(id: impl Into<String>, members: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.members.iter().any(|member| member == key)
    }
}

/// Erzwingt die Exklusivität und erzeugt die Ansichts-Normalisierung.
///
/// Hält selbst keinen Sichtbarkeitszustand; die Wahrheit liegt in der
/// `LayerRegistry`.
#[derive(Debug, Default)]
pub struct ExclusiveGroupController {
    groups: IndexMap<String, ExclusiveGroup>,
    /// Ziel-Zoom nach Aktivierung (`None` = keine Normalisierung)
    normalize_zoom: Option<u8>,
    view_center: Option<DVec2>,
}

impl ExclusiveGroupController {
    /// Erstellt einen Controller ohne Gruppen.
    pub fn new(normalize_zoom: Option<u8>) -> Self {
        Self {
            normalize_zoom,
            ..Self::default()
        }
    }

    /// Registriert eine Gruppe (ersetzt eine gleichnamige).
    pub fn add_group(&mut self, group: ExclusiveGroup) {
        self.groups.insert(group.id.clone(), group);
    }

    pub fn group(&self, group_id: &str) -> Option<&ExclusiveGroup> {
        self.groups.get(group_id)
    }

    /// Erste Gruppe, die `key` enthält.
    pub fn group_of(&self, key: &str) -> Option<&str> {
        self.groups
            .values()
            .find(|group| group.contains(key))
            .map(|group| group.id.as_str())
    }

    /// Setzt den Mittelpunkt, den `NormalizeView` mitgibt (Feld-Schwerpunkt).
    pub fn set_view_center(&mut self, center: Option<DVec2>) {
        self.view_center = center;
    }

    /// Aktiviert `key` in `group_id`.
    ///
    /// Blendet alle anderen sichtbaren Mitglieder aus, zeigt `key` und
    /// normalisiert danach die Ansicht. Ist `key` bereits aktiv, wird er
    /// nur neu geladen.
    pub fn activate(
        &self,
        registry: &mut LayerRegistry,
        group_id: &str,
        key: &str,
    ) -> Vec<RenderDirective> {
        let Some(group) = self.member_group(group_id, key) else {
            return Vec::new();
        };

        if registry.is_visible(key) {
            return registry.refresh(key).into_iter().collect();
        }
        if !registry.get(key).is_some_and(|layer| layer.source.is_some()) {
            log::warn!("Layer '{}' hat keine Quelle, Gruppe '{}' bleibt unverändert", key, group_id);
            return Vec::new();
        }

        let mut directives = Vec::new();
        for sibling in group.members.iter().filter(|member| *member != key) {
            directives.extend(registry.set_visibility(sibling, false));
        }
        directives.extend(registry.set_visibility(key, true));

        if let Some(target_zoom) = self.normalize_zoom {
            directives.push(RenderDirective::NormalizeView {
                target_zoom,
                center: self.view_center,
            });
        }
        log::info!("Gruppe '{}': '{}' aktiviert", group_id, key);
        directives
    }

    /// Blendet `key` aus (nur diesen Layer).
    pub fn deactivate(
        &self,
        registry: &mut LayerRegistry,
        group_id: &str,
        key: &str,
    ) -> Vec<RenderDirective> {
        if self.member_group(group_id, key).is_none() {
            return Vec::new();
        }
        registry.set_visibility(key, false)
    }

    /// Aktuell sichtbares Mitglied der Gruppe.
    pub fn active_member(&self, registry: &LayerRegistry, group_id: &str) -> Option<String> {
        self.groups
            .get(group_id)?
            .members
            .iter()
            .find(|member| registry.is_visible(member))
            .cloned()
    }

    fn member_group(&self, group_id: &str, key: &str) -> Option<&ExclusiveGroup> {
        let Some(group) = self.groups.get(group_id) else {
            log::debug!("Unbekannte Gruppe '{}'", group_id);
            return None;
        };
        if !group.contains(key) {
            log::debug!("'{}' gehört nicht zu Gruppe '{}'", key, group_id);
            return None;
        }
        Some(group)
    }
}
