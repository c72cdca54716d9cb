//! Handler für den Feldwechsel.
//!
//! Ein Feldwechsel räumt synchron den gesamten Overlay-Zustand ab und
//! ersetzt den Cache, bevor die Standard-Layer des neuen Feldes erscheinen.

use agrimap_raster_api::Field;

use crate::app::EngineState;
use crate::shared::RenderDirective;

/// Wechselt auf `field`.
pub fn select_field(state: &mut EngineState, field: Field) {
    let center = field.geometry.centroid();
    log::info!("Feld '{}' ({}) ausgewählt", field.name, field.id);

    reset_overlays(state);
    state.groups.set_view_center(center);
    state.field = Some(field);

    let target_zoom = state.options.field_zoom;
    state.render([RenderDirective::NormalizeView {
        target_zoom,
        center,
    }]);
    show_default_layers(state);
}

/// Verlässt das aktive Feld ohne neue Layer zu laden.
pub fn clear_field(state: &mut EngineState) {
    if let Some(field) = state.field.take() {
        log::info!("Feld '{}' verlassen", field.id);
    }
    reset_overlays(state);
    state.groups.set_view_center(None);
}

fn reset_overlays(state: &mut EngineState) {
    state.playback.clear();
    state.change_detection.exit();

    let pending: Vec<String> = state.pending_demand.keys().cloned().collect();
    for key in pending {
        state.cancel_pending_demand(&key);
    }
    state.cancel_pending_time_series();
    state.heat_map_query = None;

    let directives = state.registry.hide_all();
    state.render(directives);
    state.registry.reset(state.options.catalog());
    state.cache.reset();
}

fn show_default_layers(state: &mut EngineState) {
    for key in state.options.default_visible_layers.clone() {
        if let Some(group_id) = state.groups.group_of(&key) {
            if let Some(active) = state.groups.active_member(&state.registry, group_id) {
                log::warn!(
                    "Standard-Layer '{}' übersprungen, '{}' ist in Gruppe '{}' bereits aktiv",
                    key,
                    active,
                    group_id
                );
                continue;
            }
        }
        let directives = state.registry.set_visibility(&key, true);
        state.render(directives);
    }
}
