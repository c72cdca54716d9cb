//! Handler für Sichtbarkeit, Deckkraft und Zeitparameter der Overlays.

use crate::app::{EngineError, EngineState};

/// Aktiviert ein Mitglied einer exklusiven Gruppe.
pub fn activate_exclusive(
    state: &mut EngineState,
    group_id: &str,
    key: &str,
) -> Result<(), EngineError> {
    ensure_member(state, group_id, key)?;
    let directives = state.groups.activate(&mut state.registry, group_id, key);
    state.render(directives);
    Ok(())
}

/// Blendet ein Mitglied einer exklusiven Gruppe aus.
pub fn deactivate_exclusive(
    state: &mut EngineState,
    group_id: &str,
    key: &str,
) -> Result<(), EngineError> {
    ensure_member(state, group_id, key)?;
    state.cancel_pending_demand(key);
    let directives = state.groups.deactivate(&mut state.registry, group_id, key);
    state.render(directives);
    Ok(())
}

/// Blendet einen Layer mit bereits bekannter Quelle ein.
///
/// Gruppenmitglieder laufen über die Gruppe, damit die Exklusivität hält.
pub fn show(state: &mut EngineState, key: &str) -> Result<(), EngineError> {
    ensure_layer(state, key)?;
    if let Some(group_id) = state.groups.group_of(key).map(str::to_string) {
        return activate_exclusive(state, &group_id, key);
    }
    let directives = state.registry.set_visibility(key, true);
    state.render(directives);
    Ok(())
}

/// Blendet einen Layer aus.
///
/// Ein noch laufender Abruf für diesen Layer blendet ihn danach nicht mehr ein.
pub fn hide(state: &mut EngineState, key: &str) -> Result<(), EngineError> {
    ensure_layer(state, key)?;
    state.cancel_pending_demand(key);
    let directives = state.registry.set_visibility(key, false);
    state.render(directives);
    Ok(())
}

/// Setzt die Deckkraft eines Layers.
pub fn set_opacity(state: &mut EngineState, key: &str, opacity: f32) -> Result<(), EngineError> {
    ensure_layer(state, key)?;
    let directive = state.registry.set_opacity(key, opacity);
    state.render(directive);
    Ok(())
}

/// Setzt den Zeitparameter eines Bilddienst-Layers.
pub fn set_time(state: &mut EngineState, key: &str, time: &str) -> Result<(), EngineError> {
    ensure_layer(state, key)?;
    let directive = state.registry.set_time(key, time);
    state.render(directive);
    Ok(())
}

fn ensure_layer(state: &EngineState, key: &str) -> Result<(), EngineError> {
    if state.registry.contains(key) {
        Ok(())
    } else {
        Err(EngineError::InvalidKey(key.to_string()))
    }
}

fn ensure_member(state: &EngineState, group_id: &str, key: &str) -> Result<(), EngineError> {
    match state.groups.group(group_id) {
        Some(group) if group.contains(key) => ensure_layer(state, key),
        Some(_) => Err(EngineError::InvalidKey(key.to_string())),
        None => Err(EngineError::InvalidKey(group_id.to_string())),
    }
}
