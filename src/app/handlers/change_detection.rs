//! Handler für den Vorher/Nachher-Vergleich.

use super::playback::render_frame;
use crate::app::{EngineError, EngineState};

/// Startet eine neue Vergleichsauswahl; laufendes Playback wird angehalten.
pub fn enter(state: &mut EngineState) -> Result<(), EngineError> {
    if state.playback.is_empty() {
        return Err(EngineError::EmptySequence);
    }
    state.playback.pause();
    state.change_detection.enter();
    log::info!("Vergleichsmodus gestartet");
    Ok(())
}

/// Beendet den Vergleich; das Playback-Bild wird wieder gezeigt.
pub fn exit(state: &mut EngineState) {
    if !state.change_detection.is_active() {
        return;
    }
    state.change_detection.exit();
    log::info!("Vergleichsmodus beendet");
    if let Some(index) = state.playback.current_index() {
        render_frame(state, index);
    }
}

/// Wählt Vorher- oder Nachher-Bild; ein vollständiges Paar wird sofort aufgelöst.
pub fn select_image(state: &mut EngineState, index: usize) {
    let len = state.playback.len();
    if state.change_detection.select_index(index, len) {
        render_resolved(state);
    }
}

/// Bewegt den Schieber und zeigt das aufgelöste Bild.
pub fn set_position(state: &mut EngineState, position: f64) {
    state.change_detection.set_position(position);
    render_resolved(state);
}

fn render_resolved(state: &mut EngineState) {
    if let Some(index) = state.change_detection.resolve() {
        render_frame(state, index);
    }
}
