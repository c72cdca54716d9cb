//! Handler für das Zeitreihen-Playback.
//!
//! Befehle, die eine neue Position setzen, beenden vorher einen aktiven
//! Vergleichsmodus.

use crate::app::{EngineError, EngineState};
use crate::core::{PlaybackSpeed, TimeSeriesSequence};

/// Ersetzt die Zeitreihe und zeigt das erste Bild.
pub fn load(state: &mut EngineState, sequence: TimeSeriesSequence) -> Result<(), EngineError> {
    leave_change_detection(state);
    match state.playback.load(sequence) {
        Some(index) => {
            render_frame(state, index);
            Ok(())
        }
        None => {
            hide_time_series_layer(state);
            Err(EngineError::EmptySequence)
        }
    }
}

/// Verwirft die Zeitreihe und blendet ihren Layer aus.
pub fn clear(state: &mut EngineState) {
    state.change_detection.exit();
    state.playback.clear();
    hide_time_series_layer(state);
}

/// Startet die Wiedergabe.
pub fn play(state: &mut EngineState) -> Result<(), EngineError> {
    if state.playback.is_empty() {
        return Err(EngineError::EmptySequence);
    }
    if leave_change_detection(state) {
        if let Some(index) = state.playback.current_index() {
            render_frame(state, index);
        }
    }
    if let Some(request) = state.playback.play() {
        log::info!("Playback gestartet ({} ms)", request.period.as_millis());
        state.pending_timer = Some(request);
    }
    Ok(())
}

/// Hält die Wiedergabe an.
pub fn pause(state: &mut EngineState) {
    if state.playback.pause() {
        log::info!("Playback angehalten bei Index {:?}", state.playback.current_index());
    }
}

/// Ändert die Geschwindigkeit; bei laufender Wiedergabe wird der Timer neu geplant.
pub fn set_speed(state: &mut EngineState, speed: PlaybackSpeed) {
    if let Some(request) = state.playback.set_speed(speed) {
        state.pending_timer = Some(request);
    }
}

/// Springt zu einem Bild.
pub fn seek(state: &mut EngineState, index: usize) -> Result<(), EngineError> {
    move_to(state, |playback| playback.seek(index))
}

/// Ein Bild vorwärts.
pub fn step_forward(state: &mut EngineState) -> Result<(), EngineError> {
    move_to(state, |playback| playback.step_forward())
}

/// Ein Bild zurück.
pub fn step_back(state: &mut EngineState) -> Result<(), EngineError> {
    move_to(state, |playback| playback.step_back())
}

/// Verarbeitet einen Timer-Tick.
///
/// Gibt `false` zurück, wenn der Timer veraltet ist und enden soll.
pub fn tick(state: &mut EngineState, generation: u64) -> bool {
    if generation != state.playback.generation() {
        return false;
    }
    if let Some(index) = state.playback.tick(generation) {
        render_frame(state, index);
    }
    true
}

/// Rendert das Bild `index` in den Zeitreihen-Layer (inkl. `FrameChanged`).
pub fn render_frame(state: &mut EngineState, index: usize) {
    let events = state.playback.render_observation_at(&mut state.registry, index);
    state.emit(events);
}

fn move_to(
    state: &mut EngineState,
    step: impl FnOnce(&mut crate::app::TimeSeriesPlaybackController) -> Option<usize>,
) -> Result<(), EngineError> {
    if state.playback.is_empty() {
        return Err(EngineError::EmptySequence);
    }
    leave_change_detection(state);
    if let Some(index) = step(&mut state.playback) {
        render_frame(state, index);
    }
    Ok(())
}

fn leave_change_detection(state: &mut EngineState) -> bool {
    if !state.change_detection.is_active() {
        return false;
    }
    log::debug!("Vergleichsmodus durch Playback-Befehl beendet");
    state.change_detection.exit();
    true
}

fn hide_time_series_layer(state: &mut EngineState) {
    let key = state.playback.layer_key().to_string();
    let directives = state.registry.set_visibility(&key, false);
    state.render(directives);
}
