//! Mapping von UI-Intents auf mutierende Overlay-Commands.

use super::{EngineState, OverlayCommand, OverlayIntent};
use crate::core::LayerKind;

/// Übersetzt einen `OverlayIntent` in eine Sequenz ausführbarer `OverlayCommand`s.
pub fn map_intent_to_commands(state: &EngineState, intent: OverlayIntent) -> Vec<OverlayCommand> {
    match intent {
        OverlayIntent::LayerToggled { key } => map_layer_toggle(state, key),
        OverlayIntent::ExclusiveToggled { group_id, key } => {
            map_exclusive_toggle(state, group_id, key)
        }
        OverlayIntent::DemandLayerToggled { key } => {
            if state.registry.is_visible(&key) || state.pending_demand.contains_key(&key) {
                vec![OverlayCommand::HideLayer { key }]
            } else {
                vec![OverlayCommand::ShowDemandLayer { key }]
            }
        }
        OverlayIntent::OpacityChanged { key, opacity } => {
            vec![OverlayCommand::SetOpacity { key, opacity }]
        }
        OverlayIntent::LayerTimeChanged { key, time } => {
            vec![OverlayCommand::SetLayerTime { key, time }]
        }

        OverlayIntent::TimeSeriesLoaded { sequence } => {
            vec![OverlayCommand::LoadTimeSeries { sequence }]
        }
        OverlayIntent::TimeSeriesCleared => vec![OverlayCommand::ClearTimeSeries],
        OverlayIntent::PlayRequested => vec![OverlayCommand::Play],
        OverlayIntent::PauseRequested => vec![OverlayCommand::Pause],
        OverlayIntent::PlayPauseToggled => {
            if state.playback.is_playing() {
                vec![OverlayCommand::Pause]
            } else {
                vec![OverlayCommand::Play]
            }
        }
        OverlayIntent::SpeedChanged { speed } => vec![OverlayCommand::SetPlaybackSpeed { speed }],
        OverlayIntent::SeekRequested { index } => vec![OverlayCommand::Seek { index }],
        OverlayIntent::StepForwardRequested => vec![OverlayCommand::StepForward],
        OverlayIntent::StepBackRequested => vec![OverlayCommand::StepBack],

        OverlayIntent::ChangeDetectionEntered => vec![OverlayCommand::EnterChangeDetection],
        OverlayIntent::ChangeDetectionExited => vec![OverlayCommand::ExitChangeDetection],
        OverlayIntent::ChangeDetectionToggled => {
            if state.change_detection.is_active() {
                vec![OverlayCommand::ExitChangeDetection]
            } else {
                vec![OverlayCommand::EnterChangeDetection]
            }
        }
        OverlayIntent::ComparisonImageSelected { index } => {
            vec![OverlayCommand::SelectComparisonImage { index }]
        }
        OverlayIntent::ComparisonSliderMoved { position } => {
            vec![OverlayCommand::SetComparisonPosition { position }]
        }

        OverlayIntent::FieldSelected { field } => vec![OverlayCommand::SelectField { field }],
        OverlayIntent::FieldCleared => vec![OverlayCommand::ClearField],
        OverlayIntent::TimeSeriesRequested {
            index_key,
            start_date,
            end_date,
        } => vec![OverlayCommand::RequestTimeSeries {
            index_key,
            start_date,
            end_date,
        }],
        OverlayIntent::HeatMapRequested { index_key, date } => {
            vec![OverlayCommand::RequestHeatMap { index_key, date }]
        }
    }
}

/// Ein allgemeiner Layer-Schalter.
///
/// Abgerufene Layer laufen immer über den Cache; sonst entscheidet die Gruppe.
fn map_exclusive_toggle(state: &EngineState, group_id: String, key: String) -> Vec<OverlayCommand> {
    let active = state.groups.active_member(&state.registry, &group_id);
    if active.as_deref() == Some(key.as_str()) || state.pending_demand.contains_key(&key) {
        return vec![OverlayCommand::DeactivateExclusive { group_id, key }];
    }
    // Abgerufene Mitglieder brauchen erst eine Quelle; finish_demand aktiviert über die Gruppe
    let needs_fetch = state
        .registry
        .get(&key)
        .is_some_and(|layer| layer.kind == LayerKind::DemandFetched && !layer.visible);
    if needs_fetch && state.groups.group_of(&key) == Some(group_id.as_str()) {
        vec![OverlayCommand::ShowDemandLayer { key }]
    } else {
        vec![OverlayCommand::ActivateExclusive { group_id, key }]
    }
}

fn map_layer_toggle(state: &EngineState, key: String) -> Vec<OverlayCommand> {
    let Some(layer) = state.registry.get(&key) else {
        log::debug!("Schalter für unbekannten Layer '{}' ignoriert", key);
        return Vec::new();
    };
    // Ein laufender Abruf zählt als eingeschaltet; erneutes Schalten bricht ab
    let visible = layer.visible || state.pending_demand.contains_key(&key);
    let kind = layer.kind;
    let group_id = state.groups.group_of(&key).map(str::to_string);

    match (visible, kind, group_id) {
        (true, _, Some(group_id)) => vec![OverlayCommand::DeactivateExclusive { group_id, key }],
        (true, _, None) => vec![OverlayCommand::HideLayer { key }],
        (false, LayerKind::DemandFetched, _) => vec![OverlayCommand::ShowDemandLayer { key }],
        (false, _, Some(group_id)) => vec![OverlayCommand::ActivateExclusive { group_id, key }],
        (false, _, None) => vec![OverlayCommand::ShowLayer { key }],
    }
}

#[cfg(test)]
mod tests;
