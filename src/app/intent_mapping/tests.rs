use crate::app::{
    ChangeDetectionControl, EngineState, OverlayCommand, OverlayIntent, PlaybackControl,
};
use crate::core::{ExclusiveGroup, LayerSource, Observation, TimeSeriesSequence};
use crate::shared::EngineOptions;
use chrono::NaiveDate;

use super::map_intent_to_commands;

fn state() -> EngineState {
    EngineState::new(EngineOptions::default())
}

fn sequence() -> TimeSeriesSequence {
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("gültiges Datum");
    TimeSeriesSequence::new("NDVI", vec![Observation::new(date, "https://t/1")])
}

#[test]
fn toggle_of_hidden_group_member_activates() {
    let state = state();

    let commands = map_intent_to_commands(&state, OverlayIntent::LayerToggled { key: "vhi".into() });

    assert_eq!(
        commands,
        vec![OverlayCommand::ActivateExclusive {
            group_id: "wms".into(),
            key: "vhi".into(),
        }]
    );
}

#[test]
fn toggle_of_active_group_member_deactivates() {
    let mut state = state();
    state.registry.set_visibility("yield", true);

    let commands = map_intent_to_commands(
        &state,
        OverlayIntent::ExclusiveToggled {
            group_id: "wms".into(),
            key: "yield".into(),
        },
    );

    assert_eq!(
        commands,
        vec![OverlayCommand::DeactivateExclusive {
            group_id: "wms".into(),
            key: "yield".into(),
        }]
    );
}

#[test]
fn toggle_of_demand_layer_fetches_or_hides() {
    let mut state = state();

    let show = map_intent_to_commands(&state, OverlayIntent::LayerToggled { key: "maize".into() });
    assert_eq!(show, vec![OverlayCommand::ShowDemandLayer { key: "maize".into() }]);

    state
        .registry
        .set_source("maize", LayerSource::tiles("https://t/maize/{z}/{x}/{y}"));
    state.registry.set_visibility("maize", true);

    let hide = map_intent_to_commands(
        &state,
        OverlayIntent::DemandLayerToggled { key: "maize".into() },
    );
    assert_eq!(hide, vec![OverlayCommand::HideLayer { key: "maize".into() }]);
}

#[test]
fn toggle_during_pending_fetch_hides() {
    let mut state = state();
    state.pending_demand.insert("wheat".into(), 7);

    let commands = map_intent_to_commands(&state, OverlayIntent::LayerToggled { key: "wheat".into() });

    assert_eq!(commands, vec![OverlayCommand::HideLayer { key: "wheat".into() }]);
}

#[test]
fn exclusive_toggle_of_unfetched_member_fetches_first() {
    let mut state = state();
    state.groups.add_group(ExclusiveGroup::new("crops", ["maize", "wheat"]));
    let toggled = |key: &str| OverlayIntent::ExclusiveToggled {
        group_id: "crops".into(),
        key: key.into(),
    };

    let fetch = map_intent_to_commands(&state, toggled("maize"));
    assert_eq!(fetch, vec![OverlayCommand::ShowDemandLayer { key: "maize".into() }]);

    state.pending_demand.insert("maize".into(), 3);
    let cancel = map_intent_to_commands(&state, toggled("maize"));
    assert_eq!(
        cancel,
        vec![OverlayCommand::DeactivateExclusive {
            group_id: "crops".into(),
            key: "maize".into(),
        }]
    );
}

#[test]
fn exclusive_toggle_into_foreign_group_is_not_fetched() {
    let state = state();

    let commands = map_intent_to_commands(
        &state,
        OverlayIntent::ExclusiveToggled {
            group_id: "wms".into(),
            key: "maize".into(),
        },
    );

    assert_eq!(
        commands,
        vec![OverlayCommand::ActivateExclusive {
            group_id: "wms".into(),
            key: "maize".into(),
        }]
    );
}

#[test]
fn toggle_of_unknown_layer_maps_to_nothing() {
    let state = state();

    let commands = map_intent_to_commands(&state, OverlayIntent::LayerToggled { key: "nope".into() });

    assert!(commands.is_empty());
}

#[test]
fn play_pause_toggle_depends_on_playback_state() {
    let mut state = state();
    state.playback.load(sequence());

    let play = map_intent_to_commands(&state, PlaybackControl::Toggle.into());
    assert_eq!(play, vec![OverlayCommand::Play]);

    state.playback.play();
    let pause = map_intent_to_commands(&state, PlaybackControl::Toggle.into());
    assert_eq!(pause, vec![OverlayCommand::Pause]);
}

#[test]
fn change_detection_toggle_enters_then_exits() {
    let mut state = state();

    let enter = map_intent_to_commands(&state, ChangeDetectionControl::Toggle.into());
    assert_eq!(enter, vec![OverlayCommand::EnterChangeDetection]);

    state.change_detection.enter();
    let exit = map_intent_to_commands(&state, ChangeDetectionControl::Toggle.into());
    assert_eq!(exit, vec![OverlayCommand::ExitChangeDetection]);
}

#[test]
fn slider_and_selection_map_one_to_one() {
    let state = state();

    assert_eq!(
        map_intent_to_commands(&state, ChangeDetectionControl::SetPosition(0.7).into()),
        vec![OverlayCommand::SetComparisonPosition { position: 0.7 }]
    );
    assert_eq!(
        map_intent_to_commands(&state, ChangeDetectionControl::Select(2).into()),
        vec![OverlayCommand::SelectComparisonImage { index: 2 }]
    );
    assert_eq!(
        map_intent_to_commands(&state, PlaybackControl::Seek(4).into()),
        vec![OverlayCommand::Seek { index: 4 }]
    );
}
