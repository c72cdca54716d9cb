mod support;

use agrimap_overlay::{
    DirectiveOp, EngineError, NotificationEvent, PlaybackControl, PlaybackPhase, PlaybackSpeed,
    TimeSeriesSequence,
};
use std::time::Duration;
use support::{date, frame_indices, notifications, render_ops, sequence, time_series_urls, Harness};
use tokio::time::sleep;

async fn loaded(len: usize) -> Harness {
    let mut harness = Harness::new();
    harness
        .facade
        .load_time_series(sequence(len))
        .await
        .expect("Zeitreihe sollte laden");
    harness.drain();
    harness
}

#[tokio::test]
async fn test_loading_shows_first_observation() {
    let mut harness = Harness::new();

    harness
        .facade
        .load_time_series(sequence(3))
        .await
        .expect("Zeitreihe sollte laden");
    let events = harness.drain();

    assert_eq!(
        render_ops(&events),
        vec![(DirectiveOp::Show, Some("timeSeries".to_string()))]
    );
    assert_eq!(time_series_urls(&events), vec!["https://t/frame/0"]);
    assert_eq!(
        notifications(&events),
        vec![NotificationEvent::FrameChanged {
            index: 0,
            total: 3,
            date: date(2024, 5, 1),
            value: Some(0.0),
            cloud_cover: None,
        }]
    );
    assert_eq!(harness.facade.playback().phase, PlaybackPhase::Loaded);
}

#[tokio::test(start_paused = true)]
async fn test_playback_advances_and_wraps() {
    let mut harness = loaded(3).await;

    harness
        .facade
        .playback_control(PlaybackControl::Play)
        .await
        .expect("Play");
    sleep(Duration::from_millis(3010)).await;
    let events = harness.drain();

    assert_eq!(frame_indices(&events), vec![1, 2, 0]);
    assert_eq!(
        time_series_urls(&events),
        vec!["https://t/frame/1", "https://t/frame/2", "https://t/frame/0"]
    );
    assert_eq!(harness.facade.playback().phase, PlaybackPhase::Playing);
}

#[tokio::test(start_paused = true)]
async fn test_pause_stops_ticks_and_keeps_position() {
    let mut harness = loaded(4).await;

    harness.facade.playback_control(PlaybackControl::Play).await.expect("Play");
    sleep(Duration::from_millis(1010)).await;
    harness.facade.playback_control(PlaybackControl::Pause).await.expect("Pause");
    harness.drain();

    sleep(Duration::from_millis(5000)).await;

    assert!(harness.drain().is_empty());
    let snapshot = harness.facade.playback();
    assert_eq!(snapshot.phase, PlaybackPhase::Paused);
    assert_eq!(snapshot.current_index, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_speed_change_keeps_position_and_reschedules() {
    let mut harness = loaded(5).await;

    harness.facade.playback_control(PlaybackControl::Play).await.expect("Play");
    sleep(Duration::from_millis(1010)).await;
    harness
        .facade
        .playback_control(PlaybackControl::SetSpeed(PlaybackSpeed::Slow))
        .await
        .expect("Tempo");
    harness.drain();

    sleep(Duration::from_millis(1990)).await;
    assert!(frame_indices(&harness.drain()).is_empty());
    assert_eq!(harness.facade.playback().current_index, Some(1));

    sleep(Duration::from_millis(20)).await;
    assert_eq!(frame_indices(&harness.drain()), vec![2]);
    assert_eq!(harness.facade.playback_speed(), PlaybackSpeed::Slow);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_play_runs_a_single_timer() {
    let mut harness = loaded(3).await;

    harness.facade.playback_control(PlaybackControl::Play).await.expect("Play");
    harness.facade.playback_control(PlaybackControl::Play).await.expect("Play");
    sleep(Duration::from_millis(1010)).await;

    assert_eq!(frame_indices(&harness.drain()), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_switches_between_play_and_pause() {
    let mut harness = loaded(3).await;

    harness.facade.playback_control(PlaybackControl::Toggle).await.expect("an");
    assert_eq!(harness.facade.playback().phase, PlaybackPhase::Playing);
    harness.facade.playback_control(PlaybackControl::Toggle).await.expect("aus");
    assert_eq!(harness.facade.playback().phase, PlaybackPhase::Paused);

    sleep(Duration::from_millis(2010)).await;
    assert!(frame_indices(&harness.drain()).is_empty());
}

#[tokio::test]
async fn test_seek_is_clamped_and_steps_wrap() {
    let mut harness = loaded(3).await;

    harness.facade.playback_control(PlaybackControl::Seek(10)).await.expect("Seek");
    assert_eq!(harness.facade.playback().current_index, Some(2));

    harness
        .facade
        .playback_control(PlaybackControl::StepForward)
        .await
        .expect("vor");
    assert_eq!(harness.facade.playback().current_index, Some(0));

    harness
        .facade
        .playback_control(PlaybackControl::StepBack)
        .await
        .expect("zurück");
    assert_eq!(harness.facade.playback().current_index, Some(2));

    assert_eq!(frame_indices(&harness.drain()), vec![2, 0, 2]);
}

#[tokio::test]
async fn test_empty_sequence_is_a_noop() {
    let mut harness = Harness::new();

    let result = harness
        .facade
        .load_time_series(TimeSeriesSequence::empty("NDVI"))
        .await;

    assert!(matches!(result, Err(EngineError::EmptySequence)));
    assert!(harness.drain().is_empty());
    assert_eq!(harness.facade.playback().phase, PlaybackPhase::Idle);

    let play = harness.facade.playback_control(PlaybackControl::Play).await;
    assert!(matches!(play, Err(EngineError::EmptySequence)));
    assert!(harness.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loading_new_sequence_stops_playback() {
    let mut harness = loaded(3).await;
    harness.facade.playback_control(PlaybackControl::Play).await.expect("Play");

    harness
        .facade
        .load_time_series(sequence(2))
        .await
        .expect("neue Zeitreihe");
    harness.drain();
    sleep(Duration::from_millis(3010)).await;

    assert!(frame_indices(&harness.drain()).is_empty());
    let snapshot = harness.facade.playback();
    assert_eq!(snapshot.phase, PlaybackPhase::Loaded);
    assert_eq!(snapshot.len, 2);
    assert_eq!(snapshot.current_index, Some(0));
}

#[tokio::test]
async fn test_clearing_hides_time_series_layer() {
    let mut harness = loaded(3).await;

    harness
        .facade
        .handle_intent(agrimap_overlay::OverlayIntent::TimeSeriesCleared)
        .await
        .expect("Leeren");
    let events = harness.drain();

    assert_eq!(
        render_ops(&events),
        vec![(DirectiveOp::Hide, Some("timeSeries".to_string()))]
    );
    assert_eq!(harness.facade.playback().phase, PlaybackPhase::Idle);
    assert_eq!(harness.facade.playback().current_index, None);
}
