//! Zeitreihen-Playback: aktuelle Position, Play/Pause, Geschwindigkeit.
//!
//! Der Controller besitzt genau einen Timer. Jeder Start erhöht die
//! Generation; ein Tick wirkt nur, wenn seine Generation noch aktuell ist.
//! Pause und Geschwindigkeitswechsel entwerten damit synchron alle bereits
//! geplanten Ticks.

use serde::Serialize;
use std::time::Duration;
use tokio::task::AbortHandle;

use crate::core::{LayerRegistry, LayerSource, Observation, PlaybackSpeed, TimeSeriesSequence};
use crate::shared::{EngineEvent, NotificationEvent};

/// Zustand des Playbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackPhase {
    /// Keine Zeitreihe geladen
    #[default]
    Idle,
    /// Geladen, noch nie gestartet
    Loaded,
    Playing,
    Paused,
}

/// Lesesicht auf den Playback-Zustand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub index_key: Option<String>,
    pub current_index: Option<usize>,
    pub len: usize,
    pub speed: PlaybackSpeed,
}

/// Auftrag an den Aufrufer, einen Timer zu starten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub generation: u64,
    pub period: Duration,
}

/// Laufender Timer-Task; wird beim Drop abgebrochen.
#[derive(Debug)]
pub struct PlaybackTimer {
    generation: u64,
    handle: AbortHandle,
}

impl PlaybackTimer {
    pub fn new(generation: u64, handle: AbortHandle) -> Self {
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Besitzt die aktive Zeitreihe und ihren Timer.
#[derive(Debug)]
pub struct TimeSeriesPlaybackController {
    layer_key: String,
    sequence: Option<TimeSeriesSequence>,
    current_index: usize,
    phase: PlaybackPhase,
    speed: PlaybackSpeed,
    generation: u64,
    timer: Option<PlaybackTimer>,
}

impl TimeSeriesPlaybackController {
    /// Erstellt einen leeren Controller, der in `layer_key` rendert.
    pub fn new(layer_key: impl Into<String>, speed: PlaybackSpeed) -> Self {
        Self {
            layer_key: layer_key.into(),
            sequence: None,
            current_index: 0,
            phase: PlaybackPhase::Idle,
            speed,
            generation: 0,
            timer: None,
        }
    }

    pub fn layer_key(&self) -> &str {
        &self.layer_key
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sequence(&self) -> Option<&TimeSeriesSequence> {
        self.sequence.as_ref()
    }

    /// Anzahl der Beobachtungen (0 ohne Zeitreihe).
    pub fn len(&self) -> usize {
        self.sequence.as_ref().map_or(0, TimeSeriesSequence::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aktueller Index, solange eine Zeitreihe geladen ist.
    pub fn current_index(&self) -> Option<usize> {
        self.sequence.as_ref().map(|_| self.current_index)
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Ersetzt die Zeitreihe und stoppt den Timer.
    ///
    /// Liefert den zu rendernden Index (0) oder `None` bei leerer Folge.
    pub fn load(&mut self, sequence: TimeSeriesSequence) -> Option<usize> {
        self.stop_timer();
        self.current_index = 0;
        if sequence.is_empty() {
            log::info!("Zeitreihe '{}' ist leer", sequence.index_key());
            self.sequence = None;
            self.phase = PlaybackPhase::Idle;
            return None;
        }
        log::info!(
            "Zeitreihe '{}' geladen: {} Bilder",
            sequence.index_key(),
            sequence.len()
        );
        self.sequence = Some(sequence);
        self.phase = PlaybackPhase::Loaded;
        Some(0)
    }

    /// Verwirft die Zeitreihe (Feldwechsel, Analyse beendet).
    pub fn clear(&mut self) {
        self.stop_timer();
        self.sequence = None;
        self.current_index = 0;
        self.phase = PlaybackPhase::Idle;
    }

    /// Springt zu `index` (geklemmt); ein laufender Timer läuft weiter.
    pub fn seek(&mut self, index: usize) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.current_index = index.min(len - 1);
        Some(self.current_index)
    }

    /// Ein Bild vorwärts (mit Umlauf).
    pub fn step_forward(&mut self) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.seek((self.current_index + 1) % len)
    }

    /// Ein Bild zurück (mit Umlauf).
    pub fn step_back(&mut self) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.seek((self.current_index + len - 1) % len)
    }

    /// Startet die Wiedergabe.
    ///
    /// Liefert den Timer-Auftrag; `None`, wenn nichts geladen ist oder
    /// bereits abgespielt wird.
    pub fn play(&mut self) -> Option<TimerRequest> {
        if self.is_empty() || self.is_playing() {
            return None;
        }
        self.phase = PlaybackPhase::Playing;
        Some(self.restart_timer())
    }

    /// Hält die Wiedergabe an; die Position bleibt.
    ///
    /// Der Timer ist nach Rückkehr entwertet.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.phase = PlaybackPhase::Paused;
        self.stop_timer();
        true
    }

    /// Ändert die Geschwindigkeit; bei laufender Wiedergabe wird neu geplant.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) -> Option<TimerRequest> {
        self.speed = speed;
        if !self.is_playing() {
            return None;
        }
        Some(self.restart_timer())
    }

    /// Übernimmt einen gestarteten Timer, falls er zur aktuellen Generation gehört.
    pub fn attach_timer(&mut self, timer: PlaybackTimer) {
        if timer.generation() == self.generation && self.is_playing() {
            self.timer = Some(timer);
        }
    }

    /// Verarbeitet einen Timer-Tick.
    ///
    /// Liefert den neuen Index oder `None`, wenn der Tick veraltet ist.
    pub fn tick(&mut self, generation: u64) -> Option<usize> {
        if generation != self.generation || !self.is_playing() {
            return None;
        }
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.current_index = (self.current_index + 1) % len;
        Some(self.current_index)
    }

    /// Stoppt den Timer synchron und entwertet ausstehende Ticks.
    pub fn stop_timer(&mut self) {
        self.generation += 1;
        self.timer = None;
        if self.phase == PlaybackPhase::Playing {
            self.phase = PlaybackPhase::Paused;
        }
    }

    pub fn observation(&self, index: usize) -> Option<&Observation> {
        self.sequence.as_ref()?.get(index)
    }

    /// Rendert die Beobachtung `index` in den Zeitreihen-Layer.
    ///
    /// Ändert nicht die Playback-Position (wird auch vom Vergleichsmodus genutzt).
    pub fn render_observation_at(
        &self,
        registry: &mut LayerRegistry,
        index: usize,
    ) -> Vec<EngineEvent> {
        let Some(observation) = self.observation(index) else {
            return Vec::new();
        };
        let mut events: Vec<EngineEvent> = registry
            .set_source(&self.layer_key, LayerSource::tiles(observation.tile_url.clone()))
            .into_iter()
            .chain(registry.set_visibility(&self.layer_key, true))
            .map(EngineEvent::Render)
            .collect();
        events.push(EngineEvent::Notify(NotificationEvent::FrameChanged {
            index,
            total: self.len(),
            date: observation.date,
            value: observation.value,
            cloud_cover: observation.cloud_cover,
        }));
        events
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase: self.phase,
            index_key: self
                .sequence
                .as_ref()
                .map(|sequence| sequence.index_key().to_string()),
            current_index: self.current_index(),
            len: self.len(),
            speed: self.speed,
        }
    }

    fn restart_timer(&mut self) -> TimerRequest {
        self.generation += 1;
        self.timer = None;
        TimerRequest {
            generation: self.generation,
            period: self.speed.interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LayerKind, OverlayLayer};
    use crate::shared::{DirectiveOp, NotificationKind};
    use chrono::NaiveDate;

    fn sequence(len: usize) -> TimeSeriesSequence {
        let observations = (0..len)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).expect("gültiges Datum");
                Observation::new(date, format!("https://t/{}", i))
            })
            .collect();
        TimeSeriesSequence::new("NDVI", observations)
    }

    fn loaded(len: usize) -> TimeSeriesPlaybackController {
        let mut playback = TimeSeriesPlaybackController::new("timeSeries", PlaybackSpeed::Normal);
        playback.load(sequence(len));
        playback
    }

    #[test]
    fn load_starts_at_zero_and_empty_load_is_idle() {
        let mut playback = loaded(3);
        assert_eq!(playback.phase(), PlaybackPhase::Loaded);
        assert_eq!(playback.current_index(), Some(0));

        assert_eq!(playback.load(sequence(0)), None);
        assert_eq!(playback.phase(), PlaybackPhase::Idle);
        assert_eq!(playback.current_index(), None);
        assert!(playback.play().is_none());
    }

    #[test]
    fn ticks_wrap_around() {
        let mut playback = loaded(3);
        let request = playback.play().expect("Timer-Auftrag");

        let indices: Vec<_> = (0..4).filter_map(|_| playback.tick(request.generation)).collect();

        assert_eq!(indices, vec![1, 2, 0, 1]);
    }

    #[test]
    fn pause_invalidates_pending_ticks() {
        let mut playback = loaded(3);
        let request = playback.play().expect("Timer-Auftrag");
        playback.tick(request.generation);

        assert!(playback.pause());
        assert_eq!(playback.tick(request.generation), None);
        assert_eq!(playback.current_index(), Some(1));
        assert_eq!(playback.phase(), PlaybackPhase::Paused);
    }

    #[test]
    fn speed_change_reschedules_and_keeps_position() {
        let mut playback = loaded(5);
        let first = playback.play().expect("Timer-Auftrag");
        playback.tick(first.generation);
        playback.tick(first.generation);

        let second = playback
            .set_speed(PlaybackSpeed::Fast)
            .expect("Neuplanung bei laufender Wiedergabe");

        assert_eq!(second.period, Duration::from_millis(500));
        assert!(second.generation > first.generation);
        assert_eq!(playback.tick(first.generation), None);
        assert_eq!(playback.current_index(), Some(2));
        assert_eq!(playback.tick(second.generation), Some(3));
    }

    #[test]
    fn speed_change_while_paused_only_stores_speed() {
        let mut playback = loaded(2);
        assert!(playback.set_speed(PlaybackSpeed::Slow).is_none());
        assert_eq!(playback.speed(), PlaybackSpeed::Slow);
    }

    #[test]
    fn seek_clamps_and_steps_wrap() {
        let mut playback = loaded(3);

        assert_eq!(playback.seek(10), Some(2));
        assert_eq!(playback.step_forward(), Some(0));
        assert_eq!(playback.step_back(), Some(2));
    }

    #[test]
    fn play_is_idempotent() {
        let mut playback = loaded(3);
        assert!(playback.play().is_some());
        assert!(playback.play().is_none());
    }

    #[test]
    fn render_shows_layer_then_swaps_source() {
        let playback = loaded(3);
        let mut registry =
            LayerRegistry::from_layers([OverlayLayer::new("timeSeries", LayerKind::Animated, None)]);

        let first = playback.render_observation_at(&mut registry, 0);
        let second = playback.render_observation_at(&mut registry, 1);

        let ops: Vec<_> = first.iter().filter_map(EngineEvent::as_render).map(|d| d.op()).collect();
        assert_eq!(ops, vec![DirectiveOp::Show]);
        let ops: Vec<_> = second.iter().filter_map(EngineEvent::as_render).map(|d| d.op()).collect();
        assert_eq!(ops, vec![DirectiveOp::SetSource]);
        assert_eq!(
            second.last().and_then(EngineEvent::as_notification).map(|n| n.kind()),
            Some(NotificationKind::FrameChanged)
        );
    }
}
