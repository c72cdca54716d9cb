//! Zentrale Fassade der Overlay-Engine.
//!
//! Alle UI-Ereignisse laufen über `OverlayCommandFacade`. Synchrone Commands
//! werden vollständig unter dem Engine-Lock ausgeführt; Abrufe geben den Lock
//! während des Wartens frei und übernehmen ihr Ergebnis danach in einem
//! zweiten Schritt.

use agrimap_raster_api::{Field, RasterBackend};
use chrono::NaiveDate;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use super::handlers;
use super::intent_mapping::map_intent_to_commands;
use super::playback::{PlaybackSnapshot, PlaybackTimer, TimerRequest};
use super::{
    ChangeDetectionControl, EngineError, EngineState, FetchError, FetchState, OverlayCommand,
    OverlayIntent, PlaybackControl,
};
use crate::core::{ChangeDetectionSession, PlaybackSpeed, TimeSeriesSequence};
use crate::shared::{EngineEvent, EngineOptions};

struct EngineShared {
    state: Mutex<EngineState>,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineShared {
    /// Führt `f` unter dem Lock aus und veröffentlicht danach die Ausgaben,
    /// noch bevor der Lock frei wird.
    fn with_state<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state);
        for event in state.outbox.drain(..) {
            if self.events.send(event).is_err() {
                log::trace!("Kein Empfänger für Engine-Ereignisse");
            }
        }
        result
    }
}

/// Einziger Einstiegspunkt für Overlay-Bedienung.
///
/// Billig klonbar; alle Klone teilen denselben Zustand.
#[derive(Clone)]
pub struct OverlayCommandFacade {
    shared: Arc<EngineShared>,
    backend: Arc<dyn RasterBackend>,
}

impl OverlayCommandFacade {
    /// Erstellt die Engine und den Empfänger ihrer Ausgabeströme.
    pub fn new(
        options: EngineOptions,
        backend: Arc<dyn RasterBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(EngineShared {
            state: Mutex::new(EngineState::new(options)),
            events,
        });
        (Self { shared, backend }, receiver)
    }

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    ///
    /// Bricht beim ersten fehlgeschlagenen Command ab.
    pub async fn handle_intent(&self, intent: OverlayIntent) -> Result<(), EngineError> {
        let commands = self
            .shared
            .with_state(|state| map_intent_to_commands(state, intent));
        for command in commands {
            self.handle_command(command).await?;
        }
        Ok(())
    }

    /// Führt einen Command aus. Fehler sind bereits protokolliert und,
    /// wo der Nutzer sie sehen soll, als Benachrichtigung gemeldet.
    pub async fn handle_command(&self, command: OverlayCommand) -> Result<(), EngineError> {
        let result = if command.is_async() {
            self.record(command.clone());
            self.run_async(command).await
        } else {
            self.execute(command)
        };
        if let Err(error) = &result {
            report(error);
        }
        result
    }

    // ── Komfort-Operationen ─────────────────────────────────────

    /// Schaltet ein Mitglied einer exklusiven Gruppe um.
    pub async fn toggle_exclusive(&self, group_id: &str, key: &str) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::ExclusiveToggled {
            group_id: group_id.to_string(),
            key: key.to_string(),
        })
        .await
    }

    /// Schaltet einen abgerufenen Layer um (Cache, dann Registry).
    pub async fn toggle_demand_fetched(&self, key: &str) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::DemandLayerToggled {
            key: key.to_string(),
        })
        .await
    }

    /// Schaltet einen beliebigen Layer um.
    pub async fn toggle_layer(&self, key: &str) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::LayerToggled {
            key: key.to_string(),
        })
        .await
    }

    pub async fn set_opacity(&self, key: &str, opacity: f32) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::OpacityChanged {
            key: key.to_string(),
            opacity,
        })
        .await
    }

    pub async fn set_layer_time(&self, key: &str, time: &str) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::LayerTimeChanged {
            key: key.to_string(),
            time: time.to_string(),
        })
        .await
    }

    pub async fn load_time_series(&self, sequence: TimeSeriesSequence) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::TimeSeriesLoaded { sequence })
            .await
    }

    pub async fn playback_control(&self, control: PlaybackControl) -> Result<(), EngineError> {
        self.handle_intent(control.into()).await
    }

    pub async fn change_detection_control(
        &self,
        control: ChangeDetectionControl,
    ) -> Result<(), EngineError> {
        self.handle_intent(control.into()).await
    }

    pub async fn select_field(&self, field: Field) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::FieldSelected { field })
            .await
    }

    pub async fn clear_field(&self) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::FieldCleared).await
    }

    pub async fn request_time_series(
        &self,
        index_key: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::TimeSeriesRequested {
            index_key: index_key.to_string(),
            start_date,
            end_date,
        })
        .await
    }

    pub async fn request_heat_map(&self, index_key: &str, date: NaiveDate) -> Result<(), EngineError> {
        self.handle_intent(OverlayIntent::HeatMapRequested {
            index_key: index_key.to_string(),
            date,
        })
        .await
    }

    // ── Lesesichten ─────────────────────────────────────────────

    pub fn snapshot_visibility(&self) -> IndexMap<String, bool> {
        self.shared
            .with_state(|state| state.registry.snapshot_visibility())
    }

    pub fn snapshot_opacity(&self) -> IndexMap<String, f32> {
        self.shared
            .with_state(|state| state.registry.snapshot_opacity())
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.shared.with_state(|state| state.registry.is_visible(key))
    }

    pub fn active_member(&self, group_id: &str) -> Option<String> {
        self.shared
            .with_state(|state| state.groups.active_member(&state.registry, group_id))
    }

    pub fn playback(&self) -> PlaybackSnapshot {
        self.shared.with_state(|state| state.playback.snapshot())
    }

    pub fn playback_speed(&self) -> PlaybackSpeed {
        self.shared.with_state(|state| state.playback.speed())
    }

    pub fn change_detection(&self) -> ChangeDetectionSession {
        self.shared
            .with_state(|state| state.change_detection.clone())
    }

    pub fn fetch_state(&self, key: &str) -> FetchState {
        self.shared.with_state(|state| state.cache.fetch_state(key))
    }

    pub fn active_field(&self) -> Option<Field> {
        self.shared.with_state(|state| state.field.clone())
    }

    /// Ausgeführte Commands (neueste zuletzt).
    pub fn command_history(&self) -> Vec<OverlayCommand> {
        self.shared
            .with_state(|state| state.command_log.entries().to_vec())
    }

    // ── Ausführung ──────────────────────────────────────────────

    fn record(&self, command: OverlayCommand) {
        self.shared
            .with_state(|state| state.command_log.record(&command));
    }

    /// Führt einen synchronen Command aus und startet ggf. den Playback-Timer.
    fn execute(&self, command: OverlayCommand) -> Result<(), EngineError> {
        let shared = &self.shared;
        shared.with_state(|state| {
            state.command_log.record(&command);
            let result = dispatch(state, command);
            if let Some(request) = state.pending_timer.take() {
                let timer = spawn_timer(Arc::downgrade(shared), request);
                state.playback.attach_timer(timer);
            }
            result
        })
    }

    /// Commands, die auf das Backend warten. Der Lock wird währenddessen freigegeben.
    async fn run_async(&self, command: OverlayCommand) -> Result<(), EngineError> {
        match command {
            OverlayCommand::ShowDemandLayer { key } => self.show_demand_layer(&key, false).await,
            OverlayCommand::RequestHeatMap { index_key, date } => {
                self.run_heat_map_request(&index_key, date).await
            }
            OverlayCommand::RequestTimeSeries {
                index_key,
                start_date,
                end_date,
            } => {
                self.run_time_series_request(&index_key, start_date, end_date)
                    .await
            }
            command => {
                log::error!("Synchroner Command im asynchronen Pfad: {:?}", command);
                Ok(())
            }
        }
    }

    async fn show_demand_layer(&self, key: &str, force: bool) -> Result<(), EngineError> {
        let prepared = self.shared.with_state(|state| {
            handlers::fetch::begin_demand(state, key, force).map(|job| (job, state.cache.clone()))
        })?;
        let (Some(job), cache) = prepared else {
            return Ok(());
        };

        let backend = Arc::clone(&self.backend);
        let request = job.request.clone();
        let fetch_key = job.key.clone();
        let result = cache
            .ensure_loaded(&job.key, move |token| {
                handlers::fetch::fetch_descriptor(backend, fetch_key, request, token)
            })
            .await;

        self.shared
            .with_state(|state| handlers::fetch::finish_demand(state, &job, result))
    }

    async fn run_heat_map_request(&self, index_key: &str, date: NaiveDate) -> Result<(), EngineError> {
        let key = self
            .shared
            .with_state(|state| handlers::fetch::prepare_heat_map(state, index_key, date))?;
        self.show_demand_layer(&key, true).await
    }

    async fn run_time_series_request(
        &self,
        index_key: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), EngineError> {
        let (ticket, query) = self.shared.with_state(|state| {
            handlers::fetch::begin_time_series(state, index_key, start_date, end_date)
        })?;

        let result: Result<_, FetchError> = self
            .backend
            .fetch_time_series(&query)
            .await
            .map_err(Into::into);

        let shared = &self.shared;
        shared.with_state(|state| {
            let result = handlers::fetch::finish_time_series(state, ticket, index_key, result);
            if let Some(request) = state.pending_timer.take() {
                let timer = spawn_timer(Arc::downgrade(shared), request);
                state.playback.attach_timer(timer);
            }
            result
        })
    }
}

/// Dispatcht synchrone Commands an die Feature-Handler.
fn dispatch(state: &mut EngineState, command: OverlayCommand) -> Result<(), EngineError> {
    match command {
        // === Layer ===
        OverlayCommand::ActivateExclusive { group_id, key } => {
            handlers::layers::activate_exclusive(state, &group_id, &key)
        }
        OverlayCommand::DeactivateExclusive { group_id, key } => {
            handlers::layers::deactivate_exclusive(state, &group_id, &key)
        }
        OverlayCommand::ShowLayer { key } => handlers::layers::show(state, &key),
        OverlayCommand::HideLayer { key } => handlers::layers::hide(state, &key),
        OverlayCommand::SetOpacity { key, opacity } => {
            handlers::layers::set_opacity(state, &key, opacity)
        }
        OverlayCommand::SetLayerTime { key, time } => {
            handlers::layers::set_time(state, &key, &time)
        }

        // === Zeitreihe ===
        OverlayCommand::LoadTimeSeries { sequence } => handlers::playback::load(state, sequence),
        OverlayCommand::ClearTimeSeries => {
            handlers::playback::clear(state);
            Ok(())
        }
        OverlayCommand::Play => handlers::playback::play(state),
        OverlayCommand::Pause => {
            handlers::playback::pause(state);
            Ok(())
        }
        OverlayCommand::SetPlaybackSpeed { speed } => {
            handlers::playback::set_speed(state, speed);
            Ok(())
        }
        OverlayCommand::Seek { index } => handlers::playback::seek(state, index),
        OverlayCommand::StepForward => handlers::playback::step_forward(state),
        OverlayCommand::StepBack => handlers::playback::step_back(state),

        // === Vergleichsmodus ===
        OverlayCommand::EnterChangeDetection => handlers::change_detection::enter(state),
        OverlayCommand::ExitChangeDetection => {
            handlers::change_detection::exit(state);
            Ok(())
        }
        OverlayCommand::SelectComparisonImage { index } => {
            handlers::change_detection::select_image(state, index);
            Ok(())
        }
        OverlayCommand::SetComparisonPosition { position } => {
            handlers::change_detection::set_position(state, position);
            Ok(())
        }

        // === Feld ===
        OverlayCommand::SelectField { field } => {
            handlers::session::select_field(state, field);
            Ok(())
        }
        OverlayCommand::ClearField => {
            handlers::session::clear_field(state);
            Ok(())
        }

        OverlayCommand::ShowDemandLayer { .. }
        | OverlayCommand::RequestTimeSeries { .. }
        | OverlayCommand::RequestHeatMap { .. } => {
            log::error!("Asynchroner Command im synchronen Pfad: {:?}", command);
            Ok(())
        }
    }
}

/// Startet den Playback-Timer.
///
/// Der Task hält nur eine schwache Referenz auf die Engine und endet, sobald
/// seine Generation veraltet ist.
fn spawn_timer(shared: Weak<EngineShared>, request: TimerRequest) -> PlaybackTimer {
    let TimerRequest { generation, period } = request;
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            if !shared.with_state(|state| handlers::playback::tick(state, generation)) {
                break;
            }
        }
        log::debug!("Playback-Timer (Generation {}) beendet", generation);
    });
    PlaybackTimer::new(generation, task.abort_handle())
}

fn report(error: &EngineError) {
    match error {
        EngineError::FetchFailed { .. } => log::warn!("{}", error),
        EngineError::InvalidKey(_) | EngineError::Superseded(_) => log::debug!("{}", error),
        EngineError::EmptySequence | EngineError::NoActiveField | EngineError::MissingQuery(_) => {
            log::info!("{}", error)
        }
    }
}
