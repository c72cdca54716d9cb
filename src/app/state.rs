//! Engine State — zentrale Datenhaltung einer Sitzung.

use agrimap_raster_api::{Field, HeatMapQuery};
use std::collections::HashMap;

use super::playback::{TimeSeriesPlaybackController, TimerRequest};
use super::{CommandLog, RemoteLayerCache};
use crate::core::{ChangeDetectionSession, ExclusiveGroupController, LayerRegistry};
use crate::shared::{EngineEvent, EngineOptions, NotificationEvent, RenderDirective};

/// Was für einen abgerufenen Layer beim Backend angefragt wird.
#[derive(Debug, Clone, PartialEq)]
pub enum DemandRequest {
    /// Anbaufläche eines Feldes (Layer-Key = Crop-Key)
    CropArea(Field),
    /// Index-Heatmap
    HeatMap(HeatMapQuery),
}

/// Laufender Abruf eines abgerufenen Layers.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandJob {
    pub key: String,
    pub ticket: u64,
    pub request: DemandRequest,
}

/// Gesamter veränderlicher Zustand der Engine.
///
/// Liegt hinter einem Lock; Handler schreiben ihre Ausgaben in `outbox`,
/// die vor dem Freigeben des Locks veröffentlicht wird.
pub struct EngineState {
    pub options: EngineOptions,
    /// Aktives Feld
    pub field: Option<Field>,
    pub registry: LayerRegistry,
    pub groups: ExclusiveGroupController,
    pub playback: TimeSeriesPlaybackController,
    pub change_detection: ChangeDetectionSession,
    pub cache: RemoteLayerCache,
    /// Offene Demand-Abrufe: Layer-Key → Ticket
    pub pending_demand: HashMap<String, u64>,
    /// Ticket der jüngsten Zeitreihen-Anfrage
    pub time_series_ticket: Option<u64>,
    /// Letzte Heatmap-Anfrage (Grundlage für erneutes Einblenden)
    pub heat_map_query: Option<HeatMapQuery>,
    /// Vom Handler angeforderter Timer-Start
    pub pending_timer: Option<TimerRequest>,
    pub command_log: CommandLog,
    pub outbox: Vec<EngineEvent>,
    next_ticket: u64,
}

impl EngineState {
    /// Erstellt den Zustand aus den Optionen (ohne aktives Feld).
    pub fn new(options: EngineOptions) -> Self {
        let registry = LayerRegistry::from_layers(options.catalog());
        let mut groups = ExclusiveGroupController::new(options.normalize_target());
        for group in &options.groups {
            groups.add_group(group.clone());
        }
        let playback =
            TimeSeriesPlaybackController::new(options.time_series_layer_key.clone(), options.playback_speed);
        let cache = RemoteLayerCache::with_max_age(options.demand_cache_max_age());

        Self {
            options,
            field: None,
            registry,
            groups,
            playback,
            change_detection: ChangeDetectionSession::new(),
            cache,
            pending_demand: HashMap::new(),
            time_series_ticket: None,
            heat_map_query: None,
            pending_timer: None,
            command_log: CommandLog::new(),
            outbox: Vec::new(),
            next_ticket: 0,
        }
    }

    /// Neues, monoton steigendes Ticket für asynchrone Anfragen.
    pub fn next_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Reiht Render-Direktiven in die Ausgabe ein.
    pub fn render(&mut self, directives: impl IntoIterator<Item = RenderDirective>) {
        self.outbox
            .extend(directives.into_iter().map(EngineEvent::Render));
    }

    /// Reiht eine Benachrichtigung in die Ausgabe ein.
    pub fn notify(&mut self, event: NotificationEvent) {
        self.outbox.push(EngineEvent::Notify(event));
    }

    /// Reiht bereits gemischte Ereignisse ein.
    pub fn emit(&mut self, events: impl IntoIterator<Item = EngineEvent>) {
        self.outbox.extend(events);
    }

    /// Meldet dem Nutzer einen fehlgeschlagenen Abruf.
    pub fn notify_fetch_error(&mut self) {
        let message = self.options.fetch_error_message.clone();
        self.notify(NotificationEvent::Error { message });
    }

    /// Verwirft einen offenen Demand-Abruf und beendet dessen Ladeanzeige.
    pub fn cancel_pending_demand(&mut self, key: &str) {
        if self.pending_demand.remove(key).is_some() {
            log::debug!("Offener Abruf für '{}' wird nicht mehr angezeigt", key);
            self.notify(NotificationEvent::LoadingEnd {
                layer_key: key.to_string(),
            });
        }
    }

    /// Verwirft eine offene Zeitreihen-Anfrage.
    pub fn cancel_pending_time_series(&mut self) {
        if self.time_series_ticket.take().is_some() {
            let layer_key = self.options.time_series_layer_key.clone();
            self.notify(NotificationEvent::LoadingEnd { layer_key });
        }
    }
}
