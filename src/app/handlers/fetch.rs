//! Handler für Backend-Abrufe (Anbauflächen, Heatmap, Zeitreihe).
//!
//! Jeder Abruf besteht aus einem `begin_*`-Schritt unter dem Engine-Lock,
//! dem eigentlichen Abruf ohne Lock und einem `finish_*`-Schritt, der das
//! Ergebnis nur übernimmt, wenn sein Ticket noch aktuell ist.

use agrimap_raster_api::{HeatMapQuery, RasterBackend, TimeSeriesQuery, TimeSeriesResponse};
use chrono::NaiveDate;
use std::sync::Arc;

use super::playback;
use crate::app::state::{DemandJob, DemandRequest};
use crate::app::{EngineError, EngineState, FetchError, LayerDescriptor};
use crate::core::{LayerKind, LayerSource, TimeSeriesSequence};
use crate::shared::options::EMPTY_SERIES_MESSAGE;
use crate::shared::NotificationEvent;

/// Bereitet das Einblenden eines abgerufenen Layers vor.
///
/// `Ok(None)`, wenn nichts zu tun ist (Layer schon sichtbar). Mit `force`
/// wird auch ein sichtbarer Layer neu geholt (Heatmap mit neuem Datum).
pub fn begin_demand(
    state: &mut EngineState,
    key: &str,
    force: bool,
) -> Result<Option<DemandJob>, EngineError> {
    let is_demand = state
        .registry
        .get(key)
        .is_some_and(|layer| layer.kind == LayerKind::DemandFetched);
    if !is_demand {
        return Err(EngineError::InvalidKey(key.to_string()));
    }
    if !force && state.registry.is_visible(key) {
        return Ok(None);
    }

    let request = if key == state.options.heat_map_layer_key {
        let query = state
            .heat_map_query
            .clone()
            .ok_or_else(|| EngineError::MissingQuery(key.to_string()))?;
        DemandRequest::HeatMap(query)
    } else {
        let field = state.field.clone().ok_or(EngineError::NoActiveField)?;
        DemandRequest::CropArea(field)
    };

    let ticket = match state.pending_demand.get(key) {
        Some(ticket) if !force => *ticket,
        _ => {
            let ticket = state.next_ticket();
            if state.pending_demand.insert(key.to_string(), ticket).is_none() {
                state.notify(NotificationEvent::LoadingStart {
                    layer_key: key.to_string(),
                    message: format!("Loading {}...", key),
                });
            }
            ticket
        }
    };

    Ok(Some(DemandJob {
        key: key.to_string(),
        ticket,
        request,
    }))
}

/// Übernimmt das Ergebnis eines Demand-Abrufs.
///
/// Erfolg: Quelle setzen, einblenden, Legende melden. Fehler: Meldung an den
/// Nutzer, Layer bleibt verborgen. Veraltete Tickets ändern nichts.
pub fn finish_demand(
    state: &mut EngineState,
    job: &DemandJob,
    result: Result<LayerDescriptor, FetchError>,
) -> Result<(), EngineError> {
    if state.pending_demand.get(&job.key) != Some(&job.ticket) {
        return Err(EngineError::Superseded(job.key.clone()));
    }
    state.pending_demand.remove(&job.key);
    state.notify(NotificationEvent::LoadingEnd {
        layer_key: job.key.clone(),
    });

    let descriptor = match result {
        Ok(descriptor) => descriptor,
        Err(source) => {
            state.notify_fetch_error();
            return Err(EngineError::FetchFailed {
                key: job.key.clone(),
                source,
            });
        }
    };

    // Sichtbarer Layer (erneute Heatmap-Anfrage) lädt auch bei gleicher URL neu
    let source_directive = state
        .registry
        .set_source(&job.key, LayerSource::tiles(descriptor.tile_url.clone()))
        .or_else(|| state.registry.refresh(&job.key));
    state.render(source_directive);

    if let Some(group_id) = state.groups.group_of(&job.key).map(str::to_string) {
        let directives = state.groups.activate(&mut state.registry, &group_id, &job.key);
        state.render(directives);
    } else {
        let directives = state.registry.set_visibility(&job.key, true);
        state.render(directives);
    }

    if let Some(legend) = descriptor.legend {
        state.notify(NotificationEvent::Legend {
            layer_key: job.key.clone(),
            min: legend.min,
            max: legend.max,
            palette: legend.palette,
            first_image_date: descriptor.first_image_date,
        });
    }
    Ok(())
}

/// Holt die Beschreibung eines abgerufenen Layers beim Backend.
pub async fn fetch_descriptor(
    backend: Arc<dyn RasterBackend>,
    key: String,
    request: DemandRequest,
    token: u64,
) -> Result<LayerDescriptor, FetchError> {
    match request {
        DemandRequest::CropArea(field) => {
            let response = backend.fetch_demand_layer(&key, &field).await?;
            let Some(tile_url) = response.usable_tile_url() else {
                return Err(FetchError::InvalidPayload(
                    response
                        .message
                        .clone()
                        .unwrap_or_else(|| format!("keine Tile-URL für '{}'", key)),
                ));
            };
            Ok(LayerDescriptor::new(key.clone(), tile_url, token))
        }
        DemandRequest::HeatMap(query) => {
            let response = backend.fetch_heat_map(&query).await?;
            if response.tile_url.trim().is_empty() {
                return Err(FetchError::InvalidPayload(format!(
                    "keine Heatmap für '{}' am {}",
                    query.index_key, query.date
                )));
            }
            let mut descriptor = LayerDescriptor::new(key, response.tile_url, token);
            descriptor.legend = Some(response.vis_params);
            descriptor.first_image_date = response.first_image_date;
            Ok(descriptor)
        }
    }
}

/// Merkt eine Heatmap-Anfrage vor und verwirft den alten Cache-Eintrag.
pub fn prepare_heat_map(
    state: &mut EngineState,
    index_key: &str,
    date: NaiveDate,
) -> Result<String, EngineError> {
    let field = state.field.as_ref().ok_or(EngineError::NoActiveField)?;
    let key = state.options.heat_map_layer_key.clone();
    if !state.registry.contains(&key) {
        return Err(EngineError::InvalidKey(key));
    }
    state.heat_map_query = Some(HeatMapQuery {
        index_key: index_key.to_string(),
        date,
        geometry: field.geometry.clone(),
    });
    state.cache.invalidate(&key);
    log::info!("Heatmap '{}' für {} angefordert", index_key, date);
    Ok(key)
}

/// Bereitet eine Zeitreihen-Anfrage vor; ältere Anfragen werden entwertet.
pub fn begin_time_series(
    state: &mut EngineState,
    index_key: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(u64, TimeSeriesQuery), EngineError> {
    let field = state.field.as_ref().ok_or(EngineError::NoActiveField)?;
    let query = TimeSeriesQuery {
        index_key: index_key.to_string(),
        start_date,
        end_date,
        geometry: field.geometry.clone(),
    };

    let ticket = state.next_ticket();
    if state.time_series_ticket.replace(ticket).is_none() {
        state.notify(NotificationEvent::LoadingStart {
            layer_key: state.options.time_series_layer_key.clone(),
            message: format!("Loading {} time series...", index_key),
        });
    }
    Ok((ticket, query))
}

/// Übernimmt eine Zeitreihen-Antwort, falls sie noch die jüngste ist.
pub fn finish_time_series(
    state: &mut EngineState,
    ticket: u64,
    index_key: &str,
    result: Result<TimeSeriesResponse, FetchError>,
) -> Result<(), EngineError> {
    if state.time_series_ticket != Some(ticket) {
        return Err(EngineError::Superseded(index_key.to_string()));
    }
    state.time_series_ticket = None;
    state.notify(NotificationEvent::LoadingEnd {
        layer_key: state.options.time_series_layer_key.clone(),
    });

    let response = match result {
        Ok(response) => response,
        Err(source) => {
            state.notify_fetch_error();
            return Err(EngineError::FetchFailed {
                key: index_key.to_string(),
                source,
            });
        }
    };

    let sequence = TimeSeriesSequence::from_records(index_key, &response.results);
    let loaded = playback::load(state, sequence);
    if matches!(loaded, Err(EngineError::EmptySequence)) {
        state.notify(NotificationEvent::Error {
            message: EMPTY_SERIES_MESSAGE.to_string(),
        });
    }
    loaded
}
