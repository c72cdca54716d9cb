#![allow(dead_code)]

use agrimap_overlay::{
    DirectiveOp, EngineEvent, EngineOptions, NotificationEvent, NotificationKind, Observation,
    OverlayCommandFacade, RenderDirective, TimeSeriesSequence,
};
use agrimap_raster_api::{Field, FieldGeometry, FixtureBackend, RasterBackend};
use chrono::NaiveDate;
use glam::DVec2;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Backend-Antworten für die Flow-Tests.
pub const FIXTURES: &str = r#"{
    "demand_layers": {
        "maize": { "success": true, "tile_url": "https://tiles/maize/{z}/{x}/{y}" },
        "wheat": { "success": true, "tile_url": "https://tiles/wheat/{z}/{x}/{y}" },
        "soybean": { "success": false, "message": "keine Klassifikation" }
    },
    "time_series": {
        "NDVI": { "results": [
            { "date": "2024-03-01", "mean_index_value": 0.6, "cloud_cover": 5.0, "tile_url": "https://t/ndvi/3" },
            { "date": "2024-01-01", "mean_index_value": 0.2, "cloud_cover": 1.0, "tile_url": "https://t/ndvi/1" },
            { "date": "2024-02-01", "mean_index_value": 0.4, "cloud_cover": 2.0, "tile_url": "https://t/ndvi/2" },
            { "date": "2024-04-01", "mean_index_value": 0.7, "cloud_cover": 80.0 }
        ] },
        "EVI": { "results": [] }
    },
    "heat_maps": {
        "NDVI": {
            "tile_url": "https://t/heat/ndvi",
            "vis_params": { "min": -0.2, "max": 0.9, "palette": ["red", "yellow", "green"] },
            "first_image_date": "2024-02-03"
        }
    }
}"#;

/// Fassade, Ereignis-Empfänger und Backend (für Aufrufzähler) eines Tests.
pub struct Harness {
    pub facade: OverlayCommandFacade,
    pub events: UnboundedReceiver<EngineEvent>,
    pub backend: Arc<FixtureBackend>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self::with_backend(options, fixture_backend())
    }

    pub fn with_backend(options: EngineOptions, backend: FixtureBackend) -> Self {
        let backend = Arc::new(backend);
        let dyn_backend: Arc<dyn RasterBackend> = backend.clone();
        let (facade, events) = OverlayCommandFacade::new(options, dyn_backend);
        Self {
            facade,
            events,
            backend,
        }
    }

    /// Wählt das Testfeld und verwirft die dabei entstandenen Ereignisse.
    pub async fn with_field(self) -> Self {
        self.facade
            .select_field(field())
            .await
            .expect("Feldwechsel sollte gelingen");
        let mut harness = self;
        harness.drain();
        harness
    }

    /// Alle bisher veröffentlichten Ereignisse.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

pub fn fixture_backend() -> FixtureBackend {
    FixtureBackend::from_json(FIXTURES).expect("Fixtures sollten parsen")
}

pub fn field() -> Field {
    Field::new(
        "f-1",
        "Nordschlag",
        FieldGeometry::new(vec![
            DVec2::new(10.0, 50.0),
            DVec2::new(10.2, 50.0),
            DVec2::new(10.2, 50.2),
            DVec2::new(10.0, 50.2),
        ]),
    )
}

pub fn other_field() -> Field {
    Field::new(
        "f-2",
        "Südhang",
        FieldGeometry::new(vec![
            DVec2::new(11.0, 48.0),
            DVec2::new(11.1, 48.0),
            DVec2::new(11.1, 48.1),
        ]),
    )
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("gültiges Datum")
}

/// Zeitreihe mit `len` Bildern an aufeinanderfolgenden Tagen.
pub fn sequence(len: usize) -> TimeSeriesSequence {
    let observations = (0..len)
        .map(|i| {
            Observation::new(date(2024, 5, 1 + i as u32), format!("https://t/frame/{}", i))
                .with_value(0.1 * i as f64)
        })
        .collect();
    TimeSeriesSequence::new("NDVI", observations)
}

pub fn renders(events: &[EngineEvent]) -> Vec<RenderDirective> {
    events
        .iter()
        .filter_map(EngineEvent::as_render)
        .cloned()
        .collect()
}

/// Render-Direktiven als `(Art, Layer-Key)`.
pub fn render_ops(events: &[EngineEvent]) -> Vec<(DirectiveOp, Option<String>)> {
    events
        .iter()
        .filter_map(EngineEvent::as_render)
        .map(|directive| (directive.op(), directive.layer_key().map(str::to_string)))
        .collect()
}

pub fn notifications(events: &[EngineEvent]) -> Vec<NotificationEvent> {
    events
        .iter()
        .filter_map(EngineEvent::as_notification)
        .cloned()
        .collect()
}

pub fn notification_kinds(events: &[EngineEvent]) -> Vec<NotificationKind> {
    events
        .iter()
        .filter_map(EngineEvent::as_notification)
        .map(NotificationEvent::kind)
        .collect()
}

/// Indizes aller `FrameChanged`-Benachrichtigungen.
pub fn frame_indices(events: &[EngineEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event.as_notification() {
            Some(NotificationEvent::FrameChanged { index, .. }) => Some(*index),
            _ => None,
        })
        .collect()
}

/// Tile-URLs, die in den Zeitreihen-Layer gerendert wurden.
pub fn time_series_urls(events: &[EngineEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(EngineEvent::as_render)
        .filter_map(|directive| match directive {
            RenderDirective::Show {
                layer_key, source, ..
            }
            | RenderDirective::SetSource {
                layer_key, source, ..
            } if layer_key == "timeSeries" => match source {
                agrimap_overlay::LayerSource::TileTemplate { url } => Some(url.clone()),
                agrimap_overlay::LayerSource::ImageService { url, .. } => Some(url.clone()),
            },
            _ => None,
        })
        .collect()
}
