//! AgriMap Overlay Demo.
//!
//! Spielt eine typische Sitzung gegen das Fixture-Backend durch und gibt alle
//! Render-Direktiven und Benachrichtigungen als JSON-Zeilen aus.

use agrimap_overlay::{
    ChangeDetectionControl, EngineOptions, OverlayCommandFacade, PlaybackControl, PlaybackSpeed,
};
use agrimap_raster_api::{Field, FieldGeometry, FixtureBackend};
use anyhow::Context;
use chrono::NaiveDate;
use glam::DVec2;
use std::sync::Arc;
use std::time::Duration;

const FIXTURES: &str = include_str!("../demos/field_fixtures.json");

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("AgriMap Overlay Demo v{} startet...", env!("CARGO_PKG_VERSION"));

    // Optionen aus TOML laden (oder Standardwerte)
    let config_path = EngineOptions::config_path();
    let options = EngineOptions::load_from_file(&config_path);
    if !config_path.exists() {
        // Vorlage mit Standardwerten zum Anpassen ablegen
        if let Err(e) = options.save_to_file(&config_path) {
            log::warn!("Optionen-Vorlage nicht geschrieben: {:#}", e);
        }
    }

    let backend = FixtureBackend::from_json(FIXTURES)
        .context("Demo-Fixtures konnten nicht gelesen werden")?
        .with_latency(Duration::from_millis(150));
    let (facade, mut events) = OverlayCommandFacade::new(options, Arc::new(backend));

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => log::warn!("Ereignis nicht serialisierbar: {}", e),
            }
        }
    });

    run_scenario(&facade).await?;

    drop(facade);
    printer.await.context("Ausgabe-Task abgebrochen")?;
    Ok(())
}

/// Feld wählen, WMS-Layer wechseln, Anbauflächen laden, Zeitreihe abspielen
/// und zwei Bilder vergleichen.
async fn run_scenario(facade: &OverlayCommandFacade) -> anyhow::Result<()> {
    facade.select_field(demo_field()).await?;

    facade.toggle_exclusive("wms", "yield").await?;
    facade.set_layer_time("yield", "2024-06-01").await?;
    facade.toggle_exclusive("wms", "vhi").await?;
    facade.set_opacity("vhi", 0.6).await?;

    facade.toggle_demand_fetched("maize").await?;
    // Fehlschlag wird als Benachrichtigung gemeldet, die Sitzung läuft weiter
    if let Err(e) = facade.toggle_demand_fetched("soybean").await {
        log::info!("Erwarteter Fehler: {}", e);
    }

    let start = date(2024, 5, 1)?;
    let end = date(2024, 7, 31)?;
    facade.request_heat_map("NDVI", date(2024, 6, 1)?).await?;
    facade.request_time_series("NDVI", start, end).await?;

    facade
        .playback_control(PlaybackControl::SetSpeed(PlaybackSpeed::Fast))
        .await?;
    facade.playback_control(PlaybackControl::Play).await?;
    tokio::time::sleep(Duration::from_millis(1600)).await;
    facade.playback_control(PlaybackControl::Pause).await?;

    facade
        .change_detection_control(ChangeDetectionControl::Enter)
        .await?;
    facade
        .change_detection_control(ChangeDetectionControl::Select(0))
        .await?;
    facade
        .change_detection_control(ChangeDetectionControl::Select(2))
        .await?;
    facade
        .change_detection_control(ChangeDetectionControl::SetPosition(0.25))
        .await?;
    facade
        .change_detection_control(ChangeDetectionControl::SetPosition(0.75))
        .await?;
    facade
        .change_detection_control(ChangeDetectionControl::Exit)
        .await?;

    let playback = facade.playback();
    log::info!(
        "Sitzung beendet: {} Bilder, Index {:?}, {} Commands",
        playback.len,
        playback.current_index,
        facade.command_history().len()
    );
    Ok(())
}

fn demo_field() -> Field {
    Field::new(
        "field-7",
        "Lange Breite",
        FieldGeometry::new(vec![
            DVec2::new(11.5721, 48.1372),
            DVec2::new(11.5803, 48.1372),
            DVec2::new(11.5803, 48.1421),
            DVec2::new(11.5721, 48.1421),
        ]),
    )
}

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("Ungültiges Datum {}-{}-{}", year, month, day))
}
