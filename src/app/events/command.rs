use agrimap_raster_api::Field;
use chrono::NaiveDate;

use crate::core::{PlaybackSpeed, TimeSeriesSequence};

/// Commands sind mutierende Schritte, die zentral ausgeführt werden.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCommand {
    // === Layer ===
    /// Gruppenmitglied aktivieren (Geschwister ausblenden, Ansicht normalisieren)
    ActivateExclusive { group_id: String, key: String },
    /// Gruppenmitglied ausblenden
    DeactivateExclusive { group_id: String, key: String },
    /// Layer mit vorhandener Quelle einblenden
    ShowLayer { key: String },
    /// Abgerufenen Layer laden (Cache) und einblenden
    ShowDemandLayer { key: String },
    /// Layer ausblenden
    HideLayer { key: String },
    /// Deckkraft setzen
    SetOpacity { key: String, opacity: f32 },
    /// Zeitparameter eines Bilddienst-Layers setzen
    SetLayerTime { key: String, time: String },

    // === Zeitreihe ===
    /// Zeitreihe ersetzen
    LoadTimeSeries { sequence: TimeSeriesSequence },
    /// Zeitreihe verwerfen und Layer ausblenden
    ClearTimeSeries,
    Play,
    Pause,
    SetPlaybackSpeed { speed: PlaybackSpeed },
    Seek { index: usize },
    StepForward,
    StepBack,

    // === Vergleichsmodus ===
    EnterChangeDetection,
    ExitChangeDetection,
    /// Vorher- bzw. Nachher-Bild wählen
    SelectComparisonImage { index: usize },
    /// Schieberposition in [0, 1]
    SetComparisonPosition { position: f64 },

    // === Feld & Backend-Anfragen ===
    SelectField { field: Field },
    ClearField,
    /// Zeitreihe beim Backend anfordern und laden
    RequestTimeSeries {
        index_key: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// Heatmap beim Backend anfordern und einblenden
    RequestHeatMap { index_key: String, date: NaiveDate },
}

impl OverlayCommand {
    /// Gibt `true` zurück, wenn der Command auf das Backend wartet.
    pub fn is_async(&self) -> bool {
        matches!(
            self,
            OverlayCommand::ShowDemandLayer { .. }
                | OverlayCommand::RequestTimeSeries { .. }
                | OverlayCommand::RequestHeatMap { .. }
        )
    }
}
