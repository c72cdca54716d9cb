use agrimap_raster_api::Field;
use chrono::NaiveDate;

use crate::core::{PlaybackSpeed, TimeSeriesSequence};

/// Eingaben aus UI/System ohne direkte Mutationslogik.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayIntent {
    /// Layer-Schalter betätigt; Bedeutung hängt von Art und Gruppe ab
    LayerToggled { key: String },
    /// Schalter innerhalb einer exklusiven Gruppe
    ExclusiveToggled { group_id: String, key: String },
    /// Schalter eines abgerufenen Layers (Anbaufläche, Heatmap)
    DemandLayerToggled { key: String },
    /// Deckkraft-Regler bewegt
    OpacityChanged { key: String, opacity: f32 },
    /// Datum eines Bilddienst-Layers geändert
    LayerTimeChanged { key: String, time: String },

    /// Zeitreihe von außen übergeben
    TimeSeriesLoaded { sequence: TimeSeriesSequence },
    /// Zeitreihe verworfen (Analyse geschlossen)
    TimeSeriesCleared,
    PlayRequested,
    PauseRequested,
    /// Play/Pause-Knopf
    PlayPauseToggled,
    SpeedChanged { speed: PlaybackSpeed },
    /// Zeitleiste angeklickt
    SeekRequested { index: usize },
    StepForwardRequested,
    StepBackRequested,

    ChangeDetectionEntered,
    ChangeDetectionExited,
    /// Vergleichs-Schalter
    ChangeDetectionToggled,
    /// Bild in der Vergleichsauswahl angeklickt
    ComparisonImageSelected { index: usize },
    /// Vergleichs-Schieber bewegt
    ComparisonSliderMoved { position: f64 },

    FieldSelected { field: Field },
    FieldCleared,
    TimeSeriesRequested {
        index_key: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    HeatMapRequested { index_key: String, date: NaiveDate },
}

/// Bedienung des Playbacks (Kurzform für die Fassade).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackControl {
    Play,
    Pause,
    Toggle,
    Seek(usize),
    StepForward,
    StepBack,
    SetSpeed(PlaybackSpeed),
}

impl From<PlaybackControl> for OverlayIntent {
    fn from(control: PlaybackControl) -> Self {
        match control {
            PlaybackControl::Play => OverlayIntent::PlayRequested,
            PlaybackControl::Pause => OverlayIntent::PauseRequested,
            PlaybackControl::Toggle => OverlayIntent::PlayPauseToggled,
            PlaybackControl::Seek(index) => OverlayIntent::SeekRequested { index },
            PlaybackControl::StepForward => OverlayIntent::StepForwardRequested,
            PlaybackControl::StepBack => OverlayIntent::StepBackRequested,
            PlaybackControl::SetSpeed(speed) => OverlayIntent::SpeedChanged { speed },
        }
    }
}

/// Bedienung des Vergleichsmodus (Kurzform für die Fassade).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeDetectionControl {
    Enter,
    Exit,
    Toggle,
    Select(usize),
    SetPosition(f64),
}

impl From<ChangeDetectionControl> for OverlayIntent {
    fn from(control: ChangeDetectionControl) -> Self {
        match control {
            ChangeDetectionControl::Enter => OverlayIntent::ChangeDetectionEntered,
            ChangeDetectionControl::Exit => OverlayIntent::ChangeDetectionExited,
            ChangeDetectionControl::Toggle => OverlayIntent::ChangeDetectionToggled,
            ChangeDetectionControl::Select(index) => {
                OverlayIntent::ComparisonImageSelected { index }
            }
            ChangeDetectionControl::SetPosition(position) => {
                OverlayIntent::ComparisonSliderMoved { position }
            }
        }
    }
}
