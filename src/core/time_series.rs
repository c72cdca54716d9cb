//! Zeitreihen: nach Datum sortierte Beobachtungen und Abspielgeschwindigkeiten.

use agrimap_raster_api::TimeSeriesRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Eine Beobachtung der Zeitreihe (ein Bild).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Mittlerer Indexwert über das Feld
    pub value: Option<f64>,
    pub tile_url: String,
    /// Bewölkung in Prozent
    pub cloud_cover: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, tile_url: impl Into<String>) -> Self {
        Self {
            date,
            value: None,
            tile_url: tile_url.into(),
            cloud_cover: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_cloud_cover(mut self, cloud_cover: f64) -> Self {
        self.cloud_cover = Some(cloud_cover);
        self
    }
}

/// Unveränderliche, aufsteigend nach Datum sortierte Beobachtungsfolge.
///
/// Klonen ist billig (geteilter Slice).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesSequence {
    index_key: String,
    observations: Arc<[Observation]>,
}

impl TimeSeriesSequence {
    /// Erstellt eine Folge; sortiert stabil nach Datum.
    pub fn new(index_key: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|observation| observation.date);
        Self {
            index_key: index_key.into(),
            observations: observations.into(),
        }
    }

    /// Leere Folge (z.B. wenn das Backend keine Bilder liefert).
    pub fn empty(index_key: impl Into<String>) -> Self {
        Self::new(index_key, Vec::new())
    }

    /// Baut eine Folge aus Backend-Einträgen.
    ///
    /// Einträge ohne Tile-URL oder mit unlesbarem Datum werden übersprungen.
    pub fn from_records(index_key: impl Into<String>, records: &[TimeSeriesRecord]) -> Self {
        let index_key = index_key.into();
        let mut observations = Vec::with_capacity(records.len());
        for record in records {
            let Some(tile_url) = record
                .tile_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
            else {
                log::debug!("Zeitreihe '{}': Eintrag {} ohne Tile-URL", index_key, record.date);
                continue;
            };
            let Some(date) = parse_record_date(&record.date) else {
                log::warn!("Zeitreihe '{}': Datum '{}' nicht lesbar", index_key, record.date);
                continue;
            };
            observations.push(Observation {
                date,
                value: record.mean_index_value,
                tile_url: tile_url.to_string(),
                cloud_cover: record.cloud_cover,
            });
        }
        Self::new(index_key, observations)
    }

    pub fn index_key(&self) -> &str {
        &self.index_key
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }
}

/// Akzeptiert `YYYY-MM-DD` und ISO-Zeitstempel (nur das Datum zählt).
fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Erlaubte Abspielgeschwindigkeiten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackSpeed {
    /// 500 ms pro Bild
    Fast,
    /// 1000 ms pro Bild
    #[default]
    Normal,
    /// 2000 ms pro Bild
    Slow,
    /// 3000 ms pro Bild
    VerySlow,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Fast,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Slow,
        PlaybackSpeed::VerySlow,
    ];

    pub fn interval_ms(self) -> u64 {
        match self {
            PlaybackSpeed::Fast => 500,
            PlaybackSpeed::Normal => 1000,
            PlaybackSpeed::Slow => 2000,
            PlaybackSpeed::VerySlow => 3000,
        }
    }

    pub fn interval(self) -> Duration {
        Duration::from_millis(self.interval_ms())
    }

    /// Ordnet ein Intervall einer erlaubten Geschwindigkeit zu.
    pub fn from_interval_ms(interval_ms: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.interval_ms() == interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, tile_url: Option<&str>) -> TimeSeriesRecord {
        TimeSeriesRecord {
            date: date.to_string(),
            mean_index_value: Some(0.5),
            cloud_cover: Some(2.0),
            tile_url: tile_url.map(str::to_string),
        }
    }

    #[test]
    fn records_are_sorted_by_date() {
        let sequence = TimeSeriesSequence::from_records(
            "NDVI",
            &[
                record("2024-03-01", Some("https://t/3")),
                record("2024-01-01", Some("https://t/1")),
                record("2024-02-01T10:30:00Z", Some("https://t/2")),
            ],
        );

        let urls: Vec<_> = sequence
            .observations()
            .iter()
            .map(|o| o.tile_url.as_str())
            .collect();
        assert_eq!(urls, vec!["https://t/1", "https://t/2", "https://t/3"]);
        assert_eq!(sequence.index_key(), "NDVI");
    }

    #[test]
    fn unusable_records_are_skipped() {
        let sequence = TimeSeriesSequence::from_records(
            "NDVI",
            &[
                record("2024-01-01", None),
                record("gestern", Some("https://t/x")),
                record("2024-01-02", Some("  ")),
                record("2024-01-03", Some("https://t/3")),
            ],
        );

        assert_eq!(sequence.len(), 1);
        assert_eq!(
            sequence.get(0).map(|o| o.date),
            NaiveDate::from_ymd_opt(2024, 1, 3)
        );
    }

    #[test]
    fn speeds_map_to_fixed_intervals() {
        assert_eq!(PlaybackSpeed::default().interval_ms(), 1000);
        assert_eq!(PlaybackSpeed::from_interval_ms(3000), Some(PlaybackSpeed::VerySlow));
        assert_eq!(PlaybackSpeed::from_interval_ms(750), None);
    }
}
