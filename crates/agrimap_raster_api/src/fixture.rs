//! In-Memory-Backend aus JSON-Fixtures.
//!
//! Wird vom Demo-Binary und von den Tests verwendet. Antworten liegen als
//! rohes JSON vor und werden erst beim Abruf deserialisiert, damit auch
//! fehlerhafte Payloads durchgespielt werden können.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::{
    BackendError, DemandLayerResponse, Field, HeatMapQuery, HeatMapResponse, RasterBackend,
    TimeSeriesQuery, TimeSeriesResponse,
};

/// Rohdaten eines Fixture-Backends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureSet {
    /// Anbauflächen-Antworten nach Layer-Key
    #[serde(default)]
    pub demand_layers: HashMap<String, serde_json::Value>,
    /// Zeitreihen-Antworten nach Index-Key
    #[serde(default)]
    pub time_series: HashMap<String, serde_json::Value>,
    /// Heatmap-Antworten nach Index-Key
    #[serde(default)]
    pub heat_maps: HashMap<String, serde_json::Value>,
}

/// Fixture-basiertes `RasterBackend` mit optionaler Latenz und Aufrufzählern.
#[derive(Default)]
pub struct FixtureBackend {
    fixtures: RwLock<FixtureSet>,
    failing: RwLock<HashSet<String>>,
    latency: Duration,
    demand_calls: RwLock<HashMap<String, usize>>,
    time_series_calls: AtomicUsize,
    heat_map_calls: AtomicUsize,
}

impl FixtureBackend {
    /// Erstellt ein Backend aus bereits geladenen Fixtures.
    pub fn new(fixtures: FixtureSet) -> Self {
        Self {
            fixtures: RwLock::new(fixtures),
            ..Self::default()
        }
    }

    /// Liest Fixtures aus einem JSON-Dokument.
    pub fn from_json(json: &str) -> Result<Self, BackendError> {
        let fixtures: FixtureSet = serde_json::from_str(json)?;
        log::debug!(
            "Fixtures geladen: {} Anbauflächen, {} Zeitreihen, {} Heatmaps",
            fixtures.demand_layers.len(),
            fixtures.time_series.len(),
            fixtures.heat_maps.len()
        );
        Ok(Self::new(fixtures))
    }

    /// Setzt eine künstliche Antwortzeit für alle Endpunkte.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Lässt Anfragen für `key` (Layer- oder Index-Key) mit Transportfehler scheitern.
    pub fn set_failing(&self, key: &str, failing: bool) {
        let mut set = self.failing.write();
        if failing {
            set.insert(key.to_string());
        } else {
            set.remove(key);
        }
    }

    /// Hinterlegt eine Anbauflächen-Antwort.
    pub fn insert_demand_layer(&self, key: &str, response: &DemandLayerResponse) {
        if let Ok(value) = serde_json::to_value(response) {
            self.fixtures
                .write()
                .demand_layers
                .insert(key.to_string(), value);
        }
    }

    /// Hinterlegt eine Zeitreihen-Antwort.
    pub fn insert_time_series(&self, index_key: &str, response: &TimeSeriesResponse) {
        if let Ok(value) = serde_json::to_value(response) {
            self.fixtures
                .write()
                .time_series
                .insert(index_key.to_string(), value);
        }
    }

    /// Hinterlegt eine Heatmap-Antwort.
    pub fn insert_heat_map(&self, index_key: &str, response: &HeatMapResponse) {
        if let Ok(value) = serde_json::to_value(response) {
            self.fixtures
                .write()
                .heat_maps
                .insert(index_key.to_string(), value);
        }
    }

    /// Anzahl der Demand-Abrufe für `key`.
    pub fn demand_calls(&self, key: &str) -> usize {
        self.demand_calls.read().get(key).copied().unwrap_or(0)
    }

    /// Anzahl aller Zeitreihen-Abrufe.
    pub fn time_series_calls(&self) -> usize {
        self.time_series_calls.load(Ordering::SeqCst)
    }

    /// Anzahl aller Heatmap-Abrufe.
    pub fn heat_map_calls(&self) -> usize {
        self.heat_map_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn check_failing(&self, key: &str) -> Result<(), BackendError> {
        if self.failing.read().contains(key) {
            return Err(BackendError::Transport(format!(
                "Verbindung für '{}' abgebrochen",
                key
            )));
        }
        Ok(())
    }

    fn lookup<T: serde::de::DeserializeOwned>(
        table: &HashMap<String, serde_json::Value>,
        key: &str,
    ) -> Result<T, BackendError> {
        let value = table
            .get(key)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(key.to_string()))?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl RasterBackend for FixtureBackend {
    async fn fetch_demand_layer(
        &self,
        key: &str,
        field: &Field,
    ) -> Result<DemandLayerResponse, BackendError> {
        *self.demand_calls.write().entry(key.to_string()).or_insert(0) += 1;
        log::debug!("Fixture: Anbaufläche '{}' für Feld '{}'", key, field.id);

        self.simulate_latency().await;
        self.check_failing(key)?;
        Self::lookup(&self.fixtures.read().demand_layers, key)
    }

    async fn fetch_time_series(
        &self,
        query: &TimeSeriesQuery,
    ) -> Result<TimeSeriesResponse, BackendError> {
        self.time_series_calls.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "Fixture: Zeitreihe '{}' {}..{}",
            query.index_key,
            query.start_date,
            query.end_date
        );

        self.simulate_latency().await;
        self.check_failing(&query.index_key)?;
        Self::lookup(&self.fixtures.read().time_series, &query.index_key)
    }

    async fn fetch_heat_map(&self, query: &HeatMapQuery) -> Result<HeatMapResponse, BackendError> {
        self.heat_map_calls.fetch_add(1, Ordering::SeqCst);
        log::debug!("Fixture: Heatmap '{}' am {}", query.index_key, query.date);

        self.simulate_latency().await;
        self.check_failing(&query.index_key)?;
        Self::lookup(&self.fixtures.read().heat_maps, &query.index_key)
    }
}
