//! Cache für remote abgerufene Layer-Beschreibungen.
//!
//! Pro Key läuft höchstens ein Abruf; weitere Anfragen während des Abrufs
//! warten auf dasselbe Ergebnis. Ein Abruf schreibt sein Ergebnis nur, wenn
//! sein Eintrag noch derselbe laufende Abruf ist (`request_token`), sodass
//! `invalidate`/`reset` veraltete Antworten verwerfen.

use agrimap_raster_api::VisParams;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use super::FetchError;

/// Aufgelöste Quelle eines abgerufenen Layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    pub key: String,
    pub tile_url: String,
    /// Legende (nur Heatmaps)
    pub legend: Option<VisParams>,
    pub first_image_date: Option<String>,
    /// Token des Abrufs, der diese Beschreibung geliefert hat
    pub request_token: u64,
    pub fetched_at: DateTime<Utc>,
}

impl LayerDescriptor {
    /// Beschreibung mit Tile-URL; Zeitstempel = jetzt.
    pub fn new(key: impl Into<String>, tile_url: impl Into<String>, request_token: u64) -> Self {
        Self {
            key: key.into(),
            tile_url: tile_url.into(),
            legend: None,
            first_image_date: None,
            request_token,
            fetched_at: Utc::now(),
        }
    }
}

/// Abrufzustand eines Keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchState {
    NotRequested,
    InFlight,
    Ready,
    Failed,
}

type FetchResult = Result<LayerDescriptor, FetchError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

enum Slot {
    InFlight { token: u64, future: SharedFetch },
    Ready(LayerDescriptor),
    Failed { error: FetchError },
}

#[derive(Default)]
struct CacheInner {
    slots: HashMap<String, Slot>,
    next_token: u64,
}

/// Geteilter Cache pro Layer-Key (billig klonbar).
#[derive(Clone, Default)]
pub struct RemoteLayerCache {
    inner: Arc<Mutex<CacheInner>>,
    max_age: Option<chrono::Duration>,
}

impl RemoteLayerCache {
    /// Erstellt einen Cache ohne Ablauf.
    pub fn new() -> Self {
        Self::default()
    }

    /// Erstellt einen Cache, dessen `Ready`-Einträge nach `max_age` neu geholt werden.
    pub fn with_max_age(max_age: Option<chrono::Duration>) -> Self {
        Self {
            max_age,
            ..Self::default()
        }
    }

    /// Liefert die Beschreibung zu `key`, ruft sie bei Bedarf ab.
    ///
    /// - `Ready` (und nicht abgelaufen): gecachtes Ergebnis, kein Abruf
    /// - `InFlight`: wartet auf den laufenden Abruf
    /// - sonst: neuer Abruf über `fetch(request_token)`
    ///
    /// Der Abruf läuft in einem eigenen Task zu Ende, auch wenn alle
    /// Wartenden abbrechen. `fetch` wird unter dem Cache-Lock aufgerufen
    /// und darf nur den Future bauen.
    pub async fn ensure_loaded<F, Fut>(&self, key: &str, fetch: F) -> FetchResult
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = FetchResult> + Send + 'static,
    {
        let (token, future) = {
            let mut inner = self.inner.lock();
            match inner.slots.get(key) {
                Some(Slot::Ready(descriptor)) if !self.is_expired(descriptor) => {
                    log::debug!("Cache-Treffer für '{}'", key);
                    return Ok(descriptor.clone());
                }
                Some(Slot::InFlight { token, future }) => {
                    log::debug!("'{}' wird bereits abgerufen, warte auf Ergebnis", key);
                    (*token, future.clone())
                }
                _ => {
                    inner.next_token += 1;
                    let token = inner.next_token;
                    let future = fetch(token).boxed().shared();
                    inner.slots.insert(
                        key.to_string(),
                        Slot::InFlight {
                            token,
                            future: future.clone(),
                        },
                    );
                    log::debug!("Abruf für '{}' gestartet (Token {})", key, token);

                    let driver = self.clone();
                    let driver_key = key.to_string();
                    let driver_future = future.clone();
                    tokio::spawn(async move {
                        let result = driver_future.await;
                        driver.commit(&driver_key, token, result);
                    });
                    (token, future)
                }
            }
        };

        let result = future.await;
        self.commit(key, token, result.clone());
        result
    }

    /// Verwirft den Eintrag; der nächste `ensure_loaded` ruft neu ab.
    pub fn invalidate(&self, key: &str) {
        if self.inner.lock().slots.remove(key).is_some() {
            log::debug!("Cache-Eintrag '{}' verworfen", key);
        }
    }

    /// Verwirft alle Einträge (Feldwechsel). Tokens bleiben monoton.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let count = inner.slots.len();
        inner.slots.clear();
        log::debug!("Cache zurückgesetzt ({} Einträge)", count);
    }

    /// Abrufzustand von `key`.
    pub fn fetch_state(&self, key: &str) -> FetchState {
        match self.inner.lock().slots.get(key) {
            None => FetchState::NotRequested,
            Some(Slot::InFlight { .. }) => FetchState::InFlight,
            Some(Slot::Ready(_)) => FetchState::Ready,
            Some(Slot::Failed { .. }) => FetchState::Failed,
        }
    }

    /// Gecachte Beschreibung, falls `Ready`.
    pub fn payload(&self, key: &str) -> Option<LayerDescriptor> {
        match self.inner.lock().slots.get(key) {
            Some(Slot::Ready(descriptor)) => Some(descriptor.clone()),
            _ => None,
        }
    }

    /// Letzter Fehler, falls `Failed`.
    pub fn last_error(&self, key: &str) -> Option<FetchError> {
        match self.inner.lock().slots.get(key) {
            Some(Slot::Failed { error }) => Some(error.clone()),
            _ => None,
        }
    }

    /// Schreibt ein Ergebnis, wenn der Eintrag noch zu `token` gehört.
    fn commit(&self, key: &str, token: u64, result: FetchResult) {
        let mut inner = self.inner.lock();
        let Some(slot) = inner.slots.get_mut(key) else {
            log::debug!("Ergebnis für '{}' (Token {}) verworfen: Eintrag entfernt", key, token);
            return;
        };
        match slot {
            Slot::InFlight { token: current, .. } if *current == token => {
                *slot = match result {
                    Ok(descriptor) => Slot::Ready(descriptor),
                    Err(error) => {
                        log::warn!("Abruf für '{}' fehlgeschlagen: {}", key, error);
                        Slot::Failed { error }
                    }
                };
            }
            Slot::InFlight { .. } => {
                log::debug!("Ergebnis für '{}' (Token {}) verworfen: neuerer Abruf", key, token);
            }
            // Bereits vom Treiber-Task oder einem anderen Wartenden geschrieben
            Slot::Ready(_) | Slot::Failed { .. } => {}
        }
    }

    fn is_expired(&self, descriptor: &LayerDescriptor) -> bool {
        self.max_age
            .is_some_and(|max_age| Utc::now() - descriptor.fetched_at > max_age)
    }
}
