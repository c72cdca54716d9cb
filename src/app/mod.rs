//! Application-Layer: Fassade, State, Events, Handler, Cache und Playback.

pub mod command_log;
pub mod controller;
pub mod error;
pub mod events;
pub mod handlers;
mod intent_mapping;
pub mod playback;
pub mod remote_cache;
/// Engine State
///
/// Dieses Modul verwaltet den Zustand einer Sitzung (Feld, Layer, Playback, Cache).
pub mod state;

pub use command_log::CommandLog;
pub use controller::OverlayCommandFacade;
pub use error::{EngineError, FetchError};
pub use events::{ChangeDetectionControl, OverlayCommand, OverlayIntent, PlaybackControl};
pub use playback::{PlaybackPhase, PlaybackSnapshot, TimeSeriesPlaybackController};
pub use remote_cache::{FetchState, LayerDescriptor, RemoteLayerCache};
pub use state::EngineState;
