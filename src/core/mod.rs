//! Core-Domänentypen: Overlays, Registry, exklusive Gruppen, Zeitreihen, Vergleichsmodus.

pub mod change_detection;
pub mod exclusive_group;
pub mod layer_registry;
pub mod overlay_layer;
pub mod time_series;

pub use change_detection::{ChangeDetectionMode, ChangeDetectionSession};
pub use exclusive_group::{ExclusiveGroup, ExclusiveGroupController};
pub use layer_registry::LayerRegistry;
pub use overlay_layer::{LayerKind, LayerSource, OverlayLayer};
pub use time_series::{Observation, PlaybackSpeed, TimeSeriesSequence};
