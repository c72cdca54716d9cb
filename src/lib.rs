//! AgriMap Overlay Engine Library.
//! Orchestriert Raster-Overlays einer Feld-Überwachungskarte: Sichtbarkeit,
//! exklusive Gruppen, Demand-Cache, Zeitreihen-Playback und Vorher/Nachher-Vergleich.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{
    ChangeDetectionControl, EngineError, FetchError, FetchState, LayerDescriptor,
    OverlayCommand, OverlayCommandFacade, OverlayIntent, PlaybackControl, PlaybackPhase,
    PlaybackSnapshot, RemoteLayerCache, TimeSeriesPlaybackController,
};
pub use core::{
    ChangeDetectionMode, ChangeDetectionSession, ExclusiveGroup, ExclusiveGroupController,
    LayerKind, LayerRegistry, LayerSource, Observation, OverlayLayer, PlaybackSpeed,
    TimeSeriesSequence,
};
pub use shared::{
    DirectiveOp, EngineEvent, EngineOptions, NotificationEvent, NotificationKind,
    RenderDirective,
};
