//! Feature-Handler für OverlayCommand-Verarbeitung.
//!
//! Jeder Handler gruppiert die Command-Ausführung eines Feature-Bereichs.
//! Der Controller dispatcht an die passende Handler-Funktion; alle Handler
//! laufen unter dem Engine-Lock und dürfen nicht warten.

pub mod change_detection;
pub mod fetch;
pub mod layers;
pub mod playback;
pub mod session;
