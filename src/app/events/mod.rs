//! OverlayIntent- und OverlayCommand-Enums für den Intent/Command-Datenfluss.

mod command;
mod intent;

pub use command::OverlayCommand;
pub use intent::{ChangeDetectionControl, OverlayIntent, PlaybackControl};
