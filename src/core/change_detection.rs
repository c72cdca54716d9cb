//! Vorher/Nachher-Vergleich zweier Bilder einer Zeitreihe.
//!
//! Reine Zustandsmaschine; das Rendern der aufgelösten Beobachtung
//! übernimmt der Aufrufer.

use serde::Serialize;

/// Modus der Vergleichssitzung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeDetectionMode {
    #[default]
    Off,
    SelectingBefore,
    SelectingAfter,
    /// Beide Bilder gewählt; die nächste Auswahl ersetzt das Vorher-Bild
    Ready,
}

/// Zustand einer Vergleichssitzung.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetectionSession {
    mode: ChangeDetectionMode,
    before_index: Option<usize>,
    after_index: Option<usize>,
    position: f64,
}

impl ChangeDetectionSession {
    /// Schieberposition, ab der das Nachher-Bild gilt.
    pub const MIDPOINT: f64 = 0.5;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ChangeDetectionMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != ChangeDetectionMode::Off
    }

    pub fn before_index(&self) -> Option<usize> {
        self.before_index
    }

    pub fn after_index(&self) -> Option<usize> {
        self.after_index
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Startet eine neue Auswahl (Indizes leer, Position 0).
    pub fn enter(&mut self) {
        *self = Self {
            mode: ChangeDetectionMode::SelectingBefore,
            ..Self::default()
        };
    }

    /// Beendet die Sitzung und verwirft alle Auswahl.
    pub fn exit(&mut self) {
        *self = Self::default();
    }

    /// Wählt ein Bild aus einer Folge der Länge `len`.
    ///
    /// Abwechselnd Vorher und Nachher; die jeweils andere Auswahl bleibt
    /// erhalten, beide Bilder lassen sich also beliebig oft neu wählen.
    /// Gibt `true` zurück, sobald beide Indizes gesetzt sind.
    pub fn select_index(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            log::debug!("Auswahl {} außerhalb der Folge (Länge {})", index, len);
            return false;
        }
        match self.mode {
            ChangeDetectionMode::Off => return false,
            ChangeDetectionMode::SelectingBefore | ChangeDetectionMode::Ready => {
                self.before_index = Some(index);
                self.mode = ChangeDetectionMode::SelectingAfter;
            }
            ChangeDetectionMode::SelectingAfter => {
                self.after_index = Some(index);
                self.mode = ChangeDetectionMode::Ready;
            }
        }
        self.has_pair()
    }

    /// Beide Bilder gewählt.
    pub fn has_pair(&self) -> bool {
        self.before_index.is_some() && self.after_index.is_some()
    }

    /// Setzt die Schieberposition (auf [0, 1] geklemmt).
    ///
    /// Nicht-endliche Werte werden ignoriert.
    pub fn set_position(&mut self, position: f64) {
        if position.is_finite() {
            self.position = position.clamp(0.0, 1.0);
        }
    }

    /// Index des Bildes, das bei der aktuellen Position gilt.
    ///
    /// Harte Umschaltung an `MIDPOINT`, keine Überblendung. `None`, solange
    /// das benötigte Bild noch nicht gewählt ist.
    pub fn resolve(&self) -> Option<usize> {
        if !self.is_active() {
            return None;
        }
        if self.position < Self::MIDPOINT {
            self.before_index
        } else {
            self.after_index
        }
    }
}
