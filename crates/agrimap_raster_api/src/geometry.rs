//! Feld und Feldumriss.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Ein überwachtes Feld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Stabile Feld-ID aus der Feldverwaltung
    pub id: String,
    /// Anzeigename
    pub name: String,
    /// Umriss des Feldes
    pub geometry: FieldGeometry,
}

impl Field {
    /// Erstellt ein Feld.
    pub fn new(id: impl Into<String>, name: impl Into<String>, geometry: FieldGeometry) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            geometry,
        }
    }
}

/// Umriss als Polygon-Ring (x = Längengrad, y = Breitengrad).
///
/// Der Startpunkt wird am Ende nicht wiederholt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldGeometry {
    pub ring: Vec<DVec2>,
}

impl FieldGeometry {
    /// Erstellt einen Umriss aus Eckpunkten.
    ///
    /// Ein explizit geschlossener Ring (letzter == erster Punkt) wird
    /// auf die offene Form gekürzt.
    pub fn new(mut ring: Vec<DVec2>) -> Self {
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        Self { ring }
    }

    /// Gibt `true` zurück, wenn keine Eckpunkte vorhanden sind.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Flächenschwerpunkt des Polygons (Shoelace-Formel).
    ///
    /// Bei degenerierten Ringen (Fläche ~0) wird der Mittelwert der
    /// Eckpunkte verwendet.
    pub fn centroid(&self) -> Option<DVec2> {
        let n = self.ring.len();
        if n == 0 {
            return None;
        }

        let mut twice_area = 0.0;
        let mut weighted = DVec2::ZERO;
        for i in 0..n {
            let a = self.ring[i];
            let b = self.ring[(i + 1) % n];
            let cross = a.perp_dot(b);
            twice_area += cross;
            weighted += (a + b) * cross;
        }

        if twice_area.abs() < f64::EPSILON {
            let sum = self.ring.iter().fold(DVec2::ZERO, |acc, p| acc + *p);
            return Some(sum / n as f64);
        }

        Some(weighted / (3.0 * twice_area))
    }
}
