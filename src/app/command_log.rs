//! Begrenztes Command-Log für Diagnose.

use super::OverlayCommand;

/// Speichert ausgeführte Commands in Reihenfolge.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<OverlayCommand>,
}

impl CommandLog {
    const MAX_ENTRIES: usize = 1000;
}

impl CommandLog {
    /// Erstellt ein leeres Command-Log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Fügt einen ausgeführten Command hinzu.
    /// Begrenzt auf MAX_ENTRIES; ist das Log voll, fällt die ältere Hälfte weg.
    pub fn record(&mut self, command: &OverlayCommand) {
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.drain(..Self::MAX_ENTRIES / 2);
        }
        self.entries.push(command.clone());
    }

    /// Gibt die Anzahl der geloggten Commands zurück.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Gibt `true` zurück, wenn keine Commands vorhanden sind.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Liefert eine read-only Sicht auf alle Einträge.
    pub fn entries(&self) -> &[OverlayCommand] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_log_drops_older_half() {
        let mut log = CommandLog::new();
        for index in 0..CommandLog::MAX_ENTRIES {
            log.record(&OverlayCommand::Seek { index });
        }
        assert_eq!(log.len(), CommandLog::MAX_ENTRIES);

        log.record(&OverlayCommand::Play);

        assert_eq!(log.len(), CommandLog::MAX_ENTRIES / 2 + 1);
        assert_eq!(
            log.entries().first(),
            Some(&OverlayCommand::Seek {
                index: CommandLog::MAX_ENTRIES / 2
            })
        );
        assert_eq!(log.entries().last(), Some(&OverlayCommand::Play));
    }
}
