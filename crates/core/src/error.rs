//! Fehlertypen fuer Hotline
//!
//! Zentraler Fehler-Enum der von Pool und Konfiguration gemeinsam genutzt
//! wird. Kein Fehler ist fatal fuer den Prozess: eine fehlerhafte
//! Ereignisfolge einer einzelnen Verbindung darf niemals die Session einer
//! anderen Verbindung beschaedigen.

use thiserror::Error;

/// Globaler Result-Alias fuer Hotline
pub type Result<T> = std::result::Result<T, HotlineError>;

/// Alle moeglichen Fehler im Hotline-System
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotlineError {
    /// Anmeldung mit einer Kennung die nicht in der Erlaubnisliste steht
    #[error("Ungueltige Operator-Kennung: {0}")]
    UngueltigeKennung(String),

    /// Anmeldung waehrend die Kennung bereits eine live Verbindung hat
    #[error("Operator-Kennung bereits angemeldet: {0}")]
    KennungBereitsAktiv(String),

    /// Fehler in der Server-Konfiguration
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),
}

impl HotlineError {
    /// Erstellt einen Konfigurationsfehler
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehlermeldungen_enthalten_kontext() {
        let e = HotlineError::UngueltigeKennung("op9".into());
        assert!(e.to_string().contains("op9"));

        let e = HotlineError::KennungBereitsAktiv("op1".into());
        assert!(e.to_string().contains("op1"));
    }
}
