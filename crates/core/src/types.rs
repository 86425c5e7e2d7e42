//! Gemeinsame Identifikationstypen fuer Hotline
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutiges Handle einer Peer-Verbindung
///
/// Wird beim Verbindungsaufbau vergeben und identifiziert die Verbindung
/// in Registry, Pool und Session-Tabelle. Die Transportschicht besitzt
/// die Verbindung selbst, der Kern referenziert sie nur ueber dieses Handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Eindeutige ID eines vermittelten Gespraechs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub Uuid);

impl CallId {
    /// Erstellt eine neue zufaellige CallId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call:{}", self.0)
    }
}

/// Kennung eines Operators aus der statischen Erlaubnisliste
///
/// Im Gegensatz zu den UUID-Typen ist die Kennung ein vom Betreiber
/// vergebener String ("op1", "zentrale", ...). Pro Kennung darf zu jedem
/// Zeitpunkt hoechstens eine live Verbindung angemeldet sein.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub String);

impl OperatorId {
    /// Erstellt eine OperatorId aus einem String
    pub fn neu(kennung: impl Into<String>) -> Self {
        Self(kennung.into())
    }

    /// Gibt die Kennung als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operator:{}", self.0)
    }
}

impl From<&str> for OperatorId {
    fn from(kennung: &str) -> Self {
        Self(kennung.to_string())
    }
}
