//! Signalisierungs-Protokoll (TCP)
//!
//! Definiert alle Ereignisse die zwischen Peers und dem Relay ausgetauscht
//! werden. Das Relay vermittelt Anrufer an Operatoren und leitet danach
//! Session-Beschreibungen und Verbindungs-Kandidaten unveraendert weiter.
//!
//! ## Design
//! - JSON-Serialisierung via serde (TCP, nicht zeitkritisch)
//! - Tagged Enum fuer typsichere Nachrichtentypen
//! - `sdp` und `ice` sind opake Blobs des WebRTC-Stacks der Peers.
//!   Das Relay parst sie niemals, sie werden als `serde_json::Value`
//!   unveraendert durchgereicht.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ablehnungsgruende
// ---------------------------------------------------------------------------

/// Grund-String fuer eine Anmeldung mit unbekannter Kennung
pub const GRUND_UNGUELTIGE_KENNUNG: &str = "invalid id";

/// Grund-String fuer eine Anmeldung waehrend die Kennung bereits aktiv ist
pub const GRUND_BEREITS_ANGEMELDET: &str = "already logged in";

// ---------------------------------------------------------------------------
// Haupt-Enum: SignalMessage
// ---------------------------------------------------------------------------

/// Alle moeglichen Signalisierungs-Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalMessage {
    // Anmeldung
    /// Operator meldet sich mit seiner Kennung an (Client -> Server)
    OperatorLogin { identity: String },
    /// Anmeldung erfolgreich (Server -> Client)
    OperatorLoginSuccess,
    /// Anmeldung abgelehnt (Server -> Client)
    OperatorLoginFailure { reason: String },
    /// Anrufer meldet sich an (Client -> Server)
    CallerLogin,
    /// Anrufer-Anmeldung bestaetigt (Server -> Client)
    CallerLoginSuccess,

    // Vermittlung
    /// Session-Beschreibung des Anrufers, wird an den Operator weitergeleitet
    Offer { sdp: serde_json::Value },
    /// Antwort des Operators, wird an den Anrufer weitergeleitet
    Answer { sdp: serde_json::Value },
    /// Verbindungs-Kandidat, wird an die Gegenstelle weitergeleitet
    Candidate { ice: serde_json::Value },
    /// Gespraechsende (beide Richtungen)
    EndCall,
    /// Kein Operator frei (Server -> Anrufer)
    NoOperatorAvailable,
    /// Gespraech zustande gekommen (Server -> beide Parteien)
    CallStarted,

    // Keepalive
    /// Ping (Server -> Client), Unix-Timestamp in Millisekunden
    Ping { timestamp_ms: u64 },
    /// Pong-Antwort, spiegelt den Timestamp zurueck
    Pong { echo_timestamp_ms: u64 },
}

impl SignalMessage {
    /// Erstellt eine Offer-Nachricht
    pub fn offer(sdp: serde_json::Value) -> Self {
        Self::Offer { sdp }
    }

    /// Erstellt eine Answer-Nachricht
    pub fn answer(sdp: serde_json::Value) -> Self {
        Self::Answer { sdp }
    }

    /// Erstellt eine Candidate-Nachricht
    pub fn candidate(ice: serde_json::Value) -> Self {
        Self::Candidate { ice }
    }

    /// Erstellt eine abgelehnte Anmelde-Antwort
    pub fn login_abgelehnt(reason: impl Into<String>) -> Self {
        Self::OperatorLoginFailure {
            reason: reason.into(),
        }
    }

    /// Erstellt eine Ping-Nachricht
    pub fn ping(timestamp_ms: u64) -> Self {
        Self::Ping { timestamp_ms }
    }

    /// Erstellt eine Pong-Antwort
    pub fn pong(echo_timestamp_ms: u64) -> Self {
        Self::Pong { echo_timestamp_ms }
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert eine Nachricht aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
