//! Signal-Outbox – Sendet Nachrichten gezielt an einzelne Verbindungen
//!
//! Die Outbox verwaltet die Send-Queues aller verbundenen Peers. Jede
//! Weiterleitung ist gezielt an genau eine Verbindung adressiert; einen
//! Rundruf an alle gibt es bewusst nicht. Senden ist nicht-blockierend:
//! Tabellen-Mutationen warten niemals auf Netzwerk-IO.

use dashmap::DashMap;
use hotline_core::types::ConnectionId;
use hotline_protocol::signal::SignalMessage;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// PeerSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer verbundenen Peer-Verbindung
#[derive(Clone, Debug)]
pub struct PeerSender {
    pub handle: ConnectionId,
    pub tx: mpsc::Sender<SignalMessage>,
}

impl PeerSender {
    /// Sendet eine Nachricht nicht-blockierend an den Peer
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, nachricht: SignalMessage) -> bool {
        match self.tx.try_send(nachricht) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.handle, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.handle, "Send-Queue geschlossen (Peer getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SignalOutbox
// ---------------------------------------------------------------------------

/// Zentrale Outbox fuer alle verbundenen Peers
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct SignalOutbox {
    inner: Arc<DashMap<ConnectionId, PeerSender>>,
}

impl SignalOutbox {
    /// Erstellt eine neue SignalOutbox
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Registriert eine neue Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die `ClientConnection` liest aus dieser Queue und sendet via TCP.
    pub fn verbindung_registrieren(&self, handle: ConnectionId) -> mpsc::Receiver<SignalMessage> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.inner.insert(handle, PeerSender { handle, tx });
        tracing::debug!(verbindung = %handle, "Verbindung in Outbox registriert");
        rx
    }

    /// Entfernt eine Verbindung aus der Outbox
    pub fn verbindung_entfernen(&self, handle: &ConnectionId) {
        self.inner.remove(handle);
        tracing::debug!(verbindung = %handle, "Verbindung aus Outbox entfernt");
    }

    /// Sendet eine Nachricht an eine einzelne Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung gefunden und die Nachricht
    /// eingereiht wurde.
    pub fn an_verbindung_senden(&self, handle: &ConnectionId, nachricht: SignalMessage) -> bool {
        match self.inner.get(handle) {
            Some(sender) => sender.senden(nachricht),
            None => {
                tracing::debug!(verbindung = %handle, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    /// Sendet dieselbe Nachricht an beide Parteien einer Session
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_beide_senden(
        &self,
        erste: &ConnectionId,
        zweite: &ConnectionId,
        nachricht: SignalMessage,
    ) -> usize {
        let mut gesendet = 0;
        if self.an_verbindung_senden(erste, nachricht.clone()) {
            gesendet += 1;
        }
        if self.an_verbindung_senden(zweite, nachricht) {
            gesendet += 1;
        }
        gesendet
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, handle: &ConnectionId) -> bool {
        self.inner.contains_key(handle)
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn verbindungs_anzahl(&self) -> usize {
        self.inner.len()
    }
}

impl Default for SignalOutbox {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
