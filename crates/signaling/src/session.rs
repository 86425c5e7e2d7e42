//! Call-Sessions – Die Einheit der Vermittlung
//!
//! Eine `CallSession` ist die Paarung genau eines Anrufers mit genau einem
//! Operator. Die Tabelle haelt beide Nachschlag-Richtungen: primaer nach
//! Anrufer-Handle, gespiegelt nach Operator-Handle.
//!
//! ## State Machine
//! ```text
//! (kein Eintrag) --offer+freier Operator--> Offeriert --answer--> Aktiv
//!       ^                                      |                    |
//!       |                                      v                    v
//!       +------------- endCall / disconnect (beide Seiten) ---------+
//! ```
//!
//! Kandidaten fliessen in `Offeriert` und `Aktiv` in beide Richtungen und
//! aendern den Zustand nicht. `beenden` entfernt den Eintrag aus beiden
//! Tabellenseiten genau einmal; ein zweiter Aufruf findet nichts mehr vor
//! und ist ein No-Op. Nachrichten von Verbindungen ohne Session sind kein
//! Fehler – nach einem Gespraechsende koennen Kandidaten oder ein zweites
//! endCall noch unterwegs sein.

use hotline_core::types::{CallId, ConnectionId, OperatorId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Zustand und Session
// ---------------------------------------------------------------------------

/// Zustand einer Call-Session
///
/// Der Endzustand hat keine Variante: eine beendete Session wird aus der
/// Tabelle entfernt statt markiert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionZustand {
    /// Offer an den Operator weitergeleitet, Antwort steht aus
    Offeriert,
    /// Antwort weitergeleitet, Gespraech laeuft
    Aktiv,
}

/// Eine aktive Anrufer/Operator-Paarung
#[derive(Debug, Clone)]
pub struct CallSession {
    /// Eindeutige ID des Gespraechs (fuer Logs)
    pub call_id: CallId,
    /// Handle des Anrufers
    pub anrufer: ConnectionId,
    /// Kennung des vermittelten Operators
    pub operator_kennung: OperatorId,
    /// Handle des vermittelten Operators
    pub operator_handle: ConnectionId,
    /// Aktueller Zustand
    pub zustand: SessionZustand,
}

/// Von welcher Seite einer Session eine Nachricht stammt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSeite {
    Anrufer,
    Operator,
}

// ---------------------------------------------------------------------------
// CallSessionTable
// ---------------------------------------------------------------------------

/// Tabelle aller aktiven Call-Sessions
///
/// Thread-safe via Arc + Mutex; beide Tabellenseiten werden unter
/// demselben Lock mutiert, damit Abbau genau einmal passiert.
/// Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct CallSessionTable {
    inner: Arc<Mutex<SessionTableInner>>,
}

struct SessionTableInner {
    /// Primaerschluessel: Anrufer-Handle -> Session
    nach_anrufer: HashMap<ConnectionId, CallSession>,
    /// Spiegel: Operator-Handle -> Anrufer-Handle
    nach_operator: HashMap<ConnectionId, ConnectionId>,
}

impl CallSessionTable {
    /// Erstellt eine neue, leere Tabelle
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionTableInner {
                nach_anrufer: HashMap::new(),
                nach_operator: HashMap::new(),
            })),
        }
    }

    /// Erstellt eine neue Session im Zustand `Offeriert`
    ///
    /// Gibt None zurueck wenn eine der beiden Seiten bereits in einer
    /// Session steckt – genau eine Session darf ein gegebenes Anrufer-
    /// oder Operator-Handle referenzieren.
    pub fn erstellen(
        &self,
        anrufer: ConnectionId,
        operator_kennung: OperatorId,
        operator_handle: ConnectionId,
    ) -> Option<CallSession> {
        let mut inner = self.inner.lock();
        if inner.nach_anrufer.contains_key(&anrufer)
            || inner.nach_operator.contains_key(&operator_handle)
        {
            return None;
        }

        let session = CallSession {
            call_id: CallId::new(),
            anrufer,
            operator_kennung,
            operator_handle,
            zustand: SessionZustand::Offeriert,
        };
        inner.nach_operator.insert(operator_handle, anrufer);
        inner.nach_anrufer.insert(anrufer, session.clone());

        tracing::info!(
            call = %session.call_id,
            anrufer = %anrufer,
            operator = %session.operator_kennung,
            "Session erstellt (offeriert)"
        );
        Some(session)
    }

    /// Schaltet die Session des Operators von `Offeriert` auf `Aktiv`
    ///
    /// Antworten kommen immer von der Operator-Seite. Gibt einen Schnappschuss
    /// der aktivierten Session zurueck; None wenn das Handle keine Session
    /// im Zustand `Offeriert` besitzt (verspaetete Antwort, verworfen).
    pub fn aktivieren(&self, operator_handle: &ConnectionId) -> Option<CallSession> {
        let mut inner = self.inner.lock();
        let anrufer = *inner.nach_operator.get(operator_handle)?;
        let session = inner.nach_anrufer.get_mut(&anrufer)?;
        if session.zustand != SessionZustand::Offeriert {
            return None;
        }
        session.zustand = SessionZustand::Aktiv;

        tracing::info!(call = %session.call_id, "Session aktiv");
        Some(session.clone())
    }

    /// Gibt die Gegenstelle einer Verbindung zurueck
    ///
    /// Fuer die Weiterleitung: vom Anrufer zum Operator und umgekehrt.
    /// None wenn die Verbindung in keiner Session steckt.
    pub fn gegenstelle(&self, handle: &ConnectionId) -> Option<(ConnectionId, SessionSeite)> {
        let inner = self.inner.lock();
        if let Some(session) = inner.nach_anrufer.get(handle) {
            return Some((session.operator_handle, SessionSeite::Anrufer));
        }
        let anrufer = inner.nach_operator.get(handle)?;
        Some((*anrufer, SessionSeite::Operator))
    }

    /// Beendet die Session einer Verbindung (beide Seiten moeglich)
    ///
    /// Entfernt den Eintrag aus beiden Tabellenseiten und gibt die
    /// entfernte Session zurueck. Genau der erste Aufruf gewinnt; jeder
    /// weitere findet keinen Eintrag mehr und gibt None zurueck.
    pub fn beenden(&self, handle: &ConnectionId) -> Option<CallSession> {
        let mut inner = self.inner.lock();
        let anrufer = if inner.nach_anrufer.contains_key(handle) {
            *handle
        } else {
            *inner.nach_operator.get(handle)?
        };

        let session = inner.nach_anrufer.remove(&anrufer)?;
        inner.nach_operator.remove(&session.operator_handle);

        tracing::info!(
            call = %session.call_id,
            operator = %session.operator_kennung,
            "Session beendet"
        );
        Some(session)
    }

    /// Prueft ob eine Verbindung in einer Session steckt (beide Seiten)
    pub fn hat_session(&self, handle: &ConnectionId) -> bool {
        let inner = self.inner.lock();
        inner.nach_anrufer.contains_key(handle) || inner.nach_operator.contains_key(handle)
    }

    /// Gibt die Session eines Anrufer- oder Operator-Handles zurueck
    pub fn session_von(&self, handle: &ConnectionId) -> Option<CallSession> {
        let inner = self.inner.lock();
        if let Some(session) = inner.nach_anrufer.get(handle) {
            return Some(session.clone());
        }
        let anrufer = inner.nach_operator.get(handle)?;
        inner.nach_anrufer.get(anrufer).cloned()
    }

    /// Gibt die Anzahl der aktiven Sessions zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.lock().nach_anrufer.len()
    }
}

impl Default for CallSessionTable {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
