//! Connection-Registry – Verwaltet alle live Verbindungen und ihre Rollen
//!
//! Jede Peer-Verbindung wird beim Aufbau registriert und startet ohne
//! Rolle. Erst die Anmeldung (Operator oder Anrufer) ordnet eine Rolle zu.
//! Beim Trennen wird der Eintrag entfernt; die Kaskade in Pool und
//! Session-Tabelle uebernimmt der Dispatcher.

use dashmap::DashMap;
use hotline_core::types::ConnectionId;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Rolle
// ---------------------------------------------------------------------------

/// Rolle einer Peer-Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRolle {
    /// Verbunden, noch nicht angemeldet
    Unzugeordnet,
    /// Als Operator angemeldet
    Operator,
    /// Als Anrufer angemeldet
    Anrufer,
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Registry aller live Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
/// Unbekannte Handles sind ueberall ein No-Op und werden niemals an
/// Peers gemeldet.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<DashMap<ConnectionId, PeerRolle>>,
}

impl ConnectionRegistry {
    /// Erstellt eine neue, leere Registry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Registriert eine neue Verbindung ohne Rolle
    pub fn registrieren(&self, handle: ConnectionId) {
        self.inner.insert(handle, PeerRolle::Unzugeordnet);
        tracing::debug!(verbindung = %handle, "Verbindung registriert");
    }

    /// Setzt die Rolle einer Verbindung
    ///
    /// No-Op wenn das Handle unbekannt ist.
    pub fn rolle_setzen(&self, handle: &ConnectionId, rolle: PeerRolle) {
        match self.inner.get_mut(handle) {
            Some(mut eintrag) => *eintrag = rolle,
            None => {
                tracing::debug!(verbindung = %handle, "Rolle fuer unbekannte Verbindung");
            }
        }
    }

    /// Gibt die Rolle einer Verbindung zurueck
    pub fn rolle_von(&self, handle: &ConnectionId) -> Option<PeerRolle> {
        self.inner.get(handle).map(|eintrag| *eintrag)
    }

    /// Entfernt eine Verbindung aus der Registry
    ///
    /// Gibt die bisherige Rolle zurueck, None wenn das Handle unbekannt war.
    pub fn entfernen(&self, handle: &ConnectionId) -> Option<PeerRolle> {
        let entfernt = self.inner.remove(handle).map(|(_, rolle)| rolle);
        if entfernt.is_some() {
            tracing::debug!(verbindung = %handle, "Verbindung aus Registry entfernt");
        }
        entfernt
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, handle: &ConnectionId) -> bool {
        self.inner.contains_key(handle)
    }

    /// Gibt die Anzahl der live Verbindungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrieren_startet_unzugeordnet() {
        let registry = ConnectionRegistry::neu();
        let handle = ConnectionId::new();

        registry.registrieren(handle);
        assert_eq!(registry.rolle_von(&handle), Some(PeerRolle::Unzugeordnet));
        assert_eq!(registry.anzahl(), 1);
    }

    #[test]
    fn rolle_setzen_und_lesen() {
        let registry = ConnectionRegistry::neu();
        let handle = ConnectionId::new();

        registry.registrieren(handle);
        registry.rolle_setzen(&handle, PeerRolle::Anrufer);
        assert_eq!(registry.rolle_von(&handle), Some(PeerRolle::Anrufer));

        registry.rolle_setzen(&handle, PeerRolle::Operator);
        assert_eq!(registry.rolle_von(&handle), Some(PeerRolle::Operator));
    }

    #[test]
    fn rolle_setzen_fuer_unbekanntes_handle_ist_noop() {
        let registry = ConnectionRegistry::neu();
        let handle = ConnectionId::new();

        registry.rolle_setzen(&handle, PeerRolle::Operator);
        assert_eq!(registry.rolle_von(&handle), None);
        assert_eq!(registry.anzahl(), 0);
    }

    #[test]
    fn entfernen_gibt_rolle_zurueck() {
        let registry = ConnectionRegistry::neu();
        let handle = ConnectionId::new();

        registry.registrieren(handle);
        registry.rolle_setzen(&handle, PeerRolle::Anrufer);

        assert_eq!(registry.entfernen(&handle), Some(PeerRolle::Anrufer));
        assert!(!registry.ist_registriert(&handle));

        // Zweites Entfernen ist ein No-Op
        assert_eq!(registry.entfernen(&handle), None);
    }

    #[test]
    fn clone_teilt_inneren_state() {
        let r1 = ConnectionRegistry::neu();
        let r2 = r1.clone();
        let handle = ConnectionId::new();

        r1.registrieren(handle);
        assert!(r2.ist_registriert(&handle));
    }
}
