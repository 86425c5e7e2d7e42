//! Gemeinsamer Zustand fuer den Signaling-Service
//!
//! Haelt Registry, Pool, Session-Tabelle und Outbox als geteilte
//! Zustands-Manager. Kein globaler Zustand: mehrere unabhaengige
//! Instanzen koennen nebeneinander existieren (z.B. in Tests).

use hotline_core::types::OperatorId;
use std::sync::Arc;
use std::time::Instant;

use crate::outbox::SignalOutbox;
use crate::pool::OperatorPool;
use crate::registry::ConnectionRegistry;
use crate::session::CallSessionTable;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Erlaubnisliste der Operator-Kennungen (fixiert beim Start)
    pub operator_kennungen: Vec<String>,
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            operator_kennungen: Vec::new(),
            max_clients: 256,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
        }
    }
}

/// Gemeinsamer Zustand des Signaling-Service (thread-safe, Arc-geteilt)
pub struct SignalingState {
    /// Service-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Registry aller live Verbindungen
    pub registry: ConnectionRegistry,
    /// Pool der angemeldeten Operatoren
    pub pool: OperatorPool,
    /// Tabelle der aktiven Call-Sessions
    pub sessions: CallSessionTable,
    /// Outbox fuer gezielte Nachrichten-Zustellung
    pub outbox: SignalOutbox,
    /// Startzeitpunkt des Servers (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState
    pub fn neu(config: SignalingConfig) -> Arc<Self> {
        let erlaubte = config
            .operator_kennungen
            .iter()
            .map(|k| OperatorId::neu(k.clone()))
            .collect();

        Arc::new(Self {
            config: Arc::new(config),
            registry: ConnectionRegistry::neu(),
            pool: OperatorPool::neu(erlaubte),
            sessions: CallSessionTable::neu(),
            outbox: SignalOutbox::neu(),
            start_time: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_uebernimmt_erlaubnisliste() {
        let state = SignalingState::neu(SignalingConfig {
            operator_kennungen: vec!["op1".into(), "op2".into()],
            ..Default::default()
        });

        assert!(state
            .pool
            .anmelden(&"op1".into(), hotline_core::ConnectionId::new())
            .is_ok());
        assert!(state
            .pool
            .anmelden(&"fremd".into(), hotline_core::ConnectionId::new())
            .is_err());
    }
}
