//! Signal-Dispatcher – Routet eingehende Nachrichten an die Handler
//!
//! Der Dispatcher empfaengt jede eingehende Nachricht zusammen mit dem
//! Handle der Absender-Verbindung, schlaegt Rolle und Session-Zustand
//! nach und mutiert Pool/Registry/Session-Tabelle oder leitet die Payload
//! unveraendert an die Gegenstelle weiter.
//!
//! Der Dispatcher besitzt seinen Zustand selbst (kein globaler Zustand);
//! Tests erstellen eigene Instanzen und rufen `dispatch` direkt mit
//! synthetischen Handles auf.

use hotline_core::types::ConnectionId;
use hotline_protocol::signal::SignalMessage;
use std::sync::Arc;

use crate::handlers::{call_handler, login_handler};
use crate::server_state::SignalingState;

/// Zentraler Nachrichten-Dispatcher
///
/// Routet eingehende Nachrichten an die entsprechenden Handler und gibt
/// die direkte Antwort zurueck. Weiterleitungen an andere Verbindungen
/// laufen ueber die Outbox und blockieren nie auf Netzwerk-IO.
pub struct SignalDispatcher {
    state: Arc<SignalingState>,
}

impl SignalDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Gibt den gemeinsamen Zustand zurueck
    pub fn state(&self) -> &Arc<SignalingState> {
        &self.state
    }

    /// Verarbeitet eine eingehende Nachricht und gibt die Antwort zurueck
    ///
    /// Gibt `None` zurueck wenn keine direkte Antwort an den Absender
    /// geschickt werden soll (Weiterleitungen laufen ueber die Outbox).
    pub fn dispatch(
        &self,
        absender: ConnectionId,
        nachricht: SignalMessage,
    ) -> Option<SignalMessage> {
        match nachricht {
            // -------------------------------------------------------------------
            // Anmeldung
            // -------------------------------------------------------------------
            SignalMessage::OperatorLogin { identity } => Some(
                login_handler::handle_operator_login(absender, identity, &self.state),
            ),

            SignalMessage::CallerLogin => {
                Some(login_handler::handle_caller_login(absender, &self.state))
            }

            // -------------------------------------------------------------------
            // Vermittlung und Relay
            // -------------------------------------------------------------------
            SignalMessage::Offer { sdp } => call_handler::handle_offer(absender, sdp, &self.state),

            SignalMessage::Answer { sdp } => {
                call_handler::handle_answer(absender, sdp, &self.state)
            }

            SignalMessage::Candidate { ice } => {
                call_handler::handle_candidate(absender, ice, &self.state)
            }

            SignalMessage::EndCall => call_handler::handle_end_call(absender, &self.state),

            // -------------------------------------------------------------------
            // Keepalive
            // -------------------------------------------------------------------
            SignalMessage::Ping { timestamp_ms } => Some(SignalMessage::pong(timestamp_ms)),

            SignalMessage::Pong { .. } => {
                // Pong-Antworten vom Client werden nur geloggt (RTT-Messung)
                tracing::trace!(verbindung = %absender, "Pong empfangen");
                None
            }

            // -------------------------------------------------------------------
            // Server->Client Nachrichten vom Client: unerwartet, verwerfen
            // -------------------------------------------------------------------
            SignalMessage::OperatorLoginSuccess
            | SignalMessage::OperatorLoginFailure { .. }
            | SignalMessage::CallerLoginSuccess
            | SignalMessage::NoOperatorAvailable
            | SignalMessage::CallStarted => {
                tracing::warn!(
                    verbindung = %absender,
                    "Unerwartete Server->Client Nachricht vom Client verworfen"
                );
                None
            }
        }
    }

    /// Bereinigt alle Ressourcen einer Verbindung beim Trennen
    ///
    /// Trennen gilt als implizites endCall: eine laufende Session wird
    /// beendet, die Gegenstelle benachrichtigt und der Operator-Slot
    /// genau einmal freigegeben. Danach verschwindet die Verbindung aus
    /// Pool, Registry und Outbox.
    pub fn verbindung_getrennt(&self, handle: ConnectionId) {
        call_handler::handle_end_call(handle, &self.state);
        self.state.pool.nach_handle_entfernen(&handle);
        self.state.registry.entfernen(&handle);
        self.state.outbox.verbindung_entfernen(&handle);

        tracing::debug!(verbindung = %handle, "Verbindungs-Ressourcen bereinigt");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
