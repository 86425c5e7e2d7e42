//! Login-Handler – Anmeldung von Operatoren und Anrufern

use hotline_core::error::HotlineError;
use hotline_core::types::{ConnectionId, OperatorId};
use hotline_protocol::signal::{
    SignalMessage, GRUND_BEREITS_ANGEMELDET, GRUND_UNGUELTIGE_KENNUNG,
};
use std::sync::Arc;

use crate::registry::PeerRolle;
use crate::server_state::SignalingState;

/// Verarbeitet eine Operator-Anmeldung
///
/// Prueft die Kennung gegen die Erlaubnisliste und lehnt Doppel-Anmeldungen
/// ab solange die erste Verbindung lebt. Bei Erfolg bekommt die Verbindung
/// die Operator-Rolle und einen Pool-Eintrag mit Verfuegbarkeit `true`.
pub fn handle_operator_login(
    absender: ConnectionId,
    identity: String,
    state: &Arc<SignalingState>,
) -> SignalMessage {
    let kennung = OperatorId::neu(identity);

    match state.pool.anmelden(&kennung, absender) {
        Ok(()) => {
            state.registry.rolle_setzen(&absender, PeerRolle::Operator);
            SignalMessage::OperatorLoginSuccess
        }
        Err(fehler) => {
            let grund = match fehler {
                HotlineError::KennungBereitsAktiv(_) => GRUND_BEREITS_ANGEMELDET,
                _ => GRUND_UNGUELTIGE_KENNUNG,
            };
            SignalMessage::login_abgelehnt(grund)
        }
    }
}

/// Verarbeitet eine Anrufer-Anmeldung
///
/// Anrufer sind unprivilegiert, die Anmeldung gelingt immer.
pub fn handle_caller_login(absender: ConnectionId, state: &Arc<SignalingState>) -> SignalMessage {
    state.registry.rolle_setzen(&absender, PeerRolle::Anrufer);
    tracing::info!(verbindung = %absender, "Anrufer angemeldet");
    SignalMessage::CallerLoginSuccess
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
