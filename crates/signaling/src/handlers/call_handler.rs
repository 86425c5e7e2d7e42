//! Call-Handler – Vermittlung, Relay und Gespraechsende
//!
//! Offer, Answer und Candidate tragen opake WebRTC-Payloads die
//! unveraendert an die Gegenstelle weitergereicht werden. Nachrichten von
//! Verbindungen ohne Session sind kein Fehler: nach einem Gespraechsende
//! koennen Kandidaten oder ein zweites endCall noch unterwegs sein –
//! solche Nachzuegler werden kommentarlos verworfen.

use hotline_core::types::ConnectionId;
use hotline_protocol::signal::SignalMessage;
use std::sync::Arc;

use crate::registry::PeerRolle;
use crate::server_state::SignalingState;

/// Verarbeitet ein Offer eines Anrufers
///
/// Beansprucht atomar einen verfuegbaren Operator und erstellt die
/// Session im Zustand `Offeriert`; das Offer geht unveraendert an den
/// Operator. Ohne freien Operator bleibt der Anrufer ohne Session und
/// bekommt `NoOperatorAvailable` – das Offer wird verworfen, ein
/// spaeterer Versuch ist erlaubt.
pub fn handle_offer(
    absender: ConnectionId,
    sdp: serde_json::Value,
    state: &Arc<SignalingState>,
) -> Option<SignalMessage> {
    // Offers sind Anrufern vorbehalten; ein Operator darf keinen
    // Operator beanspruchen
    if state.registry.rolle_von(&absender) != Some(PeerRolle::Anrufer) {
        tracing::debug!(verbindung = %absender, "Offer von Nicht-Anrufer verworfen");
        return None;
    }

    // Doppeltes Offer waehrend einer laufenden Session: Nachzuegler
    if state.sessions.hat_session(&absender) {
        tracing::debug!(verbindung = %absender, "Offer waehrend laufender Session verworfen");
        return None;
    }

    let (kennung, operator_handle) = match state.pool.verfuegbaren_beanspruchen() {
        Some(treffer) => treffer,
        None => {
            tracing::info!(verbindung = %absender, "Kein Operator verfuegbar");
            return Some(SignalMessage::NoOperatorAvailable);
        }
    };

    let session = match state.sessions.erstellen(absender, kennung.clone(), operator_handle) {
        Some(session) => session,
        None => {
            // Operator-Handle steckt noch in einer alten Session:
            // Slot zurueckgeben statt doppelt zu vergeben
            state.pool.frei_geben(&kennung);
            tracing::warn!(operator = %kennung, "Operator noch in Session – Offer abgewiesen");
            return Some(SignalMessage::NoOperatorAvailable);
        }
    };

    state
        .outbox
        .an_verbindung_senden(&operator_handle, SignalMessage::offer(sdp));
    tracing::info!(
        call = %session.call_id,
        operator = %kennung,
        "Offer an Operator weitergeleitet"
    );
    None
}

/// Verarbeitet eine Answer eines Operators
///
/// Schaltet die Session auf `Aktiv`, leitet die Answer an den Anrufer
/// weiter und meldet beiden Parteien den Gespraechsbeginn.
pub fn handle_answer(
    absender: ConnectionId,
    sdp: serde_json::Value,
    state: &Arc<SignalingState>,
) -> Option<SignalMessage> {
    let session = match state.sessions.aktivieren(&absender) {
        Some(session) => session,
        None => {
            tracing::debug!(verbindung = %absender, "Answer ohne offerierte Session verworfen");
            return None;
        }
    };

    state
        .outbox
        .an_verbindung_senden(&session.anrufer, SignalMessage::answer(sdp));
    state.outbox.an_beide_senden(
        &session.anrufer,
        &session.operator_handle,
        SignalMessage::CallStarted,
    );
    tracing::info!(call = %session.call_id, "Gespraech gestartet");
    None
}

/// Verarbeitet einen Verbindungs-Kandidaten (beide Richtungen)
///
/// Kandidaten fliessen in `Offeriert` und `Aktiv` beliebig oft in
/// Empfangsreihenfolge und aendern den Session-Zustand nicht.
pub fn handle_candidate(
    absender: ConnectionId,
    ice: serde_json::Value,
    state: &Arc<SignalingState>,
) -> Option<SignalMessage> {
    match state.sessions.gegenstelle(&absender) {
        Some((gegenstelle, _seite)) => {
            state
                .outbox
                .an_verbindung_senden(&gegenstelle, SignalMessage::candidate(ice));
        }
        None => {
            tracing::trace!(verbindung = %absender, "Candidate ohne Session verworfen");
        }
    }
    None
}

/// Verarbeitet ein Gespraechsende (beide Seiten)
///
/// Entfernt die Session, gibt den Operator-Slot genau einmal frei und
/// meldet der Gegenstelle das Ende.
pub fn handle_end_call(
    absender: ConnectionId,
    state: &Arc<SignalingState>,
) -> Option<SignalMessage> {
    let session = match state.sessions.beenden(&absender) {
        Some(session) => session,
        None => {
            tracing::trace!(verbindung = %absender, "EndCall ohne Session verworfen");
            return None;
        }
    };

    let gegenstelle = if session.anrufer == absender {
        session.operator_handle
    } else {
        session.anrufer
    };

    state.pool.frei_geben(&session.operator_kennung);
    state
        .outbox
        .an_verbindung_senden(&gegenstelle, SignalMessage::EndCall);
    tracing::info!(call = %session.call_id, "Gespraech beendet");
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::login_handler;
    use crate::server_state::SignalingConfig;
    use crate::session::SessionZustand;
    use tokio::sync::mpsc;

    fn test_state(kennungen: &[&str]) -> Arc<SignalingState> {
        SignalingState::neu(SignalingConfig {
            operator_kennungen: kennungen.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        })
    }

    /// Registriert eine Verbindung in Registry und Outbox
    fn verbinden(state: &Arc<SignalingState>) -> (ConnectionId, mpsc::Receiver<SignalMessage>) {
        let handle = ConnectionId::new();
        state.registry.registrieren(handle);
        let rx = state.outbox.verbindung_registrieren(handle);
        (handle, rx)
    }

    fn sdp(inhalt: &str) -> serde_json::Value {
        serde_json::json!({ "type": "offer", "sdp": inhalt })
    }

    #[test]
    fn offer_ohne_operator_wird_abgewiesen() {
        let state = test_state(&["op1"]);
        let (anrufer, _rx) = verbinden(&state);
        login_handler::handle_caller_login(anrufer, &state);

        let antwort = handle_offer(anrufer, sdp("X"), &state);
        assert!(matches!(antwort, Some(SignalMessage::NoOperatorAvailable)));
        assert_eq!(state.sessions.anzahl(), 0);
    }

    #[test]
    fn offer_wird_an_operator_weitergeleitet() {
        let state = test_state(&["op1"]);
        let (operator, mut op_rx) = verbinden(&state);
        login_handler::handle_operator_login(operator, "op1".into(), &state);
        let (anrufer, _rx) = verbinden(&state);
        login_handler::handle_caller_login(anrufer, &state);

        let antwort = handle_offer(anrufer, sdp("X"), &state);
        assert!(antwort.is_none());

        // Operator bekommt das Offer unveraendert
        let empfangen = op_rx.try_recv().expect("Offer muss ankommen");
        match empfangen {
            SignalMessage::Offer { sdp: payload } => assert_eq!(payload, sdp("X")),
            _ => panic!("Erwartet Offer"),
        }

        // Session offeriert, Operator besetzt
        let session = state.sessions.session_von(&anrufer).unwrap();
        assert_eq!(session.zustand, SessionZustand::Offeriert);
        assert_eq!(state.pool.verfuegbare_anzahl(), 0);
    }

    #[test]
    fn offer_von_operator_wird_verworfen() {
        let state = test_state(&["op1", "op2"]);
        let (operator, _rx) = verbinden(&state);
        login_handler::handle_operator_login(operator, "op1".into(), &state);

        let antwort = handle_offer(operator, sdp("X"), &state);
        assert!(antwort.is_none());
        assert_eq!(state.sessions.anzahl(), 0);
        assert_eq!(state.pool.verfuegbare_anzahl(), 1);
    }

    #[test]
    fn answer_aktiviert_und_meldet_gespraechsbeginn() {
        let state = test_state(&["op1"]);
        let (operator, mut op_rx) = verbinden(&state);
        login_handler::handle_operator_login(operator, "op1".into(), &state);
        let (anrufer, mut anrufer_rx) = verbinden(&state);
        login_handler::handle_caller_login(anrufer, &state);

        handle_offer(anrufer, sdp("X"), &state);
        op_rx.try_recv().expect("Offer");

        let antwort = handle_answer(operator, sdp("Y"), &state);
        assert!(antwort.is_none());

        // Anrufer bekommt Answer, danach beide CallStarted
        match anrufer_rx.try_recv().expect("Answer muss ankommen") {
            SignalMessage::Answer { sdp: payload } => assert_eq!(payload, sdp("Y")),
            andere => panic!("Erwartet Answer, bekam {:?}", andere),
        }
        assert!(matches!(
            anrufer_rx.try_recv().expect("CallStarted beim Anrufer"),
            SignalMessage::CallStarted
        ));
        assert!(matches!(
            op_rx.try_recv().expect("CallStarted beim Operator"),
            SignalMessage::CallStarted
        ));

        let session = state.sessions.session_von(&anrufer).unwrap();
        assert_eq!(session.zustand, SessionZustand::Aktiv);
    }

    #[test]
    fn answer_ohne_session_wird_verworfen() {
        let state = test_state(&["op1"]);
        let (operator, _rx) = verbinden(&state);
        login_handler::handle_operator_login(operator, "op1".into(), &state);

        let antwort = handle_answer(operator, sdp("Y"), &state);
        assert!(antwort.is_none());
    }

    #[test]
    fn candidate_fliesst_in_beide_richtungen() {
        let state = test_state(&["op1"]);
        let (operator, mut op_rx) = verbinden(&state);
        login_handler::handle_operator_login(operator, "op1".into(), &state);
        let (anrufer, mut anrufer_rx) = verbinden(&state);
        login_handler::handle_caller_login(anrufer, &state);
        handle_offer(anrufer, sdp("X"), &state);
        op_rx.try_recv().expect("Offer");

        let ice = serde_json::json!({ "candidate": "C1" });

        // Anrufer -> Operator (schon im Zustand Offeriert erlaubt)
        handle_candidate(anrufer, ice.clone(), &state);
        match op_rx.try_recv().expect("Candidate beim Operator") {
            SignalMessage::Candidate { ice: payload } => assert_eq!(payload, ice),
            andere => panic!("Erwartet Candidate, bekam {:?}", andere),
        }

        // Operator -> Anrufer
        handle_candidate(operator, ice.clone(), &state);
        assert!(matches!(
            anrufer_rx.try_recv().expect("Candidate beim Anrufer"),
            SignalMessage::Candidate { .. }
        ));
    }

    #[test]
    fn candidate_ohne_session_ohne_nebenwirkung() {
        let state = test_state(&["op1"]);
        let (anrufer, mut rx) = verbinden(&state);
        login_handler::handle_caller_login(anrufer, &state);

        let antwort = handle_candidate(anrufer, serde_json::json!("C1"), &state);
        assert!(antwort.is_none());
        assert!(rx.try_recv().is_err(), "Keine Nachricht darf entstehen");
        assert_eq!(state.sessions.anzahl(), 0);
    }

    #[test]
    fn end_call_gibt_operator_genau_einmal_frei() {
        let state = test_state(&["op1"]);
        let (operator, mut op_rx) = verbinden(&state);
        login_handler::handle_operator_login(operator, "op1".into(), &state);
        let (anrufer, _rx) = verbinden(&state);
        login_handler::handle_caller_login(anrufer, &state);
        handle_offer(anrufer, sdp("X"), &state);
        op_rx.try_recv().expect("Offer");

        handle_end_call(anrufer, &state);

        // Gegenstelle benachrichtigt, Operator wieder frei
        assert!(matches!(
            op_rx.try_recv().expect("EndCall beim Operator"),
            SignalMessage::EndCall
        ));
        assert_eq!(state.pool.verfuegbare_anzahl(), 1);
        assert_eq!(state.sessions.anzahl(), 0);

        // Nachzuegler von beiden Seiten: No-Op
        handle_end_call(anrufer, &state);
        handle_end_call(operator, &state);
        assert_eq!(state.pool.verfuegbare_anzahl(), 1);
    }

    #[test]
    fn zweiter_anrufer_bei_besetztem_operator() {
        let state = test_state(&["op1"]);
        let (operator, mut op_rx) = verbinden(&state);
        login_handler::handle_operator_login(operator, "op1".into(), &state);
        let (erster, _rx1) = verbinden(&state);
        login_handler::handle_caller_login(erster, &state);
        handle_offer(erster, sdp("X"), &state);
        op_rx.try_recv().expect("Offer");

        let (zweiter, _rx2) = verbinden(&state);
        login_handler::handle_caller_login(zweiter, &state);
        let antwort = handle_offer(zweiter, sdp("Z"), &state);

        // Zweiter Anrufer abgewiesen, erste Session unberuehrt
        assert!(matches!(antwort, Some(SignalMessage::NoOperatorAvailable)));
        assert!(state.sessions.hat_session(&erster));
        assert_eq!(state.sessions.anzahl(), 1);
    }
}
