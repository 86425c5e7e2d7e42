//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Der Kern schliesst die Verbindung nie selbst, er reagiert
//! nur auf ihr Ende; beim Trennen laeuft die Bereinigung ueber den
//! Dispatcher (implizites endCall).
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen Ping
//! - Client muss innerhalb von `verbindungs_timeout_sek` irgendetwas senden
//! - Bei Timeout wird die Verbindung getrennt

use futures_util::{SinkExt, StreamExt};
use hotline_core::types::ConnectionId;
use hotline_protocol::signal::SignalMessage;
use hotline_protocol::wire::FrameCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::dispatcher::SignalDispatcher;
use crate::server_state::SignalingState;

/// Verarbeitet eine einzelne TCP-Verbindung
///
/// Liest Frames via `FrameCodec`, dispatcht an `SignalDispatcher` und
/// sendet Antworten sowie Outbox-Nachrichten zurueck. Laeuft in einem
/// eigenen tokio-Task.
pub struct ClientConnection {
    state: Arc<SignalingState>,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(state: Arc<SignalingState>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Diese Methode laeuft bis die Verbindung getrennt wird oder ein
    /// Shutdown-Signal eingeht.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let peer_addr = self.peer_addr;
        let keepalive_intervall = Duration::from_secs(self.state.config.keepalive_sek);
        let timeout_dauer = Duration::from_secs(self.state.config.verbindungs_timeout_sek);

        // Handle vergeben, in Registry und Outbox registrieren
        let handle = ConnectionId::new();
        self.state.registry.registrieren(handle);
        let mut sende_rx = self.state.outbox.verbindung_registrieren(handle);

        tracing::info!(peer = %peer_addr, verbindung = %handle, "Neue Verbindung");

        // Framed-Stream mit FrameCodec einrichten
        let mut framed = Framed::new(stream, FrameCodec::new());

        let dispatcher = SignalDispatcher::neu(Arc::clone(&self.state));

        // Zeitpunkt des letzten empfangenen Frames
        let mut letzter_empfang = Instant::now();
        // Zeitpunkt des naechsten Ping
        let mut naechster_ping = Instant::now() + keepalive_intervall;

        loop {
            let jetzt = Instant::now();

            // Timeout-Pruefung
            if jetzt.duration_since(letzter_empfang) > timeout_dauer {
                tracing::warn!(peer = %peer_addr, "Verbindungs-Timeout");
                break;
            }

            // Naechsten Ping-Zeitpunkt berechnen
            let ping_verzoegerung = if jetzt < naechster_ping {
                naechster_ping.duration_since(jetzt)
            } else {
                Duration::from_millis(1)
            };

            tokio::select! {
                // Eingehende Nachricht vom Peer
                frame = framed.next() => {
                    match frame {
                        Some(Ok(nachricht)) => {
                            letzter_empfang = Instant::now();

                            if let Some(antwort) = dispatcher.dispatch(handle, nachricht) {
                                if let Err(e) = framed.send(antwort).await {
                                    tracing::warn!(
                                        peer = %peer_addr,
                                        fehler = %e,
                                        "Senden fehlgeschlagen"
                                    );
                                    break;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(
                                peer = %peer_addr,
                                fehler = %e,
                                "Frame-Lesefehler"
                            );
                            break;
                        }
                        None => {
                            // Verbindung geschlossen
                            tracing::info!(peer = %peer_addr, "Verbindung vom Peer getrennt");
                            break;
                        }
                    }
                }

                // Ausgehende Nachricht aus der Outbox (Weiterleitungen)
                Some(ausgehend) = sende_rx.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(
                            peer = %peer_addr,
                            fehler = %e,
                            "Outbox-Senden fehlgeschlagen"
                        );
                        break;
                    }
                }

                // Keepalive-Ping
                _ = tokio::time::sleep(ping_verzoegerung) => {
                    if jetzt >= naechster_ping {
                        let ts = std::time::SystemTime::now()
                            .duration_since(std::time::UNIX_EPOCH)
                            .unwrap_or_default()
                            .as_millis() as u64;

                        if let Err(e) = framed.send(SignalMessage::ping(ts)).await {
                            tracing::warn!(
                                peer = %peer_addr,
                                fehler = %e,
                                "Ping-Senden fehlgeschlagen"
                            );
                            break;
                        }
                        naechster_ping = Instant::now() + keepalive_intervall;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        // Cleanup beim Verbindungsende: implizites endCall + Austragen
        dispatcher.verbindung_getrennt(handle);

        tracing::info!(peer = %peer_addr, verbindung = %handle, "Verbindungs-Task beendet");
    }
}
