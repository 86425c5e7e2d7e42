//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `SignalingServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer
//! `ClientConnection`.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::connection::ClientConnection;
use crate::error::SignalingResult;
use crate::server_state::SignalingState;

/// TCP-Signaling-Server
///
/// Bindet einen TCP-Socket und akzeptiert Verbindungen in einer Loop.
pub struct SignalingServer {
    state: Arc<SignalingState>,
    bind_addr: SocketAddr,
}

impl SignalingServer {
    /// Erstellt einen neuen SignalingServer
    pub fn neu(state: Arc<SignalingState>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Startet den TCP-Listener und akzeptiert Verbindungen
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt.
    pub async fn starten(
        self,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> SignalingResult<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        let lokale_addr = listener.local_addr()?;

        tracing::info!(
            adresse = %lokale_addr,
            operatoren = self.state.config.operator_kennungen.len(),
            "TCP Signaling-Server gestartet"
        );

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            // Client-Limit pruefen
                            let online = self.state.registry.anzahl() as u32;
                            if online >= self.state.config.max_clients {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max = self.state.config.max_clients,
                                    "Server voll – Verbindung abgelehnt"
                                );
                                drop(stream);
                                continue;
                            }

                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");

                            let verbindung = ClientConnection::neu(
                                Arc::clone(&self.state),
                                peer_addr,
                            );
                            let shutdown_rx_clone = shutdown_rx.clone();

                            tokio::spawn(async move {
                                verbindung.verarbeiten(stream, shutdown_rx_clone).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Signaling-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("TCP Signaling-Server gestoppt");
        Ok(())
    }

    /// Gibt die Bind-Adresse zurueck
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
