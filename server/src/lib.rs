//! hotline-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und stellt den oeffentlichen
//! Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use anyhow::{Context, Result};
use config::ServerConfig;
use hotline_signaling::{SignalingConfig, SignalingServer, SignalingState};
use std::sync::Arc;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Signaling-Service und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Konfiguration validieren
    /// 2. Gemeinsamen Zustand aufbauen (Registry, Pool, Sessions, Outbox)
    /// 3. TCP-Listener starten
    /// 4. Auf Ctrl-C warten und Shutdown signalisieren
    pub async fn starten(self) -> Result<()> {
        self.config.validieren()?;

        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %self.config.tcp_bind_adresse(),
            operatoren = self.config.operatoren.kennungen.len(),
            "Server startet"
        );

        let state = SignalingState::neu(SignalingConfig {
            operator_kennungen: self.config.operatoren.kennungen.clone(),
            max_clients: self.config.server.max_clients,
            keepalive_sek: self.config.server.keepalive_sek,
            verbindungs_timeout_sek: self.config.server.verbindungs_timeout_sek,
        });

        let bind_addr = self
            .config
            .tcp_bind_adresse()
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse: {}", self.config.tcp_bind_adresse()))?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let listener = SignalingServer::neu(Arc::clone(&state), bind_addr);
        let listener_task = tokio::spawn(listener.starten(shutdown_rx));

        // Auf Ctrl-C warten, dann Shutdown signalisieren
        tokio::signal::ctrl_c()
            .await
            .context("Ctrl-C-Handler fehlgeschlagen")?;
        tracing::info!("Shutdown-Signal empfangen");
        let _ = shutdown_tx.send(true);

        listener_task
            .await
            .context("Listener-Task abgebrochen")?
            .context("Listener-Fehler")?;

        tracing::info!(uptime_sek = state.uptime_sek(), "Server beendet");
        Ok(())
    }
}
