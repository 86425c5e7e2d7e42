//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist – ohne konfigurierte Operatoren werden dann allerdings
//! alle Offers mit `noOperatorAvailable` beantwortet.

use hotline_core::error::HotlineError;
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Operator-Einstellungen (Erlaubnisliste)
    pub operatoren: OperatorEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen
    pub max_clients: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Hotline Server".into(),
            max_clients: 256,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer die TCP-Verbindung
    pub bind_adresse: String,
    /// Port fuer die TCP-Verbindung
    pub tcp_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            tcp_port: 3000,
        }
    }
}

/// Operator-Einstellungen
///
/// Die Erlaubnisliste ist nach dem Start unveraenderlich; neue Kennungen
/// erfordern einen Neustart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorEinstellungen {
    /// Erlaubte Operator-Kennungen
    pub kennungen: Vec<String>,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft die Konfiguration auf Widersprueche
    ///
    /// Leere oder doppelte Operator-Kennungen sind Konfigurationsfehler.
    pub fn validieren(&self) -> Result<(), HotlineError> {
        let mut gesehen = std::collections::HashSet::new();
        for kennung in &self.operatoren.kennungen {
            if kennung.trim().is_empty() {
                return Err(HotlineError::konfiguration(
                    "Leere Operator-Kennung in der Erlaubnisliste",
                ));
            }
            if !gesehen.insert(kennung.as_str()) {
                return Err(HotlineError::konfiguration(format!(
                    "Doppelte Operator-Kennung in der Erlaubnisliste: {kennung}"
                )));
            }
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer TCP zurueck
    pub fn tcp_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.tcp_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server.max_clients, 256);
        assert_eq!(cfg.netzwerk.tcp_port, 3000);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.operatoren.kennungen.is_empty());
        cfg.validieren().unwrap();
    }

    #[test]
    fn bind_adresse() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.tcp_bind_adresse(), "0.0.0.0:3000");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            name = "Hotline Zentrale"
            max_clients = 100

            [netzwerk]
            tcp_port = 10000

            [operatoren]
            kennungen = ["op1", "op2"]
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server.name, "Hotline Zentrale");
        assert_eq!(cfg.server.max_clients, 100);
        assert_eq!(cfg.netzwerk.tcp_port, 10000);
        assert_eq!(cfg.operatoren.kennungen, vec!["op1", "op2"]);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.server.keepalive_sek, 30);
        cfg.validieren().unwrap();
    }

    #[test]
    fn doppelte_kennung_ist_konfigurationsfehler() {
        let cfg: ServerConfig = toml::from_str(
            r#"
            [operatoren]
            kennungen = ["op1", "op1"]
        "#,
        )
        .unwrap();
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn leere_kennung_ist_konfigurationsfehler() {
        let cfg: ServerConfig = toml::from_str(
            r#"
            [operatoren]
            kennungen = [""]
        "#,
        )
        .unwrap();
        assert!(cfg.validieren().is_err());
    }
}
