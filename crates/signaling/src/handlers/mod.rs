//! Handler fuer eingehende Signalisierungs-Ereignisse
//!
//! Jeder Handler ist eine freie Funktion die den gemeinsamen Zustand
//! mutiert und die Antwort (falls vorhanden) als Nachricht zurueckgibt.
//! Weiterleitungen an andere Verbindungen laufen ueber die Outbox.

pub mod call_handler;
pub mod login_handler;
