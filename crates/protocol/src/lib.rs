//! hotline-protocol – Nachrichten- und Wire-Format
//!
//! Definiert das Ereignisvokabular zwischen Peers und Relay sowie das
//! frame-basierte Wire-Format fuer TCP-Verbindungen.

pub mod signal;
pub mod wire;

// Re-Exporte fuer bequemen Zugriff
pub use signal::SignalMessage;
pub use wire::FrameCodec;
