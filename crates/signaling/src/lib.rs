//! hotline-signaling – Vermittlungs- und Relay-Service
//!
//! Dieser Crate implementiert den Signalisierungs-Kern von Hotline.
//! Anrufer werden an verfuegbare Operatoren vermittelt; danach leitet das
//! Relay Session-Beschreibungen und Verbindungs-Kandidaten blind zwischen
//! den beiden Parteien weiter, bis eine Seite auflegt oder die Verbindung
//! trennt.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |
//!     v
//! SignalDispatcher
//!     |
//!     +-- LoginHandler  (OperatorLogin, CallerLogin)
//!     +-- CallHandler   (Offer, Answer, Candidate, EndCall)
//!
//! ConnectionRegistry – Welche Verbindung hat welche Rolle
//! OperatorPool       – Angemeldete Operatoren + Verfuegbarkeit
//! CallSessionTable   – Aktive Anrufer/Operator-Paarungen
//! SignalOutbox       – Nachrichten gezielt an Verbindungen senden
//! ```

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod outbox;
pub mod pool;
pub mod registry;
pub mod server_state;
pub mod session;
pub mod tcp;

// Bequeme Re-Exporte
pub use connection::ClientConnection;
pub use dispatcher::SignalDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use outbox::SignalOutbox;
pub use pool::OperatorPool;
pub use registry::ConnectionRegistry;
pub use server_state::{SignalingConfig, SignalingState};
pub use session::CallSessionTable;
pub use tcp::SignalingServer;
