//! Unified error type for Conductor.

use conductor_protocol::ProtocolError;
use conductor_room::RoomError;
use conductor_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` conversions let `?` lift sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum ConductorError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lobby rule refused the request.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The socket closed or went quiet before a usable `Hello`.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The coordinator task has stopped.
    #[error("coordinator unavailable")]
    CoordinatorUnavailable,
}

impl ConductorError {
    /// Stable code for the wire.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport_error",
            Self::Protocol(e) => e.reason(),
            Self::Room(e) => e.reason(),
            Self::Handshake(_) => "handshake_failed",
            Self::CoordinatorUnavailable => "unavailable",
        }
    }
}
