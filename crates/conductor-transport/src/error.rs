use std::io;
use std::net::SocketAddr;

use crate::ConnectionId;

/// Transport failures, tagged with the listener or connection they hit.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The TCP accept itself failed. The listener is usually still usable.
    #[error("tcp accept failed: {0}")]
    Accept(#[source] io::Error),

    /// A TCP peer connected but never completed the WebSocket upgrade.
    #[error("websocket upgrade from {peer} failed: {source}")]
    Upgrade {
        peer: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("{conn}: send failed: {source}")]
    Send {
        conn: ConnectionId,
        #[source]
        source: io::Error,
    },

    #[error("{conn}: receive failed: {source}")]
    Receive {
        conn: ConnectionId,
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    /// The connection this error belongs to, if it got that far.
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            Self::Send { conn, .. } | Self::Receive { conn, .. } => Some(*conn),
            Self::Bind { .. } | Self::Accept(_) | Self::Upgrade { .. } => None,
        }
    }

    /// True when only this accept failed and the listener can keep going.
    pub fn is_per_connection(&self) -> bool {
        !matches!(self, Self::Bind { .. })
    }
}
