/// A frame that could not be turned into a message, or a message sent at
/// the wrong point of the connection's life.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Malformed JSON, a missing field, or an unknown `type` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    #[error("first message must be Hello")]
    HandshakeRequired,

    #[error("version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("Hello is only valid as the first message")]
    AlreadyConnected,
}

impl ProtocolError {
    /// Code sent in `Rejected.reason`.
    pub fn reason(&self) -> &'static str {
        match self {
            #[cfg(feature = "json")]
            Self::Encode(_) | Self::Decode(_) => "invalid_message",
            Self::HandshakeRequired => "handshake_required",
            Self::VersionMismatch { .. } => "version_mismatch",
            Self::AlreadyConnected => "already_connected",
        }
    }
}
