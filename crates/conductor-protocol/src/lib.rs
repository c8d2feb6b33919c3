//! Wire protocol for Conductor.
//!
//! This crate defines what browsers and the arcade server say to each
//! other:
//!
//! - **Identity** ([`PlayerId`], [`RoomId`], [`GameId`]) and delivery
//!   targets ([`Recipient`]).
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): closed tagged
//!   unions, one variant per operation.
//! - **Payloads** ([`RoomSnapshot`], [`GameStart`], [`GameResult`],
//!   [`FinalRanking`], ...): the read-only snapshots clients render.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, messages out.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Arcade (state machine)
//! ```
//!
//! Nothing here knows about rooms as live objects. The state machine in
//! the `conductor` crate owns those and only ever hands out snapshots.

mod codec;
mod error;
mod messages;
mod payload;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientMessage, LeaveReason, ServerMessage};
pub use payload::{
    FinalRanking, GameResult, GameStart, GameType, PlayerSnapshot,
    RoomSnapshot, RoomStatus, SeriesSummary,
};
pub use types::{GameId, PlayerId, Recipient, RoomId};

/// The protocol version clients must announce in [`ClientMessage::Hello`].
pub const PROTOCOL_VERSION: u32 = 1;
