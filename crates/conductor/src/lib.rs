//! # Conductor
//!
//! Game-series coordinator for browser arcades.
//!
//! Players connect over WebSocket, gather in password-optional rooms, and
//! the room creator starts a series of short mini-games. The server picks
//! the game order, runs each game's deadline, merges the results browsers
//! report, ranks everyone at the end and hands rewards to a
//! [`RewardLedger`].
//!
//! All shared state lives in one [`Arcade`] owned by a single coordinator
//! task. Connection handlers only send it commands, so every rule is
//! applied one event at a time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use conductor::{ConductorServer, MemoryLedger};
//!
//! # async fn run() -> Result<(), conductor::ConductorError> {
//! conductor::init_tracing("conductor=info");
//! let server = ConductorServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(MemoryLedger::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod arcade;
mod config;
mod coordinator;
mod dedup;
mod error;
mod fanout;
mod handler;
mod ledger;
mod server;

pub use arcade::{Arcade, LedgerCall, Outbox, Timer};
pub use config::{ArcadeConfig, ChatConfig};
pub use coordinator::{CoordinatorHandle, now_ms, spawn_coordinator};
pub use dedup::{ChatKey, RecentSet};
pub use error::ConductorError;
pub use fanout::{Fanout, PlayerSender};
pub use ledger::{ClaimRequest, LedgerEntry, LedgerError, MemoryLedger, RewardLedger};
pub use server::{ConductorServer, ConductorServerBuilder};

pub use conductor_protocol as protocol;
pub use conductor_room::{LobbyConfig, RoomError};
pub use conductor_series::{SeriesConfig, SeriesError};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`. Does nothing if a subscriber is already set.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
