//! Game series for Conductor.
//!
//! A series is a fixed number of mini-games played back to back inside one
//! room. This crate holds the pure parts:
//!
//! - [`shuffled_sequence`] picks the games.
//! - [`SeriesState`] tracks the game in flight and the results so far.
//! - [`rank_players`] turns the results into final standings and reward
//!   amounts.
//!
//! Nothing here touches a clock or a socket. Callers pass `now` in and
//! schedule the deadline themselves.

mod catalog;
mod config;
mod error;
mod ranking;
mod series;

pub use catalog::shuffled_sequence;
pub use config::SeriesConfig;
pub use error::SeriesError;
pub use ranking::{claimable, multiplier_bps, rank_players};
pub use series::{GameDescriptor, Report, SeriesState};
