//! Lobby state for Conductor: who is connected and which rooms exist.
//!
//! # Key types
//!
//! - [`PlayerDirectory`]: connected players, display names, current room
//! - [`RoomRegistry`]: every room, keyed by id; the only place rooms live
//! - [`Room`]: one room's members, settings and [`SeriesState`]
//! - [`LobbyConfig`]: connection cap and name/room limits
//!
//! Both containers are plain owned structs. They are only ever touched
//! from the arcade's single coordinator task, so nothing here locks.
//!
//! [`SeriesState`]: conductor_series::SeriesState

mod config;
mod directory;
mod error;
mod registry;
mod room;

pub use config::LobbyConfig;
pub use directory::{Player, PlayerDirectory, validate_name};
pub use error::RoomError;
pub use registry::{Departure, JoinOutcome, RoomRegistry};
pub use room::Room;
