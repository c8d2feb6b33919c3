//! Picking which mini-games a series plays.

use conductor_protocol::GameType;
use rand::Rng;
use rand::seq::SliceRandom;

/// Draws `count` distinct games from the catalog in random order.
///
/// Pick-without-replacement: the catalog is shuffled and truncated, so
/// no game appears twice in one series. `count` larger than the catalog
/// is capped at the catalog size.
pub fn shuffled_sequence<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<GameType> {
    let mut games = GameType::CATALOG.to_vec();
    games.shuffle(rng);
    games.truncate(count);
    games
}
