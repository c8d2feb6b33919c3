//! Final standings and reward amounts.

use conductor_protocol::{FinalRanking, GameResult, PlayerId};

/// Reward multiplier for a 1-based rank, in basis points of one
/// (500 = 5×). This is also the contract's multiplier format.
pub fn multiplier_bps(rank: usize) -> u32 {
    match rank {
        1 => 500,
        2 => 200,
        3 => 150,
        _ => 100,
    }
}

/// Reward for `score` at `rank`, rounded down.
pub fn claimable(score: u64, rank: usize) -> u64 {
    score.saturating_mul(u64::from(multiplier_bps(rank))) / 100
}

/// Computes the standings for a finished series.
///
/// Every current member starts at zero, in member order. Players who
/// appear in the history but have since left are appended in the order
/// they are first seen. Each game adds its reported scores and
/// `winner_bonus` for its winner. The sort is stable, so ties keep that
/// order.
///
/// `name_of` resolves display names; it is not consulted for ordering.
pub fn rank_players<F>(
    members: &[PlayerId],
    history: &[GameResult],
    winner_bonus: u64,
    name_of: F,
) -> Vec<FinalRanking>
where
    F: Fn(PlayerId) -> Option<String>,
{
    let mut totals: Vec<(PlayerId, u64, usize)> =
        members.iter().map(|&p| (p, 0, 0)).collect();

    fn entry(totals: &mut Vec<(PlayerId, u64, usize)>, player: PlayerId) -> usize {
        match totals.iter().position(|(p, _, _)| *p == player) {
            Some(i) => i,
            None => {
                totals.push((player, 0, 0));
                totals.len() - 1
            }
        }
    }

    for game in history {
        for (&player, &score) in &game.results {
            let i = entry(&mut totals, player);
            totals[i].1 = totals[i].1.saturating_add(score);
        }
        if let Some(winner) = game.winner {
            let i = entry(&mut totals, winner);
            totals[i].1 = totals[i].1.saturating_add(winner_bonus);
            totals[i].2 += 1;
        }
    }

    totals.sort_by(|a, b| b.1.cmp(&a.1));

    totals
        .into_iter()
        .enumerate()
        .map(|(i, (player_id, score, games_won))| {
            let rank = i + 1;
            FinalRanking {
                player_id,
                player_name: name_of(player_id).unwrap_or_else(|| "Unknown".to_string()),
                score,
                rank,
                multiplier: f64::from(multiplier_bps(rank)) / 100.0,
                games_won,
                claimable: claimable(score, rank),
            }
        })
        .collect()
}
