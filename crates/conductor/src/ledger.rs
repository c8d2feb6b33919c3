//! The reward ledger boundary.
//!
//! The arcade computes every reward amount itself. A [`RewardLedger`] is
//! only told what to record and what to pay out; the coordinator calls it
//! from detached tasks, so a slow or failing ledger never holds up a
//! series.

use std::future::Future;
use std::sync::Mutex;

use conductor_protocol::{PlayerId, RoomId};

/// Why a ledger call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The player has no wallet on file.
    #[error("player {0} has no wallet")]
    NoWallet(PlayerId),

    /// The backing store refused the call.
    #[error("ledger rejected the request: {0}")]
    Rejected(String),
}

/// One player's result in one finished series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub player_id: PlayerId,
    pub wallet: Option<String>,
    pub room_id: RoomId,
    pub score: u64,
    /// Contract format: 150 = 1.5×.
    pub multiplier_bps: u32,
    pub won: bool,
    pub rank: usize,
}

/// A request to pay `amount` to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub player_id: PlayerId,
    pub wallet: Option<String>,
    pub room_id: RoomId,
    pub amount: u64,
}

/// Where series results and reward claims end up.
pub trait RewardLedger: Send + Sync + 'static {
    /// Records a result. Best effort; failures are only logged.
    fn record_result(
        &self,
        entry: LedgerEntry,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Pays out a claim. Returns the amount actually paid.
    fn claim_reward(
        &self,
        claim: ClaimRequest,
    ) -> impl Future<Output = Result<u64, LedgerError>> + Send;
}

/// A ledger that keeps everything in memory and logs it.
///
/// Good enough for a single-process arcade and for tests. Claims require
/// a wallet.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    results: Mutex<Vec<LedgerEntry>>,
    claims: Mutex<Vec<ClaimRequest>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded result, in arrival order.
    pub fn results(&self) -> Vec<LedgerEntry> {
        self.results.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Every paid claim, in arrival order.
    pub fn claims(&self) -> Vec<ClaimRequest> {
        self.claims.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl RewardLedger for MemoryLedger {
    async fn record_result(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        tracing::info!(
            player_id = %entry.player_id,
            room_id = %entry.room_id,
            score = entry.score,
            rank = entry.rank,
            multiplier_bps = entry.multiplier_bps,
            "result recorded"
        );
        self.results
            .lock()
            .map_err(|_| LedgerError::Rejected("ledger poisoned".into()))?
            .push(entry);
        Ok(())
    }

    async fn claim_reward(&self, claim: ClaimRequest) -> Result<u64, LedgerError> {
        if claim.wallet.is_none() {
            return Err(LedgerError::NoWallet(claim.player_id));
        }
        tracing::info!(
            player_id = %claim.player_id,
            room_id = %claim.room_id,
            amount = claim.amount,
            "reward claimed"
        );
        let amount = claim.amount;
        self.claims
            .lock()
            .map_err(|_| LedgerError::Rejected("ledger poisoned".into()))?
            .push(claim);
        Ok(amount)
    }
}
