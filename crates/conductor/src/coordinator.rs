//! Coordinator actor: the one task that owns the [`Arcade`].
//!
//! Connection handlers never touch arcade state. They send a [`Command`]
//! through a [`CoordinatorHandle`], and the actor applies commands and
//! fired timers strictly one at a time, then carries out the resulting
//! [`Outbox`]: messages go to each player's outbound queue, timers go on
//! the [`TimerQueue`], and ledger calls run as detached tasks.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use conductor_protocol::{ClientMessage, PlayerId, RoomId, RoomSnapshot};
use conductor_room::RoomError;
use conductor_timer::TimerQueue;
use tokio::sync::{mpsc, oneshot};

use crate::arcade::{Arcade, LedgerCall, Outbox, Timer};
use crate::fanout::{Fanout, PlayerSender};
use crate::ledger::{LedgerError, RewardLedger};
use crate::ConductorError;

/// Commands buffered before senders start waiting.
const MAILBOX_CAPACITY: usize = 1024;

/// Milliseconds since the UNIX epoch: the arcade's clock.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Commands sent to the coordinator through its mailbox.
enum Command {
    /// Register a new connection and its outbound queue.
    Connect {
        player_id: PlayerId,
        wallet: Option<String>,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A message from a connected player.
    Client { player_id: PlayerId, msg: ClientMessage },

    /// The player's connection is gone.
    Disconnect { player_id: PlayerId },

    /// The ledger answered a reward claim.
    ClaimSettled {
        player_id: PlayerId,
        room_id: RoomId,
        outcome: Result<u64, LedgerError>,
    },

    /// Snapshot the room list.
    Rooms { reply: oneshot::Sender<Vec<RoomSnapshot>> },

    /// How many players are connected.
    PlayerCount { reply: oneshot::Sender<usize> },

    Shutdown,
}

/// Handle to the running coordinator. Cheap to clone.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    /// Registers a connection. Messages for the player start flowing to
    /// `sender` immediately, beginning with `Welcome`.
    ///
    /// # Errors
    /// [`RoomError::ServerFull`] (wrapped) at the connection cap, or
    /// [`ConductorError::CoordinatorUnavailable`].
    pub async fn connect(
        &self,
        player_id: PlayerId,
        wallet: Option<String>,
        sender: PlayerSender,
    ) -> Result<(), ConductorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Command::Connect {
            player_id,
            wallet,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| ConductorError::CoordinatorUnavailable)?
            .map_err(ConductorError::from)
    }

    /// Forwards a client message (fire-and-forget).
    pub async fn send(&self, player_id: PlayerId, msg: ClientMessage) -> Result<(), ConductorError> {
        self.submit(Command::Client { player_id, msg }).await
    }

    /// Reports that a player's connection has closed.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), ConductorError> {
        self.submit(Command::Disconnect { player_id }).await
    }

    /// Current room snapshots.
    pub async fn rooms(&self) -> Result<Vec<RoomSnapshot>, ConductorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Command::Rooms { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| ConductorError::CoordinatorUnavailable)
    }

    /// Number of connected players.
    pub async fn player_count(&self) -> Result<usize, ConductorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Command::PlayerCount { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| ConductorError::CoordinatorUnavailable)
    }

    /// Stops the coordinator. Pending timers are dropped.
    pub async fn shutdown(&self) -> Result<(), ConductorError> {
        self.submit(Command::Shutdown).await
    }

    async fn submit(&self, cmd: Command) -> Result<(), ConductorError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| ConductorError::CoordinatorUnavailable)
    }
}

/// Spawns the coordinator on the current runtime.
///
/// The task runs until [`CoordinatorHandle::shutdown`] is called or every
/// handle is dropped.
pub fn spawn_coordinator<L: RewardLedger>(arcade: Arcade, ledger: Arc<L>) -> CoordinatorHandle {
    let (sender, receiver) = mpsc::channel(MAILBOX_CAPACITY);
    let actor = Coordinator {
        arcade,
        fanout: Fanout::new(),
        timers: TimerQueue::new(),
        ledger,
        mailbox: sender.downgrade(),
        receiver,
    };
    tokio::spawn(actor.run());
    CoordinatorHandle { sender }
}

struct Coordinator<L: RewardLedger> {
    arcade: Arcade,
    fanout: Fanout,
    timers: TimerQueue<Timer>,
    ledger: Arc<L>,
    /// Lets ledger tasks post results back without keeping the mailbox
    /// open.
    mailbox: mpsc::WeakSender<Command>,
    receiver: mpsc::Receiver<Command>,
}

impl<L: RewardLedger> Coordinator<L> {
    async fn run(mut self) {
        tracing::info!("coordinator started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                timer = self.timers.next_due() => self.fire(timer),
            }
        }

        tracing::info!(
            players = self.arcade.players().len(),
            rooms = self.arcade.rooms().len(),
            pending_timers = self.timers.len(),
            "coordinator stopped"
        );
    }

    /// Handles `first` and every other timer already due, before the
    /// mailbox gets another turn.
    fn fire(&mut self, first: Timer) {
        let due = tokio::time::Instant::now();
        let mut next = Some(first);
        while let Some(timer) = next {
            let out = self.arcade.timer_fired(timer, now_ms());
            self.dispatch(out);
            next = self.timers.pop_due(due);
        }
    }

    fn handle(&mut self, cmd: Command) {
        let now = now_ms();
        match cmd {
            Command::Connect {
                player_id,
                wallet,
                sender,
                reply,
            } => match self.arcade.connect(player_id, wallet, now) {
                Ok(out) => {
                    self.fanout.register(player_id, sender);
                    self.dispatch(out);
                    let _ = reply.send(Ok(()));
                }
                Err(e) => {
                    tracing::warn!(%player_id, error = %e, "connection refused");
                    let _ = reply.send(Err(e));
                }
            },
            Command::Client { player_id, msg } => {
                let out = self.arcade.handle(player_id, msg, now);
                self.dispatch(out);
            }
            Command::Disconnect { player_id } => {
                self.fanout.unregister(player_id);
                let out = self.arcade.disconnect(player_id, now);
                self.dispatch(out);
            }
            Command::ClaimSettled {
                player_id,
                room_id,
                outcome,
            } => {
                let out = self.arcade.claim_settled(player_id, room_id, outcome);
                self.dispatch(out);
            }
            Command::Rooms { reply } => {
                let _ = reply.send(self.arcade.room_snapshots());
            }
            Command::PlayerCount { reply } => {
                let _ = reply.send(self.arcade.players().len());
            }
            // Handled in `run`.
            Command::Shutdown => {}
        }
    }

    fn dispatch(&mut self, out: Outbox) {
        for (to, msg) in out.deliveries {
            self.fanout.deliver(&to, msg);
        }
        for room_id in out.closed_rooms {
            let dropped = self.timers.cancel_where(|t| t.room_id() == room_id);
            if dropped > 0 {
                tracing::debug!(%room_id, dropped, "timers for deleted room cancelled");
            }
        }
        for (after, timer) in out.timers {
            tracing::debug!(room_id = %timer.room_id(), ?after, "timer armed");
            self.timers.schedule(after, timer);
        }
        for call in out.ledger {
            self.spawn_ledger_call(call);
        }
    }

    fn spawn_ledger_call(&self, call: LedgerCall) {
        let ledger = Arc::clone(&self.ledger);
        match call {
            LedgerCall::Record(entry) => {
                tokio::spawn(async move {
                    let (player_id, room_id) = (entry.player_id, entry.room_id);
                    if let Err(e) = ledger.record_result(entry).await {
                        tracing::warn!(%player_id, %room_id, error = %e, "recording result failed");
                    }
                });
            }
            LedgerCall::Claim(claim) => {
                let mailbox = self.mailbox.clone();
                tokio::spawn(async move {
                    let (player_id, room_id) = (claim.player_id, claim.room_id);
                    let outcome = ledger.claim_reward(claim).await;
                    let Some(mailbox) = mailbox.upgrade() else {
                        tracing::debug!(%player_id, %room_id, "coordinator gone, claim result dropped");
                        return;
                    };
                    let _ = mailbox
                        .send(Command::ClaimSettled {
                            player_id,
                            room_id,
                            outcome,
                        })
                        .await;
                });
            }
        }
    }
}
