//! Delivery of server messages to connected players.

use std::collections::HashMap;

use conductor_protocol::{PlayerId, Recipient, ServerMessage};
use tokio::sync::mpsc;

/// Channel sender for delivering outbound messages to one player's
/// connection task.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Maps each connected player to their outbound queue.
///
/// Delivery never blocks: each connection drains its own unbounded queue.
/// A player whose queue is closed is skipped; their disconnect is already
/// on its way through the mailbox.
#[derive(Debug, Default)]
pub struct Fanout {
    senders: HashMap<PlayerId, PlayerSender>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, player_id: PlayerId, sender: PlayerSender) {
        self.senders.insert(player_id, sender);
    }

    pub fn unregister(&mut self, player_id: PlayerId) {
        self.senders.remove(&player_id);
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Sends `msg` to everyone `recipient` names. Returns how many queues
    /// accepted it.
    pub fn deliver(&self, recipient: &Recipient, msg: ServerMessage) -> usize {
        match recipient {
            Recipient::Player(id) => usize::from(self.push(*id, msg)),
            Recipient::Group(ids) => ids.iter().filter(|id| self.push(**id, msg.clone())).count(),
            Recipient::All => self
                .senders
                .keys()
                .filter(|id| self.push(**id, msg.clone()))
                .count(),
        }
    }

    fn push(&self, player_id: PlayerId, msg: ServerMessage) -> bool {
        match self.senders.get(&player_id) {
            Some(tx) => {
                if tx.send(msg).is_err() {
                    tracing::debug!(%player_id, "outbound queue closed, dropping message");
                    return false;
                }
                true
            }
            None => false,
        }
    }
}
