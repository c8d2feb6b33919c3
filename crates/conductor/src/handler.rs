//! Per-connection handler: handshake, outbound writer and read loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `Hello` → check the protocol version
//!   2. Register with the coordinator → `Welcome` (or `ConnectionRefused`)
//!   3. Spawn a writer that drains the player's outbound queue
//!   4. Loop: receive frames → answer heartbeats, forward the rest

use std::sync::Arc;
use std::time::Duration;

use conductor_protocol::{
    ClientMessage, Codec, PROTOCOL_VERSION, PlayerId, ProtocolError, ServerMessage,
};
use conductor_room::RoomError;
use conductor_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::coordinator::now_ms;
use crate::fanout::PlayerSender;
use crate::server::ServerState;
use crate::{ConductorError, CoordinatorHandle};

/// How long a new connection has to send `Hello`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Drop guard that reports the disconnect when the handler exits.
///
/// Runs even if the handler returns early with an error. `Drop` is
/// synchronous, so the send is spawned.
struct DisconnectGuard {
    player_id: PlayerId,
    coordinator: CoordinatorHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            let _ = coordinator.disconnect(player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ConductorError> {
    let conn = Arc::new(conn);
    let player_id = PlayerId(conn.id().into_inner());
    tracing::debug!(%player_id, peer = %conn.peer_addr(), "handling new connection");

    // --- Step 1: Handshake ---
    let wallet = perform_handshake(&conn, &state).await?;

    // --- Step 2: Register ---
    let (outbound, rx) = mpsc::unbounded_channel();
    match state
        .coordinator
        .connect(player_id, wallet, outbound.clone())
        .await
    {
        Ok(()) => {}
        Err(ConductorError::Room(RoomError::ServerFull { current, max })) => {
            tracing::info!(%player_id, current, max, "server full, refusing connection");
            let refused = ServerMessage::ConnectionRefused {
                reason: "server_full".into(),
                max_players: max,
                current_players: current,
            };
            send_direct(&conn, &state.codec, &refused).await?;
            let _ = conn.close().await;
            return Ok(());
        }
        Err(e) => return Err(e),
    }
    let _guard = DisconnectGuard {
        player_id,
        coordinator: state.coordinator.clone(),
    };
    tracing::info!(%player_id, "player connected");

    // --- Step 3: Writer ---
    let writer = tokio::spawn(write_outbound(Arc::clone(&conn), rx, Arc::clone(&state)));

    // --- Step 4: Read loop ---
    let result = read_loop(&conn, &state, player_id, &outbound).await;

    writer.abort();
    // _guard drops here → disconnect reaches the coordinator.
    result
}

/// Waits for `Hello` and checks its version. Returns the wallet it
/// carried.
async fn perform_handshake<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
) -> Result<Option<String>, ConductorError> {
    let data = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ConductorError::Handshake(
                "connection closed before Hello".into(),
            ));
        }
        Ok(Err(e)) => return Err(ConductorError::Transport(e)),
        Err(_) => return Err(ConductorError::Handshake("Hello timed out".into())),
    };

    let refusal = match state.codec.decode(&data) {
        Ok(ClientMessage::Hello { version, wallet }) if version == PROTOCOL_VERSION => {
            return Ok(wallet);
        }
        Ok(ClientMessage::Hello { version, .. }) => ProtocolError::VersionMismatch {
            expected: PROTOCOL_VERSION,
            got: version,
        },
        Ok(_) | Err(_) => ProtocolError::HandshakeRequired,
    };
    send_direct(conn, &state.codec, &rejection(&refusal)).await?;
    Err(refusal.into())
}

/// Reads frames until the client leaves, goes quiet or breaks the
/// connection.
async fn read_loop<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    player_id: PlayerId,
    outbound: &PlayerSender,
) -> Result<(), ConductorError> {
    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return Ok(());
            }
            Err(_) => {
                tracing::info!(%player_id, "connection idle too long, closing");
                return Ok(());
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode client message");
                let _ = outbound.send(rejection(&e));
                continue;
            }
        };

        match msg {
            ClientMessage::Heartbeat { client_time } => {
                let _ = outbound.send(ServerMessage::HeartbeatAck {
                    client_time,
                    server_time: now_ms(),
                });
            }
            ClientMessage::Disconnect { reason } => {
                tracing::info!(%player_id, %reason, "client disconnected");
                return Ok(());
            }
            ClientMessage::Hello { .. } => {
                let _ = outbound.send(rejection(&ProtocolError::AlreadyConnected));
            }
            other => state.coordinator.send(player_id, other).await?,
        }
    }
}

/// Drains the player's outbound queue onto the socket.
async fn write_outbound<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    state: Arc<ServerState<C>>,
) {
    while let Some(msg) = rx.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode server message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}

/// Sends a message straight to the socket, bypassing the coordinator.
/// Only used before the player is registered.
async fn send_direct(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), ConductorError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

fn rejection(err: &ProtocolError) -> ServerMessage {
    ServerMessage::Rejected {
        reason: err.reason().to_string(),
        message: err.to_string(),
    }
}
