//! `ConductorServer` builder and accept loop.
//!
//! This is the entry point for running an arcade. It ties the layers
//! together: transport → protocol → connection handler → coordinator.

use std::sync::Arc;
use std::time::Duration;

use conductor_protocol::{Codec, JsonCodec};
use conductor_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{Arcade, ArcadeConfig, ConductorError, CoordinatorHandle, RewardLedger, spawn_coordinator};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) coordinator: CoordinatorHandle,
    pub(crate) codec: C,
    /// A connection that sends nothing for this long is closed.
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Conductor server.
///
/// # Example
///
/// ```rust,no_run
/// use conductor::{ConductorServer, MemoryLedger};
///
/// # async fn run() -> Result<(), conductor::ConductorError> {
/// let server = ConductorServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(MemoryLedger::new())
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ConductorServerBuilder {
    bind_addr: String,
    config: ArcadeConfig,
    idle_timeout: Duration,
    seed: Option<u64>,
}

impl ConductorServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: ArcadeConfig::default(),
            idle_timeout: Duration::from_secs(30),
            seed: None,
        }
    }

    /// Sets the address to bind to. Port 0 picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn config(mut self, config: ArcadeConfig) -> Self {
        self.config = config;
        self
    }

    /// Closes connections that stay silent this long. Clients heartbeat
    /// every few seconds, so the default of 30 s only catches dead peers.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Seeds the game-sequence shuffle, for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Binds the transport and starts the coordinator.
    pub async fn build<L: RewardLedger>(
        self,
        ledger: L,
    ) -> Result<ConductorServer<JsonCodec>, ConductorError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let arcade = match self.seed {
            Some(seed) => Arcade::with_seed(self.config, seed),
            None => Arcade::new(self.config),
        };
        let coordinator = spawn_coordinator(arcade, Arc::new(ledger));

        let state = Arc::new(ServerState {
            coordinator,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });
        Ok(ConductorServer { transport, state })
    }
}

impl Default for ConductorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Conductor server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ConductorServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ConductorServer<JsonCodec> {
    pub fn builder() -> ConductorServerBuilder {
        ConductorServerBuilder::new()
    }
}

impl<C: Codec> ConductorServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the coordinator, for inspection or shutdown.
    pub fn handle(&self) -> CoordinatorHandle {
        self.state.coordinator.clone()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ConductorError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Conductor server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) if e.is_per_connection() => {
                    tracing::warn!(error = %e, "dropping connection attempt");
                }
                Err(e) => {
                    tracing::error!(error = %e, "listener failed");
                    return Err(e.into());
                }
            }
        }
    }
}
