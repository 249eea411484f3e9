//! # WiFi Runtime
//!
//! Echo demo over the socket layer.
//!
//! More clients than socket slots run at once against a loopback
//! co-processor. Each client opens a socket, connects to `localhost:7`,
//! sends a payload and reads the echo back before disconnecting. A client
//! that finds the table full, or loses its socket to a peripheral reset,
//! starts its session over.
//!
//! ## Startup Sequence
//!
//! 1. Load socket configuration (`WIFI_SOCKETS_CONFIG` TOML file or defaults)
//! 2. Build the service on the loopback driver
//! 3. Optionally arm one hardware fault on the send path
//! 4. Run the clients and collect a report

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use wifi_sockets::adapters::FaultPoint;
use wifi_sockets::{
    AsyncSockets, ConfigProvider, LoopbackDriver, MutexChannelLock, ServiceStats, SocketError,
    SocketHandle, SocketService, SocketsApi, SocketsConfig, SystemTimeSource, ThreadScheduler,
    TomlConfigProvider,
};
use wifi_telemetry::log_socket_event;

/// Service type the demo runs on.
pub type DemoService =
    SocketService<LoopbackDriver, MutexChannelLock, SystemTimeSource, ThreadScheduler>;

/// Echo port every loopback connection answers on.
pub const ECHO_PORT: u16 = 7;

/// Demo parameters.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub sockets: SocketsConfig,
    /// Concurrent clients; more than `sockets.max_sockets` to show contention
    pub clients: usize,
    /// Bytes each client sends per session
    pub payload_size: usize,
    /// Sessions before giving up on a client
    pub max_attempts: usize,
    /// Pause before retrying a failed session
    pub retry_backoff: Duration,
    /// Arm one hardware fault on the send path before the clients start
    pub inject_fault: bool,
}

impl DemoConfig {
    /// Extra clients beyond the socket table capacity.
    pub const EXTRA_CLIENTS: usize = 3;

    pub fn new(sockets: SocketsConfig) -> Self {
        let clients = sockets.max_sockets + Self::EXTRA_CLIENTS;
        Self {
            sockets,
            clients,
            payload_size: 256,
            max_attempts: 50,
            retry_backoff: Duration::from_millis(10),
            inject_fault: true,
        }
    }
}

/// Load the socket configuration.
///
/// Reads the TOML file named by `WIFI_SOCKETS_CONFIG` when set, otherwise
/// uses the defaults.
pub fn load_sockets_config() -> Result<SocketsConfig> {
    match env::var("WIFI_SOCKETS_CONFIG") {
        Ok(path) => {
            let provider = TomlConfigProvider::load(&path)
                .with_context(|| format!("loading socket config from {path}"))?;
            info!(path = %path, "Loaded socket configuration");
            Ok(provider.sockets_config())
        }
        Err(_) => Ok(SocketsConfig::default()),
    }
}

/// Outcome of one demo run.
#[derive(Debug, Clone)]
pub struct DemoReport {
    /// Clients that completed an echo round trip
    pub completed: usize,
    /// Sessions restarted after a full table, a reset or a stale handle
    pub retries: usize,
    pub stats: ServiceStats,
}

/// Result of a single client session.
enum Session {
    Done,
    Retry(SocketError),
}

/// Run the echo demo to completion.
pub async fn run_echo_demo(config: DemoConfig) -> Result<DemoReport> {
    let service: DemoService =
        SocketService::with_system_defaults(config.sockets.clone(), LoopbackDriver::new())
            .context("building socket service")?;
    service.init().context("initialising socket table")?;

    if config.inject_fault {
        service.driver().inject_fault(FaultPoint::Send);
        info!("Armed one hardware fault on the send path");
    }

    let sockets = AsyncSockets::new(Arc::new(service));

    info!(
        clients = config.clients,
        capacity = config.sockets.max_sockets,
        payload = config.payload_size,
        "Starting echo clients"
    );

    let mut tasks = Vec::with_capacity(config.clients);
    for id in 0..config.clients {
        let sockets = sockets.clone();
        let config = config.clone();
        tasks.push(tokio::spawn(async move { run_client(id, &sockets, &config).await }));
    }

    let mut completed = 0;
    let mut retries = 0;
    for task in tasks {
        let client_retries = task.await.context("client task panicked")??;
        completed += 1;
        retries += client_retries;
    }

    let stats = sockets.blocking().stats();
    info!(
        completed,
        retries,
        resets = stats.resets,
        health = ?stats.health,
        "Echo demo finished"
    );

    Ok(DemoReport {
        completed,
        retries,
        stats,
    })
}

/// Retry sessions until one completes. Returns the number of retries.
async fn run_client(
    id: usize,
    sockets: &AsyncSockets<DemoService>,
    config: &DemoConfig,
) -> Result<usize> {
    let payload: Vec<u8> = (0..config.payload_size)
        .map(|i| (i + id) as u8)
        .collect();

    for attempt in 0..config.max_attempts {
        match echo_session(id, sockets, &payload).await? {
            Session::Done => {
                debug!(client = id, attempt, "Echo round trip complete");
                return Ok(attempt);
            }
            Session::Retry(reason) => {
                debug!(client = id, attempt, reason = %reason, "Retrying session");
                tokio::time::sleep(config.retry_backoff).await;
            }
        }
    }

    bail!(
        "client {id} gave up after {} attempts",
        config.max_attempts
    )
}

async fn echo_session(
    id: usize,
    sockets: &AsyncSockets<DemoService>,
    payload: &[u8],
) -> Result<Session> {
    let handle = match sockets.open().await {
        Ok(handle) => handle,
        Err(e @ SocketError::NoResourceAvailable) => return Ok(Session::Retry(e)),
        Err(e) => return Err(e).context("open"),
    };

    match exchange(sockets, handle, payload).await {
        Ok(echoed) => {
            if let Err(e) = verify_echo(payload, &echoed) {
                release(sockets, handle).await;
                return Err(e).with_context(|| format!("client {id} on {handle}"));
            }
            log_socket_event!(debug, id, "Echo verified", handle, bytes = payload.len());
            match sockets.disconnect(handle).await {
                // A reset between the echo and the disconnect already freed the slot.
                Ok(()) | Err(SocketError::InvalidHandle { .. }) => Ok(Session::Done),
                Err(e) => Err(e).context("disconnect"),
            }
        }
        Err(e) if retryable(&e) => {
            if still_owned(&e) {
                release(sockets, handle).await;
            }
            log_socket_event!(warn, id, "Session interrupted", handle, error = %e);
            Ok(Session::Retry(e))
        }
        Err(e) => {
            release(sockets, handle).await;
            Err(e).with_context(|| format!("client {id} on {handle}"))
        }
    }
}

/// Connect, send the whole payload and read the echo back.
async fn exchange(
    sockets: &AsyncSockets<DemoService>,
    handle: SocketHandle,
    payload: &[u8],
) -> Result<Vec<u8>, SocketError> {
    sockets.connect(handle, "localhost", ECHO_PORT).await?;

    let mut sent = 0;
    while sent < payload.len() {
        sent += sockets.send(handle, payload[sent..].to_vec()).await?;
    }

    let mut echoed = Vec::with_capacity(payload.len());
    while echoed.len() < payload.len() {
        let chunk = sockets.recv(handle, payload.len() - echoed.len()).await?;
        if chunk.is_empty() {
            return Err(SocketError::Timeout { operation: "recv" });
        }
        echoed.extend(chunk);
    }
    Ok(echoed)
}

/// The echo must match byte for byte. A mismatch is a data error, not a socket one.
fn verify_echo(payload: &[u8], echoed: &[u8]) -> Result<()> {
    if let Some(offset) = payload.iter().zip(echoed).position(|(sent, got)| sent != got) {
        bail!(
            "echo mismatch at byte {offset} of {}: sent {:#04x}, got {:#04x}",
            payload.len(),
            payload[offset],
            echoed[offset]
        );
    }
    if echoed.len() != payload.len() {
        bail!("echo length mismatch: sent {}, got {}", payload.len(), echoed.len());
    }
    Ok(())
}

fn retryable(error: &SocketError) -> bool {
    matches!(
        error,
        SocketError::PeripheralReset
            | SocketError::InvalidHandle { .. }
            | SocketError::NoResourceAvailable
            | SocketError::ConnectFailed { .. }
            | SocketError::Timeout { .. }
    )
}

/// Whether the failed session still holds its slot.
///
/// A reset frees every slot, and connect reports a stale handle as
/// `NoResourceAvailable`; in both cases the slot may already belong to
/// another client.
fn still_owned(error: &SocketError) -> bool {
    !error.invalidates_all_sockets() && !matches!(error, SocketError::NoResourceAvailable)
}

/// Best-effort teardown of a socket whose session failed.
async fn release(sockets: &AsyncSockets<DemoService>, handle: SocketHandle) {
    if let Err(e) = sockets.disconnect(handle).await {
        debug!(socket = %handle, error = %e, "Teardown after failed session");
    }
}
