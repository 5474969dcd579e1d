//! IPC server for the RestMode daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for schedule commands
//! - Integration with RestScheduler for command execution

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::info;

use crate::scheduler::RestScheduler;
use crate::settings::SettingsStore;
use crate::types::{BreakPhase, IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Socket path relative to the home directory.
const SOCKET_PATH: &str = ".restmode/restmode.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns the default socket path (`~/.restmode/restmode.sock`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be resolved.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME環境変数が設定されていません")?;
    Ok(PathBuf::from(home).join(SOCKET_PATH))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        // Remove existing socket file if present
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the scheduler.
pub struct RequestHandler {
    /// Shared reference to the scheduler
    scheduler: Arc<Mutex<RestScheduler>>,
    /// Settings store, for the reload command
    store: Arc<SettingsStore>,
    /// Whether the schedule has started ticking (start-on-launch gate)
    started: Arc<AtomicBool>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(
        scheduler: Arc<Mutex<RestScheduler>>,
        store: Arc<SettingsStore>,
        started: Arc<AtomicBool>,
    ) -> Self {
        Self {
            scheduler,
            store,
            started,
        }
    }

    /// Handles a single request and produces the response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Status => {
                let scheduler = self.scheduler.lock().await;
                IpcResponse::success("現在のスケジュール", Some(scheduler.snapshot()))
            }
            IpcRequest::Break => {
                let mut scheduler = self.scheduler.lock().await;
                if scheduler.is_shutting_down() {
                    return IpcResponse::error("デーモンはシャットダウン中です");
                }
                self.activate(&mut scheduler);
                if scheduler.snapshot().phase.is_break_active() {
                    return IpcResponse::error("すでに休憩中です");
                }
                scheduler.start_break();
                IpcResponse::success("休憩を開始しました", Some(scheduler.snapshot()))
            }
            IpcRequest::Postpone { minutes } => {
                if minutes == 0 {
                    return IpcResponse::error("延期する時間は1分以上で指定してください");
                }
                let mut scheduler = self.scheduler.lock().await;
                if scheduler.is_shutting_down() {
                    return IpcResponse::error("デーモンはシャットダウン中です");
                }
                self.activate(&mut scheduler);
                scheduler.postpone_break(minutes);
                IpcResponse::success(
                    format!("休憩を{}分延期しました", minutes),
                    Some(scheduler.snapshot()),
                )
            }
            IpcRequest::Skip => {
                let mut scheduler = self.scheduler.lock().await;
                if scheduler.is_shutting_down() {
                    return IpcResponse::error("デーモンはシャットダウン中です");
                }
                self.activate(&mut scheduler);
                scheduler.skip_break();
                IpcResponse::success("休憩をスキップしました", Some(scheduler.snapshot()))
            }
            IpcRequest::Add { minutes } => {
                if minutes == 0 {
                    return IpcResponse::error("延長する時間は1分以上で指定してください");
                }
                let mut scheduler = self.scheduler.lock().await;
                if scheduler.is_shutting_down() {
                    return IpcResponse::error("デーモンはシャットダウン中です");
                }
                self.activate(&mut scheduler);
                if scheduler.snapshot().phase != BreakPhase::Working {
                    return IpcResponse::error("休憩中は作業時間を延長できません");
                }
                scheduler.add_work_time(minutes);
                IpcResponse::success(
                    format!("作業時間を{}分延長しました", minutes),
                    Some(scheduler.snapshot()),
                )
            }
            IpcRequest::Reload => match self.store.reload() {
                Ok(_) => {
                    // The daemon's settings watch applies the new values.
                    IpcResponse::success("設定を再読み込みしました", None)
                }
                Err(e) => IpcResponse::error(format!("{:#}", e)),
            },
        }
    }

    /// Activates a dormant schedule on the first mutating command.
    fn activate(&self, scheduler: &mut RestScheduler) {
        if !self.started.swap(true, Ordering::SeqCst) {
            scheduler.begin_work_interval();
            info!("Schedule activated by client command");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
