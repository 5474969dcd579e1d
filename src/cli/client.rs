//! IPC client for communicating with the RestMode daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Timeout handling

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::types::{IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Socket path relative to the home directory.
const SOCKET_PATH: &str = ".restmode/restmode.sock";

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be resolved.
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME環境変数が設定されていません")?;
        Ok(Self {
            socket_path: PathBuf::from(home).join(SOCKET_PATH),
        })
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Queries the current schedule.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Status).await
    }

    /// Starts a break immediately.
    pub async fn start_break(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Break).await
    }

    /// Postpones the current break.
    pub async fn postpone(&self, minutes: u32) -> Result<IpcResponse> {
        self.send(&IpcRequest::Postpone { minutes }).await
    }

    /// Skips the current break.
    pub async fn skip(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Skip).await
    }

    /// Extends the current work interval.
    pub async fn add(&self, minutes: u32) -> Result<IpcResponse> {
        self.send(&IpcRequest::Add { minutes }).await
    }

    /// Asks the daemon to re-read its settings file.
    pub async fn reload(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Reload).await
    }

    /// Sends one request and reads the response.
    async fn send(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = timeout(
            Duration::from_secs(CONNECTION_TIMEOUT_SECS),
            UnixStream::connect(&self.socket_path),
        )
        .await
        .context("デーモンへの接続がタイムアウトしました")?
        .with_context(|| {
            format!(
                "デーモンに接続できません ({:?})。`restmode daemon` が起動しているか確認してください",
                self.socket_path
            )
        })?;

        let json = serde_json::to_vec(request).context("リクエストのシリアライズに失敗しました")?;
        stream
            .write_all(&json)
            .await
            .context("リクエストを送信できませんでした")?;
        stream
            .flush()
            .await
            .context("リクエストを送信できませんでした")?;
        // Signal end-of-request so the server read returns promptly
        stream
            .shutdown()
            .await
            .context("リクエストを送信できませんでした")?;

        let mut buffer = vec![0u8; MAX_RESPONSE_SIZE];
        let n = timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.read(&mut buffer))
            .await
            .context("レスポンスの受信がタイムアウトしました")?
            .context("レスポンスを読み取れませんでした")?;

        if n == 0 {
            anyhow::bail!("デーモンが応答せずに接続を閉じました");
        }

        let response: IpcResponse = serde_json::from_slice(&buffer[..n])
            .context("レスポンスの解析に失敗しました")?;
        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_socket_path() {
        let path = PathBuf::from("/tmp/test.sock");
        let client = IpcClient::with_socket_path(path.clone());
        assert_eq!(client.socket_path(), &path);
    }

    #[tokio::test]
    async fn test_connect_to_missing_socket_fails() {
        let client = IpcClient::with_socket_path(PathBuf::from("/nonexistent/restmode.sock"));
        let result = client.status().await;
        assert!(result.is_err());
    }
}
