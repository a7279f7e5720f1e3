//! Session abstractions consumed by the fetcher.
//!
//! [`Connector`] establishes an authenticated [`RemoteSession`], which opens a
//! single [`FileChannel`]. The russh implementation lives in `ssh.rs`; tests
//! substitute in-memory implementations.

use std::future::Future;

use tokio::sync::watch;

use super::auth::ChallengeResponder;
use super::config::SshConfig;
use crate::error::Result;

/// Establishes authenticated sessions.
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Session: RemoteSession;

    /// Connect to `config.host:config.port` and authenticate.
    ///
    /// Keyboard-interactive prompts are answered through `responder`.
    fn connect(
        &self,
        config: &SshConfig,
        responder: &dyn ChallengeResponder,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// An authenticated connection to a remote host.
pub trait RemoteSession: Send + Sized {
    /// File-transfer channel type opened on this session.
    type Channel: FileChannel;

    /// Watch for the connection dropping after it was established.
    fn watch(&self) -> ConnectionWatch;

    /// Open the file-transfer sub-channel.
    fn open_file_channel(&mut self) -> impl Future<Output = Result<Self::Channel>> + Send;

    /// Tear the session down.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// A file-transfer sub-channel.
pub trait FileChannel: Send + Sized {
    /// Read the file at `path` in full.
    fn read_file(&mut self, path: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Close the channel.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Create a linked signal/watch pair for connection-loss events.
pub fn connection_watch() -> (ConnectionSignal, ConnectionWatch) {
    let (tx, rx) = watch::channel(None);
    (ConnectionSignal { tx }, ConnectionWatch { rx })
}

/// Sending half, owned by whatever observes the transport.
#[derive(Debug)]
pub struct ConnectionSignal {
    tx: watch::Sender<Option<String>>,
}

impl ConnectionSignal {
    /// Record that the connection was lost. Only the first reason is kept.
    pub fn lost(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
    }
}

/// Receiving half, resolves once the connection is gone.
#[derive(Debug, Clone)]
pub struct ConnectionWatch {
    rx: watch::Receiver<Option<String>>,
}

impl ConnectionWatch {
    /// Whether a loss has already been recorded.
    pub fn is_lost(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait until the connection is lost and return the reason.
    ///
    /// Dropping the signal without a reason counts as a loss.
    pub async fn lost(mut self) -> String {
        loop {
            if let Some(reason) = self.rx.borrow_and_update().clone() {
                return reason;
            }
            if self.rx.changed().await.is_err() {
                return self
                    .rx
                    .borrow()
                    .clone()
                    .unwrap_or_else(|| "connection closed".to_string());
            }
        }
    }
}
