//! Remote file retrieval.
//!
//! [`RemoteFileFetcher`] opens one session and one file channel per call,
//! reads the target in full and tears both down on every exit path.

#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::error::{Result, TransportError};
use crate::transport::{
    ChallengeResponder, ConnectionWatch, Connector, FileChannel, PasswordResponder, RemoteSession,
    SshConfig, SshConnector,
};

/// Upper bound on each teardown step, so a dead peer cannot stall the return.
pub const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// The remote file to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// Path on the remote host.
    pub path: String,
}

impl RemoteTarget {
    /// Create a target for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Fetches a single remote file over a fresh session.
pub struct RemoteFileFetcher<C = SshConnector> {
    connector: C,
    config: SshConfig,
    responder: Arc<dyn ChallengeResponder>,
}

impl RemoteFileFetcher<SshConnector> {
    /// Create a fetcher that connects with russh.
    pub fn ssh(config: SshConfig) -> Self {
        Self::new(SshConnector, config)
    }
}

impl<C: Connector> RemoteFileFetcher<C> {
    /// Create a fetcher. Keyboard-interactive prompts are answered with the
    /// configured password.
    pub fn new(connector: C, config: SshConfig) -> Self {
        let responder = Arc::new(PasswordResponder::from_credentials(&config.credentials));
        Self {
            connector,
            config,
            responder,
        }
    }

    /// Replace the keyboard-interactive responder.
    pub fn with_responder(mut self, responder: Arc<dyn ChallengeResponder>) -> Self {
        self.responder = responder;
        self
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &SshConfig {
        &self.config
    }

    /// Read `target` from the remote host.
    ///
    /// Connect, authenticate, channel open and read share one deadline of
    /// `config.timeout`. No retries are attempted.
    pub async fn fetch(&self, target: &RemoteTarget) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.config.timeout;

        debug!(
            "Fetching '{}' from {} as '{}'",
            target.path,
            self.config.socket_addr(),
            self.config.username
        );

        let session = tokio::time::timeout_at(
            deadline,
            self.connector.connect(&self.config, self.responder.as_ref()),
        )
        .await
        .map_err(|_| TransportError::Timeout(self.config.timeout))??;

        self.fetch_on(session, target, deadline).await
    }

    /// Open the channel, read, then close channel and session.
    async fn fetch_on(
        &self,
        mut session: C::Session,
        target: &RemoteTarget,
        deadline: Instant,
    ) -> Result<Vec<u8>> {
        let watch = session.watch();

        let mut channel = match self
            .guarded(&watch, deadline, session.open_file_channel())
            .await
        {
            Ok(channel) => channel,
            Err(e) => {
                self.close_session(session).await;
                return Err(e);
            }
        };

        let data = self
            .guarded(&watch, deadline, channel.read_file(&target.path))
            .await;

        match tokio::time::timeout(TEARDOWN_TIMEOUT, channel.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to close file channel: {}", e),
            Err(_) => warn!("Timed out closing file channel"),
        }
        self.close_session(session).await;

        if let Ok(ref bytes) = data {
            debug!("Read {} bytes from '{}'", bytes.len(), target.path);
        }
        data
    }

    /// Run `op` until it resolves, the connection drops or the deadline passes.
    async fn guarded<T>(
        &self,
        watch: &ConnectionWatch,
        deadline: Instant,
        op: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            result = op => result,
            reason = watch.clone().lost() => Err(TransportError::Disconnected(reason).into()),
            _ = tokio::time::sleep_until(deadline) => {
                Err(TransportError::Timeout(self.config.timeout).into())
            }
        }
    }

    async fn close_session(&self, session: C::Session) {
        match tokio::time::timeout(TEARDOWN_TIMEOUT, session.close()).await {
            Ok(Ok(())) => debug!("Closed session to {}", self.config.socket_addr()),
            Ok(Err(e)) => warn!(
                "Failed to close session to {}: {}",
                self.config.socket_addr(),
                e
            ),
            Err(_) => warn!("Timed out closing session to {}", self.config.socket_addr()),
        }
    }
}
