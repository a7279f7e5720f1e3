//! Fetch-then-decrypt orchestration.
//!
//! [`Pipeline::fetch_and_decrypt`] keeps the structured [`Error`]. [`run`]
//! and [`Pipeline::run`] report the failure through `log::error!` and return
//! `None`, for callers that only want plaintext or nothing.

mod builder;

pub use builder::PipelineBuilder;

use log::{debug, error};

use crate::crypto::{self, DecryptionKey};
use crate::error::{Error, Result};
use crate::fetch::{RemoteFileFetcher, RemoteTarget};
use crate::settings::{ConnectionSettings, DecryptionConfig, Defaults};
use crate::transport::{Connector, SshConnector};

/// A resolved fetch-and-decrypt job.
pub struct Pipeline<C = SshConnector> {
    fetcher: RemoteFileFetcher<C>,
    target: RemoteTarget,
    key: DecryptionKey,
}

impl Pipeline<SshConnector> {
    /// Resolve caller settings against `defaults` into an SSH-backed pipeline.
    pub fn resolve(
        settings: &ConnectionSettings,
        decryption: &DecryptionConfig,
        defaults: &Defaults,
    ) -> Result<Self> {
        Self::resolve_with(SshConnector, settings, decryption, defaults)
    }
}

impl<C: Connector> Pipeline<C> {
    /// Create a pipeline from already-resolved parts.
    pub fn new(fetcher: RemoteFileFetcher<C>, target: RemoteTarget, key: DecryptionKey) -> Self {
        Self {
            fetcher,
            target,
            key,
        }
    }

    /// Resolve caller settings against `defaults`, connecting through `connector`.
    pub fn resolve_with(
        connector: C,
        settings: &ConnectionSettings,
        decryption: &DecryptionConfig,
        defaults: &Defaults,
    ) -> Result<Self> {
        let ssh = defaults.resolve_ssh(settings)?;
        let target = defaults.resolve_target(decryption)?;
        let key = defaults.resolve_key(decryption)?;
        Ok(Self::new(RemoteFileFetcher::new(connector, ssh), target, key))
    }

    /// Get the remote target.
    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    /// Get the underlying fetcher.
    pub fn fetcher(&self) -> &RemoteFileFetcher<C> {
        &self.fetcher
    }

    /// Fetch the remote file and decrypt it.
    pub async fn fetch_and_decrypt(&self) -> Result<String> {
        let encrypted = self.fetcher.fetch(&self.target).await?;
        debug!("Decrypting {} bytes", encrypted.len());
        Ok(crypto::decrypt(&encrypted, &self.key)?)
    }

    /// Fetch and decrypt, reporting any failure and returning `None`.
    pub async fn run(&self) -> Option<String> {
        report(self.fetch_and_decrypt().await)
    }
}

/// Resolve, fetch and decrypt over SSH. Never fails: errors are logged and
/// collapse to `None`.
pub async fn run(
    settings: &ConnectionSettings,
    decryption: &DecryptionConfig,
    defaults: &Defaults,
) -> Option<String> {
    run_with(SshConnector, settings, decryption, defaults).await
}

/// Like [`run`], connecting through `connector`.
pub async fn run_with<C: Connector>(
    connector: C,
    settings: &ConnectionSettings,
    decryption: &DecryptionConfig,
    defaults: &Defaults,
) -> Option<String> {
    match Pipeline::resolve_with(connector, settings, decryption, defaults) {
        Ok(pipeline) => pipeline.run().await,
        Err(e) => report(Err(e)),
    }
}

fn report(result: Result<String>) -> Option<String> {
    match result {
        Ok(plaintext) => Some(plaintext),
        Err(e) => {
            log_failure(&e);
            None
        }
    }
}

fn log_failure(e: &Error) {
    error!("Error ({:?}): {}", e.kind(), e);
}
