//! Builder for fetch-and-decrypt pipelines.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use super::Pipeline;
use crate::crypto::DecryptionKey;
use crate::error::{ConfigError, Result};
use crate::fetch::{RemoteFileFetcher, RemoteTarget};
use crate::transport::config::{DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::transport::{
    ChallengeResponder, Connector, Credentials, HostKeyVerification, PrivateKeySource, SshConfig,
    SshConnector,
};

/// Builder for constructing a [`Pipeline`].
///
/// # Example
///
/// ```rust,no_run
/// use sftpcrypt::PipelineBuilder;
///
/// # async fn example() -> Result<(), sftpcrypt::Error> {
/// let pipeline = PipelineBuilder::new("192.168.0.1")
///     .username("user")
///     .password("securepassword")
///     .path("/path/to/encrypted/file")
///     .key("01234567890123456789012345678901")
///     .build()?;
///
/// let plaintext = pipeline.fetch_and_decrypt().await?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    credentials: Credentials,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    responder: Option<Arc<dyn ChallengeResponder>>,
    path: Option<String>,
    key: Option<DecryptionKey>,
}

impl PipelineBuilder {
    /// Create a new builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: None,
            credentials: Credentials::default(),
            timeout: DEFAULT_TIMEOUT,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            responder: None,
            path: None,
            key: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password. Also answers keyboard-interactive prompts.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.credentials.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication. Takes precedence over any password.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.credentials.private_key = Some(PrivateKeySource::Path {
            path: key_path.into(),
            passphrase: None,
        });
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.credentials.private_key = Some(PrivateKeySource::Path {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        });
        self
    }

    /// Set private key authentication from in-memory key text.
    pub fn private_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.credentials.private_key = Some(PrivateKeySource::Pem {
            pem: SecretString::from(pem.into()),
            passphrase: None,
        });
        self
    }

    /// Enable or disable the keyboard-interactive fallback (default: enabled).
    pub fn interactive_fallback(mut self, enabled: bool) -> Self {
        self.credentials.interactive_fallback = enabled;
        self
    }

    /// Answer keyboard-interactive prompts with a custom responder.
    pub fn challenge_responder(mut self, responder: Arc<dyn ChallengeResponder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Set the deadline for the whole fetch.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a custom known_hosts file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Set the remote file path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the decryption key from text (its UTF-8 bytes are the key).
    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(DecryptionKey::from_utf8(key));
        self
    }

    /// Set the decryption key from raw bytes.
    pub fn key_bytes(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(DecryptionKey::from_bytes(key));
        self
    }

    /// Build a pipeline that connects with russh.
    pub fn build(self) -> Result<Pipeline<SshConnector>> {
        self.build_with(SshConnector)
    }

    /// Build a pipeline that connects through `connector`.
    ///
    /// Nothing is contacted until the pipeline runs.
    pub fn build_with<C: Connector>(self, connector: C) -> Result<Pipeline<C>> {
        if self.host.is_empty() {
            return Err(ConfigError::Missing { field: "host" }.into());
        }
        let username = self
            .username
            .ok_or(ConfigError::Missing { field: "username" })?;
        let path = self.path.ok_or(ConfigError::Missing { field: "file_path" })?;
        let key = self
            .key
            .ok_or(ConfigError::Missing {
                field: "decryption_key",
            })?
            .validated()?;
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            credentials: self.credentials,
            timeout: self.timeout,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        let mut fetcher = RemoteFileFetcher::new(connector, ssh_config);
        if let Some(responder) = self.responder {
            fetcher = fetcher.with_responder(responder);
        }

        Ok(Pipeline::new(fetcher, RemoteTarget::new(path), key))
    }
}
