//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Default deadline for one fetch (connect, authenticate, open, read).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For testing and lab use only.
    Disabled,
}

/// SSH connection configuration.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Credentials offered to the server.
    pub credentials: Credentials,

    /// Deadline for the whole fetch.
    pub timeout: Duration,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Create a configuration with defaults for everything but host and user.
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            credentials: Credentials::default(),
            timeout: DEFAULT_TIMEOUT,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Every credential configured for a connection.
///
/// Several may be present at once; [`AuthPlan::select`](crate::transport::AuthPlan::select)
/// picks the single one actually offered.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Private key, preferred over everything else.
    pub private_key: Option<PrivateKeySource>,

    /// Password, also used to answer keyboard-interactive prompts.
    pub password: Option<SecretString>,

    /// Fall back to keyboard-interactive when password auth is rejected
    /// or no password is configured.
    pub interactive_fallback: bool,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            private_key: None,
            password: None,
            interactive_fallback: true,
        }
    }
}

/// Where a private key is loaded from.
#[derive(Debug, Clone)]
pub enum PrivateKeySource {
    /// OpenSSH or PEM key file on the local filesystem.
    Path {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },

    /// Key material already in memory.
    Pem {
        /// Encoded key text.
        pem: SecretString,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}

impl PrivateKeySource {
    /// Human-readable name of the key origin, safe for logs.
    pub fn describe(&self) -> String {
        match self {
            PrivateKeySource::Path { path, .. } => path.display().to_string(),
            PrivateKeySource::Pem { .. } => "in-memory key".to_string(),
        }
    }
}
