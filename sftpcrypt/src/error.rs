//! Error types for sftpcrypt.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for sftpcrypt operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// File-transfer channel errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Payload decryption errors
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Configuration resolution errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Classify this error into its flat failure kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(e) => e.kind(),
            Error::Channel(e) => e.kind(),
            Error::Crypto(e) => e.kind(),
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

/// Flat classification of every failure a fetch-and-decrypt call can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The private key could not be read or parsed.
    KeyLoad,
    /// The SFTP sub-channel could not be opened.
    ChannelOpen,
    /// The remote file could not be read in full.
    RemoteRead,
    /// Transport-level failure (connect, protocol, late disconnect).
    Connection,
    /// The server rejected the offered credentials.
    Authentication,
    /// Keyboard-interactive was demanded but no answer is available.
    InteractiveAuthUnavailable,
    /// The deadline for the fetch elapsed.
    Timeout,
    /// Payload shorter than the IV.
    MalformedPayload,
    /// The cipher rejected the key or IV.
    Decryption,
    /// Plaintext is not valid UTF-8.
    Encoding,
    /// Configuration could not be resolved.
    Config,
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// The private key could not be loaded from its source
    #[error("Error reading private key from {source_name}: {message}")]
    KeyLoad {
        source_name: String,
        message: String,
    },

    /// Keyboard-interactive requested without a password to answer with
    #[error("Interactive authentication is not possible without a password")]
    InteractiveAuthUnavailable,

    /// The connection dropped after it was established
    #[error("SSH connection error: {0}")]
    Disconnected(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and strict checking is enabled
    #[error("Host key for {host}:{port} is not known")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),
}

impl TransportError {
    fn kind(&self) -> ErrorKind {
        match self {
            TransportError::KeyLoad { .. } => ErrorKind::KeyLoad,
            TransportError::AuthenticationFailed { .. } => ErrorKind::Authentication,
            TransportError::InteractiveAuthUnavailable => ErrorKind::InteractiveAuthUnavailable,
            TransportError::Timeout(_) => ErrorKind::Timeout,
            TransportError::ConnectionFailed { .. }
            | TransportError::Ssh(_)
            | TransportError::Disconnected(_)
            | TransportError::HostKeyChanged { .. }
            | TransportError::HostKeyUnknown { .. }
            | TransportError::KnownHosts(_) => ErrorKind::Connection,
        }
    }
}

/// File-transfer channel errors.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open the SFTP subsystem
    #[error("Error opening SFTP session: {0}")]
    OpenFailed(String),

    /// Failed to read the remote file
    #[error("Error reading file '{path}': {message}")]
    ReadFailed { path: String, message: String },

    /// Failed to close the SFTP subsystem cleanly
    #[error("Error closing SFTP session: {0}")]
    CloseFailed(String),
}

impl ChannelError {
    fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::OpenFailed(_) => ErrorKind::ChannelOpen,
            ChannelError::ReadFailed { .. } => ErrorKind::RemoteRead,
            ChannelError::CloseFailed(_) => ErrorKind::Connection,
        }
    }
}

/// Payload decryption errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Payload too short to carry an IV
    #[error("Malformed payload: {len} bytes is shorter than the {iv_len}-byte IV")]
    MalformedPayload { len: usize, iv_len: usize },

    /// Key or IV rejected by the cipher
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Plaintext is not UTF-8
    #[error("Decrypted content is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl CryptoError {
    fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::MalformedPayload { .. } => ErrorKind::MalformedPayload,
            CryptoError::Decryption(_) => ErrorKind::Decryption,
            CryptoError::Encoding(_) => ErrorKind::Encoding,
        }
    }
}

/// Configuration resolution errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required value was neither given nor defaulted
    #[error("Missing configuration value: {field}")]
    Missing { field: &'static str },

    /// A value was present but unusable
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Result type alias using sftpcrypt's Error.
pub type Result<T> = std::result::Result<T, Error>;
