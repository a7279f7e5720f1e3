//! SSH transport layer wrapping russh.
//!
//! This module provides connection management and authentication,
//! plus the SFTP channel used to pull a single file.

pub mod auth;
pub mod config;
pub mod session;
mod ssh;

pub use auth::{
    AuthPlan, Authenticator, Challenge, ChallengeResponder, InteractiveStep, PasswordResponder,
};
pub use config::{Credentials, HostKeyVerification, PrivateKeySource, SshConfig};
pub use session::{ConnectionSignal, ConnectionWatch, Connector, FileChannel, RemoteSession};
pub use ssh::{SftpChannel, SshConnector, SshSession};
