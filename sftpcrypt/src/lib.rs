//! # sftpcrypt
//!
//! Fetch an encrypted file over SFTP and decrypt it locally.
//!
//! The remote file is framed as `IV (16 bytes) || AES-256-CFB ciphertext`.
//! A call opens one SSH session and one SFTP channel, reads the file into
//! memory, tears both down, then decrypts the buffer.
//!
//! ## Features
//!
//! - Async SSH connections via russh, file transfer via russh-sftp
//! - Private key, password and keyboard-interactive authentication
//! - One deadline over the whole fetch; teardown on every exit path
//! - Structured errors internally, `Option` at the outermost boundary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sftpcrypt::PipelineBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sftpcrypt::Error> {
//!     let pipeline = PipelineBuilder::new("192.168.0.1")
//!         .username("user")
//!         .private_key("/home/user/.ssh/id_ed25519")
//!         .path("/path/to/encrypted/file")
//!         .key("01234567890123456789012345678901")
//!         .build()?;
//!
//!     let plaintext = pipeline.fetch_and_decrypt().await?;
//!     println!("{}", plaintext);
//!     Ok(())
//! }
//! ```

pub mod crypto;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod settings;
pub mod transport;

// Re-export main types for convenience
pub use crypto::{DecryptionKey, EncryptedPayload, decrypt};
pub use error::{Error, ErrorKind};
pub use fetch::{RemoteFileFetcher, RemoteTarget};
pub use pipeline::{Pipeline, PipelineBuilder, run, run_with};
pub use settings::{ConnectionSettings, DecryptionConfig, Defaults};
pub use transport::{
    ChallengeResponder, Connector, Credentials, HostKeyVerification, PrivateKeySource, SshConfig,
};
