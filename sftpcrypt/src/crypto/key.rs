//! Decryption key handling.

use secrecy::{ExposeSecret, SecretSlice, SecretString};

use crate::error::{ConfigError, CryptoError};

/// Required key length for AES-256.
pub const KEY_LEN: usize = 32;

/// Symmetric key material, zeroized on drop.
///
/// The length is validated when the key is used, never padded or truncated.
#[derive(Debug)]
pub struct DecryptionKey(SecretSlice<u8>);

impl DecryptionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(SecretSlice::from(bytes.into()))
    }

    /// Use the UTF-8 encoding of `text` as the key.
    pub fn from_utf8(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    /// Whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject a key of the wrong length while the job is being configured.
    pub(crate) fn validated(self) -> Result<Self, ConfigError> {
        if self.len() != KEY_LEN {
            return Err(ConfigError::Invalid {
                message: format!("decryption key must be {} bytes, got {}", KEY_LEN, self.len()),
            });
        }
        Ok(self)
    }

    /// Key bytes, provided they are exactly [`KEY_LEN`] long.
    pub(crate) fn checked(&self) -> Result<&[u8], CryptoError> {
        let bytes = self.0.expose_secret();
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::Decryption(format!(
                "key must be {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

impl From<&SecretString> for DecryptionKey {
    fn from(secret: &SecretString) -> Self {
        Self::from_utf8(secret.expose_secret())
    }
}
