//! `IV || ciphertext` framing.

use crate::error::CryptoError;

/// Length of the IV prefix (one AES block).
pub const IV_LEN: usize = 16;

/// Borrowed view of an IV-prefixed payload.
#[derive(Debug, Clone, Copy)]
pub struct EncryptedPayload<'a> {
    iv: &'a [u8],
    ciphertext: &'a [u8],
}

impl<'a> EncryptedPayload<'a> {
    /// Split `bytes` into IV and ciphertext.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, CryptoError> {
        if bytes.len() < IV_LEN {
            return Err(CryptoError::MalformedPayload {
                len: bytes.len(),
                iv_len: IV_LEN,
            });
        }
        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        Ok(Self { iv, ciphertext })
    }

    /// The 16-byte IV.
    pub fn iv(&self) -> &'a [u8] {
        self.iv
    }

    /// Everything after the IV.
    pub fn ciphertext(&self) -> &'a [u8] {
        self.ciphertext
    }
}
