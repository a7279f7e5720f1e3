//! AES-256-CFB payload decryption.
//!
//! Payloads are framed as `IV (16 bytes) || ciphertext`. CFB carries no
//! integrity tag: a wrong key or corrupted ciphertext decrypts to garbage
//! rather than failing, so a successful decrypt proves nothing about
//! authenticity.

mod key;
mod payload;

pub use key::{DecryptionKey, KEY_LEN};
pub use payload::{EncryptedPayload, IV_LEN};

use aes::Aes256;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};

use crate::error::CryptoError;

type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;
type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;

/// Decrypt an IV-prefixed payload and decode the plaintext as UTF-8.
///
/// Invalid UTF-8 fails with [`CryptoError::Encoding`]; use [`decrypt_bytes`]
/// to get the raw plaintext instead.
pub fn decrypt(payload: &[u8], key: &DecryptionKey) -> Result<String, CryptoError> {
    let plaintext = decrypt_bytes(payload, key)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Decrypt an IV-prefixed payload into raw bytes.
pub fn decrypt_bytes(payload: &[u8], key: &DecryptionKey) -> Result<Vec<u8>, CryptoError> {
    let payload = EncryptedPayload::parse(payload)?;
    let key = key.checked()?;

    let cipher = Aes256CfbDec::new_from_slices(key, payload.iv())
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;

    let mut buf = payload.ciphertext().to_vec();
    cipher.decrypt(&mut buf);
    Ok(buf)
}

/// Encrypt `plaintext` under `key` and `iv`, returning `iv || ciphertext`.
pub fn encrypt_with_iv(
    plaintext: &[u8],
    key: &DecryptionKey,
    iv: &[u8; IV_LEN],
) -> Result<Vec<u8>, CryptoError> {
    let key = key.checked()?;

    let cipher = Aes256CfbEnc::new_from_slices(key, iv)
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;

    let mut out = Vec::with_capacity(IV_LEN + plaintext.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(plaintext);
    cipher.encrypt(&mut out[IV_LEN..]);
    Ok(out)
}
