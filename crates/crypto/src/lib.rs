use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of an HMAC-SHA256 tag
pub const MAC_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Secret key is required")]
    InvalidKey,
}

/// Compute the content digest of a file: SHA256(data)
/// Secret-independent, only used to recognise identical content.
pub fn digest(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Hex-encoded content digest, as stored in file records
pub fn content_digest(data: &[u8]) -> String {
    hex::encode(digest(data))
}

fn keyed_mac(secret_key: &[u8]) -> Result<HmacSha256, CryptoError> {
    if secret_key.is_empty() {
        return Err(CryptoError::InvalidKey);
    }
    HmacSha256::new_from_slice(secret_key).map_err(|_| CryptoError::InvalidKey)
}

/// Compute the raw HMAC-SHA256 tag of data under a secret key
pub fn authenticate_raw(data: &[u8], secret_key: &[u8]) -> Result<[u8; MAC_LEN], CryptoError> {
    let mut mac = keyed_mac(secret_key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Compute the base64-encoded HMAC-SHA256 of data under a secret key
pub fn authenticate(data: &[u8], secret_key: &[u8]) -> Result<String, CryptoError> {
    authenticate_raw(data, secret_key).map(|tag| STANDARD.encode(tag))
}

/// Verify data against an expected base64 HMAC.
///
/// The tag comparison is constant-time. An expected value that does not decode
/// to a tag of the right length is a mismatch, not an error.
pub fn verify(data: &[u8], secret_key: &[u8], expected_mac: &str) -> Result<bool, CryptoError> {
    let mut mac = keyed_mac(secret_key)?;
    let expected = match STANDARD.decode(expected_mac.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };
    mac.update(data);
    Ok(mac.verify_slice(&expected).is_ok())
}
