use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// Authentication failed. Does not say whether the key was wrong or the
    /// data was modified.
    #[error("cannot open document")]
    Integrity,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}
