use docseal_core::UserAction;
use docseal_crypto::CryptoError;
use thiserror::Error;

pub type UploadResult<T> = Result<T, UploadError>;

/// Why a file was rejected before any cryptography ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("file is empty")]
    Empty,

    #[error("file is {size} bytes, limit is {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("file type not accepted: {name} ({mime_type})")]
    TypeNotAllowed { name: String, mime_type: String },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid file: {0}")]
    Validation(#[from] ValidationError),

    #[error("encryption key not available, please sign in again")]
    KeyUnavailable,

    /// Wrong key, tampered or malformed envelope. Carries no cause.
    #[error("cannot open document")]
    CannotOpen,

    #[error("encryption failed: {0}")]
    EncryptionFailure(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

impl From<CryptoError> for UploadError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Integrity | CryptoError::MalformedEnvelope(_) => UploadError::CannotOpen,
            CryptoError::Encryption(msg) => UploadError::EncryptionFailure(msg),
            CryptoError::Derivation(msg) => UploadError::Derivation(msg),
        }
    }
}

impl UploadError {
    /// What the user can do about it.
    pub fn user_action(&self) -> UserAction {
        match self {
            UploadError::Validation(_) => UserAction::ChooseDifferentFile,
            UploadError::KeyUnavailable | UploadError::Derivation(_) => UserAction::Reauthenticate,
            UploadError::CannotOpen | UploadError::EncryptionFailure(_) => UserAction::Retry,
        }
    }

    /// Text safe to show in the UI. Never includes primitive error details.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Validation(e) => e.to_string(),
            UploadError::KeyUnavailable | UploadError::Derivation(_) => {
                "Encryption key not available. Please sign in again.".into()
            }
            UploadError::CannotOpen => "Cannot open document.".into(),
            UploadError::EncryptionFailure(_) => "Failed to encrypt file. Please try again.".into(),
        }
    }
}
