//! Secure upload orchestrator: validation, key lookup, and the file cipher

use std::fmt;
use std::sync::Arc;

use docseal_core::{DocsealConfig, DocsealError, FileMetadata};
use docseal_crypto::{CipherEnvelope, FileCipher, KeyMaterial};
use docseal_session::{InitOutcome, KeyLifecycleManager, KeyState};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::{UploadError, UploadResult};
use crate::policy::UploadPolicy;

/// A file handed over by the host for encryption.
pub struct Upload {
    pub name: String,
    /// Declared MIME type
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Envelope plus metadata, ready for the host to store as opaque JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedDocument {
    pub envelope: CipherEnvelope,
    pub metadata: FileMetadata,
}

/// A decrypted document. The plaintext is zeroized on drop.
pub struct OpenedDocument {
    metadata: FileMetadata,
    bytes: Zeroizing<Vec<u8>>,
}

impl OpenedDocument {
    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the host can show an inline preview.
    pub fn is_image(&self) -> bool {
        self.metadata.is_image()
    }
}

impl fmt::Debug for OpenedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedDocument")
            .field("metadata", &self.metadata)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The one place where session keys meet the file cipher.
///
/// Enforces the upload policy before any cryptography, never derives keys on
/// its own, and reports failures as `UploadError` without leaking why a
/// document failed to open.
#[derive(Debug)]
pub struct SecureUploadOrchestrator {
    keys: Arc<KeyLifecycleManager>,
    policy: UploadPolicy,
}

impl SecureUploadOrchestrator {
    pub fn new(keys: Arc<KeyLifecycleManager>, policy: UploadPolicy) -> Self {
        Self { keys, policy }
    }

    /// Build the key manager and policy from configuration.
    pub fn from_config(config: &DocsealConfig) -> Result<Self, DocsealError> {
        let keys = KeyLifecycleManager::from_config(config)
            .map_err(|e| DocsealError::Config(e.to_string()))?;
        let policy = UploadPolicy::from_config(&config.upload)?;
        Ok(Self::new(Arc::new(keys), policy))
    }

    pub fn keys(&self) -> &Arc<KeyLifecycleManager> {
        &self.keys
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Session boundary: the user authenticated with `secret`.
    ///
    /// On derivation failure the session is cleared so no stale state
    /// survives a failed sign-in.
    pub async fn sign_in(&self, secret: SecretString) -> UploadResult<InitOutcome> {
        match self.keys.initialize_from_secret(secret).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("sign-in key derivation failed; clearing session");
                self.keys.clear();
                Err(e.into())
            }
        }
    }

    /// Session boundary: the user logged out or the session ended.
    pub fn sign_out(&self) {
        self.keys.clear();
    }

    /// Validate and encrypt an uploaded file.
    pub async fn seal(&self, upload: Upload) -> UploadResult<SealedDocument> {
        let Upload {
            name,
            mime_type,
            bytes,
        } = upload;
        let bytes = Zeroizing::new(bytes);

        if let Err(e) = self.policy.validate(&name, &mime_type, bytes.len() as u64) {
            warn!(name = %name, mime_type = %mime_type, "upload rejected: {e}");
            return Err(e.into());
        }

        let key = self.require_key()?;
        let encrypted = tokio::task::spawn_blocking(move || FileCipher::encrypt(&bytes, &key))
            .await
            .map_err(|e| UploadError::EncryptionFailure(format!("encryption task failed: {e}")))??;

        let metadata = FileMetadata::new(name, mime_type, encrypted.original_size);
        info!(
            name = %metadata.name,
            size = metadata.original_size,
            algorithm = %encrypted.envelope.algorithm(),
            "document sealed"
        );

        Ok(SealedDocument {
            envelope: encrypted.envelope,
            metadata,
        })
    }

    /// Decrypt a previously sealed document.
    pub async fn open(&self, document: &SealedDocument) -> UploadResult<OpenedDocument> {
        let key = self.require_key()?;
        let envelope = document.envelope.clone();
        let metadata = document.metadata.clone();

        let result = tokio::task::spawn_blocking(move || {
            FileCipher::decrypt(&envelope, &key, &metadata).map(|bytes| (metadata, bytes))
        })
        .await;

        match result {
            Ok(Ok((metadata, bytes))) => {
                debug!(name = %metadata.name, size = bytes.len(), "document opened");
                Ok(OpenedDocument { metadata, bytes })
            }
            Ok(Err(_)) | Err(_) => {
                warn!(name = %document.metadata.name, "document could not be opened");
                Err(UploadError::CannotOpen)
            }
        }
    }

    /// Encrypt a sensitive text field with the session key.
    pub fn seal_text(&self, text: &str) -> UploadResult<CipherEnvelope> {
        let key = self.require_key()?;
        Ok(FileCipher::encrypt_text(text, &key)?)
    }

    /// Decrypt a text field sealed with [`seal_text`](Self::seal_text).
    pub fn open_text(&self, envelope: &CipherEnvelope) -> UploadResult<Zeroizing<String>> {
        let key = self.require_key()?;
        FileCipher::decrypt_text(envelope, &key).map_err(|_| {
            warn!("text field could not be opened");
            UploadError::CannotOpen
        })
    }

    fn require_key(&self) -> UploadResult<Arc<KeyMaterial>> {
        match self.keys.active_key() {
            KeyState::Active(key) => Ok(key),
            KeyState::Unavailable => {
                warn!("no active session key; re-authentication required");
                Err(UploadError::KeyUnavailable)
            }
        }
    }
}
