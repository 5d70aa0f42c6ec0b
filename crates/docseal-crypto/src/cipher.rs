//! Whole-file AES-256-GCM encryption/decryption
//!
//! Every call draws a fresh 96-bit nonce from the OS RNG; callers can never
//! supply one. Decryption verifies the tag before any plaintext is released
//! and fails closed with [`CryptoError::Integrity`].
//!
//! Operates on whole in-memory buffers. Size limits are the caller's job.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use docseal_core::FileMetadata;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::envelope::{CipherEnvelope, EnvelopeAlgorithm};
use crate::error::{CryptoError, CryptoResult};
use crate::keys::KeyMaterial;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Output of [`FileCipher::encrypt`]: the envelope plus the part of the
/// file metadata the cipher knows about.
#[derive(Debug, Clone)]
pub struct EncryptedFile {
    pub envelope: CipherEnvelope,
    /// Plaintext length in bytes
    pub original_size: u64,
}

/// Stateless authenticated file cipher.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCipher;

impl FileCipher {
    /// Encrypt a whole file under `key` with a fresh random nonce.
    pub fn encrypt(plaintext: &[u8], key: &KeyMaterial) -> CryptoResult<EncryptedFile> {
        let envelope = seal(plaintext, key, random_nonce()?)?;
        tracing::debug!(
            algorithm = %envelope.algorithm(),
            bytes = plaintext.len(),
            "encrypted file"
        );
        Ok(EncryptedFile {
            envelope,
            original_size: plaintext.len() as u64,
        })
    }

    /// Decrypt a file and check its length against `metadata`.
    ///
    /// Wrong key, modified ciphertext or tag, and size mismatch all return
    /// [`CryptoError::Integrity`] with no plaintext.
    pub fn decrypt(
        envelope: &CipherEnvelope,
        key: &KeyMaterial,
        metadata: &FileMetadata,
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let plaintext = open(envelope, key)?;
        if plaintext.len() as u64 != metadata.original_size {
            tracing::debug!(
                expected = metadata.original_size,
                actual = plaintext.len(),
                "decrypted size does not match metadata"
            );
            return Err(CryptoError::Integrity);
        }
        Ok(plaintext)
    }

    /// Encrypt a sensitive text field.
    pub fn encrypt_text(text: &str, key: &KeyMaterial) -> CryptoResult<CipherEnvelope> {
        seal(text.as_bytes(), key, random_nonce()?)
    }

    /// Decrypt a text field sealed with [`FileCipher::encrypt_text`].
    pub fn decrypt_text(
        envelope: &CipherEnvelope,
        key: &KeyMaterial,
    ) -> CryptoResult<Zeroizing<String>> {
        let mut plaintext = open(envelope, key)?;
        let bytes = std::mem::take(&mut *plaintext);
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Zeroizing::new(text)),
            Err(e) => {
                drop(Zeroizing::new(e.into_bytes()));
                Err(CryptoError::Integrity)
            }
        }
    }

    /// Encrypt with a caller-chosen nonce, for reproducible test vectors.
    #[cfg(test)]
    pub(crate) fn encrypt_with_nonce(
        plaintext: &[u8],
        key: &KeyMaterial,
        nonce: [u8; NONCE_SIZE],
    ) -> CryptoResult<CipherEnvelope> {
        seal(plaintext, key, nonce)
    }
}

fn random_nonce() -> CryptoResult<[u8; NONCE_SIZE]> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::Encryption(format!("entropy source unavailable: {e}")))?;
    Ok(nonce)
}

fn seal(
    plaintext: &[u8],
    key: &KeyMaterial,
    nonce: [u8; NONCE_SIZE],
) -> CryptoResult<CipherEnvelope> {
    let algorithm = EnvelopeAlgorithm::Aes256GcmV1;
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut sealed = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: algorithm.tag().as_bytes(),
            },
        )
        .map_err(|e| CryptoError::Encryption(format!("AES-256-GCM: {e}")))?;

    if sealed.len() < TAG_SIZE {
        return Err(CryptoError::Encryption("AEAD output shorter than tag".into()));
    }
    let tag_bytes = sealed.split_off(sealed.len() - TAG_SIZE);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&tag_bytes);

    Ok(CipherEnvelope::new(algorithm, nonce, sealed, tag))
}

fn open(envelope: &CipherEnvelope, key: &KeyMaterial) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let aad = match envelope.algorithm() {
        EnvelopeAlgorithm::Aes256GcmV1 => envelope.algorithm().tag().as_bytes(),
    };
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(
            Nonce::from_slice(envelope.nonce()),
            Payload {
                msg: &envelope.sealed_payload(),
                aad,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Integrity)
}
