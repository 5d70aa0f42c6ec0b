//! Text encoding of an encrypted file
//!
//! ```text
//! docseal.v1.aes256gcm:<b64 nonce>:<b64 ciphertext||tag>
//! ```
//!
//! Standard base64 with padding. `:` is outside the base64 alphabet, so the
//! three segments split unambiguously. The envelope is self-describing but
//! meaningless without the `FileMetadata` it was created against.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;
use crate::{NONCE_SIZE, TAG_SIZE};

const DELIMITER: char = ':';

/// Cipher and mode an envelope was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeAlgorithm {
    /// AES-256-GCM, 96-bit nonce, 128-bit tag, algorithm tag as AAD
    Aes256GcmV1,
}

impl EnvelopeAlgorithm {
    pub fn tag(&self) -> &'static str {
        match self {
            EnvelopeAlgorithm::Aes256GcmV1 => "docseal.v1.aes256gcm",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "docseal.v1.aes256gcm" => Some(EnvelopeAlgorithm::Aes256GcmV1),
            _ => None,
        }
    }
}

impl fmt::Display for EnvelopeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One encrypted file: algorithm tag, nonce, ciphertext and authentication tag.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    algorithm: EnvelopeAlgorithm,
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
    tag: [u8; TAG_SIZE],
}

impl CipherEnvelope {
    pub(crate) fn new(
        algorithm: EnvelopeAlgorithm,
        nonce: [u8; NONCE_SIZE],
        ciphertext: Vec<u8>,
        tag: [u8; TAG_SIZE],
    ) -> Self {
        Self {
            algorithm,
            nonce,
            ciphertext,
            tag,
        }
    }

    pub fn algorithm(&self) -> EnvelopeAlgorithm {
        self.algorithm
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// Ciphertext without the tag; same length as the plaintext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn auth_tag(&self) -> &[u8; TAG_SIZE] {
        &self.tag
    }

    /// Ciphertext followed by the tag, the layout AEAD decryption expects.
    pub(crate) fn sealed_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.ciphertext.len() + TAG_SIZE);
        payload.extend_from_slice(&self.ciphertext);
        payload.extend_from_slice(&self.tag);
        payload
    }

    /// Encode as the single-line text form.
    pub fn encode(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.algorithm.tag(),
            B64.encode(self.nonce),
            B64.encode(self.sealed_payload())
        )
    }

    /// Parse the text form produced by [`CipherEnvelope::encode`].
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let mut segments = encoded.trim().split(DELIMITER);
        let (Some(tag), Some(nonce_b64), Some(payload_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(CryptoError::MalformedEnvelope(
                "expected exactly three ':'-separated segments".into(),
            ));
        };

        let algorithm = EnvelopeAlgorithm::from_tag(tag).ok_or_else(|| {
            CryptoError::MalformedEnvelope(format!("unknown algorithm tag: {tag:?}"))
        })?;

        let nonce_bytes = B64
            .decode(nonce_b64)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("nonce base64: {e}")))?;
        let nonce: [u8; NONCE_SIZE] = nonce_bytes.as_slice().try_into().map_err(|_| {
            CryptoError::MalformedEnvelope(format!(
                "nonce must be {NONCE_SIZE} bytes, got {}",
                nonce_bytes.len()
            ))
        })?;

        let mut payload = B64
            .decode(payload_b64)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("ciphertext base64: {e}")))?;
        if payload.len() < TAG_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "ciphertext too short: {} bytes (minimum {TAG_SIZE})",
                payload.len()
            )));
        }

        let tag_bytes = payload.split_off(payload.len() - TAG_SIZE);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&tag_bytes);

        Ok(Self::new(algorithm, nonce, payload, tag))
    }
}

impl fmt::Display for CipherEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for CipherEnvelope {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Debug for CipherEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEnvelope")
            .field("algorithm", &self.algorithm)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

impl Serialize for CipherEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for CipherEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::decode(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CipherEnvelope {
        CipherEnvelope::new(
            EnvelopeAlgorithm::Aes256GcmV1,
            [7u8; NONCE_SIZE],
            b"ciphertext".to_vec(),
            [9u8; TAG_SIZE],
        )
    }

    #[test]
    fn test_encoded_layout() {
        let encoded = sample().encode();
        let segments: Vec<&str> = encoded.split(':').collect();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], "docseal.v1.aes256gcm");
        assert_eq!(segments[1], B64.encode([7u8; NONCE_SIZE]));

        let mut payload = b"ciphertext".to_vec();
        payload.extend_from_slice(&[9u8; TAG_SIZE]);
        assert_eq!(segments[2], B64.encode(&payload));
    }

    #[test]
    fn test_decode_restores_fields() {
        let original = sample();
        let decoded: CipherEnvelope = original.encode().parse().unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.ciphertext(), b"ciphertext");
        assert_eq!(decoded.auth_tag(), &[9u8; TAG_SIZE]);
    }

    #[test]
    fn test_empty_ciphertext_is_valid() {
        let env = CipherEnvelope::new(
            EnvelopeAlgorithm::Aes256GcmV1,
            [0u8; NONCE_SIZE],
            Vec::new(),
            [1u8; TAG_SIZE],
        );
        let decoded = CipherEnvelope::decode(&env.encode()).unwrap();
        assert!(decoded.ciphertext().is_empty());
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        let nonce = B64.encode([0u8; NONCE_SIZE]);
        for input in [
            String::new(),
            "docseal.v1.aes256gcm".to_string(),
            format!("docseal.v1.aes256gcm:{nonce}"),
            format!("docseal.v1.aes256gcm:{nonce}:AAAA:extra"),
        ] {
            assert!(
                matches!(
                    CipherEnvelope::decode(&input),
                    Err(CryptoError::MalformedEnvelope(_))
                ),
                "{input:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        let encoded = sample().encode().replacen("docseal.v1", "docseal.v2", 1);
        assert!(CipherEnvelope::decode(&encoded).is_err());
    }

    #[test]
    fn test_rejects_legacy_key_prefixed_format() {
        // "ENC:<key>:<data>" carried its own key; it must never parse.
        let legacy = format!("ENC:{}:{}", B64.encode([1u8; 32]), B64.encode(b"data"));
        assert!(CipherEnvelope::decode(&legacy).is_err());
    }

    #[test]
    fn test_rejects_bad_nonce_length() {
        let encoded = format!(
            "docseal.v1.aes256gcm:{}:{}",
            B64.encode([0u8; 24]),
            B64.encode([0u8; TAG_SIZE])
        );
        assert!(CipherEnvelope::decode(&encoded).is_err());
    }

    #[test]
    fn test_rejects_payload_shorter_than_tag() {
        let encoded = format!(
            "docseal.v1.aes256gcm:{}:{}",
            B64.encode([0u8; NONCE_SIZE]),
            B64.encode([0u8; TAG_SIZE - 1])
        );
        assert!(CipherEnvelope::decode(&encoded).is_err());
    }

    #[test]
    fn test_serde_as_json_string() {
        let env = sample();
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, format!("\"{}\"", env.encode()));

        let back: CipherEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);

        let bad: Result<CipherEnvelope, _> = serde_json::from_str("\"garbage\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_debug_omits_bytes() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("ciphertext_len: 10"));
        assert!(!rendered.contains("nonce"));
    }
}
