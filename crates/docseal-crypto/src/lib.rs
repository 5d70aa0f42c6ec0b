//! docseal-crypto: whole-file authenticated encryption for sensitive documents
//!
//! Session key = Argon2id(secret, salt). Each file is sealed independently:
//!
//! ```text
//! envelope = "docseal.v1.aes256gcm" ":" b64(nonce) ":" b64(ciphertext || tag)
//!   nonce = 96-bit, fresh from the OS RNG per call
//!   AAD   = the algorithm tag
//! ```
//!
//! The envelope never contains key material. Name, MIME type and size travel
//! separately as [`FileMetadata`](docseal_core::FileMetadata).

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod keys;

pub use cipher::{EncryptedFile, FileCipher};
pub use envelope::{CipherEnvelope, EnvelopeAlgorithm};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_key, KdfParams, Salt};
pub use keys::{KeyAlgorithm, KeyMaterial};

/// Size of a session key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of a KDF salt
pub const SALT_SIZE: usize = 16;
