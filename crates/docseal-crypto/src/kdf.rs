//! Key derivation: Argon2id secret + salt → session key

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use docseal_core::config::KdfConfig;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{KeyAlgorithm, KeyMaterial};
use crate::{KEY_SIZE, SALT_SIZE};

/// A 16-byte KDF salt. Not secret; encoded as base64 for storage.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generate a random salt from the OS RNG.
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = [0u8; SALT_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Derivation(format!("salt generation: {e}")))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        B64.encode(self.0)
    }

    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let decoded = B64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Derivation(format!("salt base64 decode: {e}")))?;
        let bytes: [u8; SALT_SIZE] = decoded.as_slice().try_into().map_err(|_| {
            CryptoError::Derivation(format!(
                "salt must be {SALT_SIZE} bytes, got {}",
                decoded.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Salt").field(&self.to_base64()).finish()
    }
}

/// Argon2id parameters for KDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub mem_cost_kib: u32,
    /// Time cost / iterations (default: 3)
    pub time_cost: u32,
    /// Parallelism (default: 4)
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            mem_cost_kib: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Lowest memory cost accepted from configuration (8 MiB)
    pub const MIN_MEM_COST_KIB: u32 = 8192;

    /// Build parameters from the `[kdf]` config section, refusing work
    /// factors below the configured floor.
    pub fn from_config(config: &KdfConfig) -> CryptoResult<Self> {
        if config.argon2_mem_cost_kib < Self::MIN_MEM_COST_KIB {
            return Err(CryptoError::Derivation(format!(
                "argon2 memory cost {} KiB is below the minimum of {} KiB",
                config.argon2_mem_cost_kib,
                Self::MIN_MEM_COST_KIB
            )));
        }
        if config.argon2_time_cost == 0 || config.argon2_parallelism == 0 {
            return Err(CryptoError::Derivation(
                "argon2 time cost and parallelism must be at least 1".into(),
            ));
        }
        Ok(Self {
            mem_cost_kib: config.argon2_mem_cost_kib,
            time_cost: config.argon2_time_cost,
            parallelism: config.argon2_parallelism,
        })
    }

    /// Cheap parameters for tests. Never use for real keys.
    #[cfg(any(test, feature = "test-util"))]
    pub fn insecure_fast() -> Self {
        Self {
            mem_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Argon2id {
            mem_cost_kib: self.mem_cost_kib,
            time_cost: self.time_cost,
            parallelism: self.parallelism,
        }
    }
}

/// Derive a 256-bit session key from a user secret and salt using Argon2id.
///
/// CPU and memory heavy: async callers run this on a blocking thread.
/// An empty or whitespace-only secret is rejected.
pub fn derive_key(
    secret: &SecretString,
    salt: &Salt,
    params: &KdfParams,
) -> CryptoResult<KeyMaterial> {
    let secret = secret.expose_secret();
    if secret.trim().is_empty() {
        return Err(CryptoError::Derivation("secret must not be empty".into()));
    }

    let argon2_params = Params::new(
        params.mem_cost_kib,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::Derivation(format!("invalid Argon2id params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(secret.as_bytes(), salt.as_bytes(), &mut key)
        .map_err(|e| CryptoError::Derivation(format!("Argon2id KDF failed: {e}")))?;

    let material = KeyMaterial::new(key, params.algorithm());
    key.zeroize();

    tracing::debug!(algorithm = %material.algorithm(), "derived session key");
    Ok(material)
}
