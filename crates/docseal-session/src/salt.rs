//! Where the KDF salt for a session comes from

use docseal_core::config::KdfConfig;
use docseal_crypto::{CryptoResult, Salt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaltPolicy {
    /// Configured salt. Signing in again with the same secret reproduces
    /// the same key, so documents from earlier sessions stay readable.
    Fixed(Salt),
    /// Random salt generated at the first sign-in and forgotten on `clear`.
    /// Documents do not outlive the session.
    PerSession,
}

impl SaltPolicy {
    /// `Fixed` if `[kdf] salt` is set, otherwise `PerSession`.
    pub fn from_config(config: &KdfConfig) -> CryptoResult<Self> {
        match &config.salt {
            Some(encoded) => Ok(SaltPolicy::Fixed(Salt::from_base64(encoded)?)),
            None => Ok(SaltPolicy::PerSession),
        }
    }
}
