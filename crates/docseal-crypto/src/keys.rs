//! Session key material

use std::fmt;

use zeroize::Zeroize;

use crate::KEY_SIZE;

/// How a [`KeyMaterial`] was produced.
///
/// Keys derived under different KDF parameters carry different tags, so a
/// future parameter change never silently mixes with older keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// Argon2id v0x13 with the given cost parameters
    Argon2id {
        mem_cost_kib: u32,
        time_cost: u32,
        parallelism: u32,
    },
    /// Raw bytes supplied by the caller (tests, fixtures)
    Raw,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Argon2id {
                mem_cost_kib,
                time_cost,
                parallelism,
            } => write!(
                f,
                "argon2id-v19-m{mem_cost_kib}-t{time_cost}-p{parallelism}"
            ),
            KeyAlgorithm::Raw => f.write_str("raw"),
        }
    }
}

/// A 256-bit symmetric key plus its algorithm tag.
///
/// Not `Clone` and not serializable: the session key manager owns the single
/// instance and hands out shared read-only references. Zeroized on drop.
pub struct KeyMaterial {
    bytes: [u8; KEY_SIZE],
    algorithm: KeyAlgorithm,
}

impl KeyMaterial {
    pub fn new(bytes: [u8; KEY_SIZE], algorithm: KeyAlgorithm) -> Self {
        Self { bytes, algorithm }
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self::new(bytes, KeyAlgorithm::Raw)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bytes", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_bytes() {
        let key = KeyMaterial::from_bytes([0xABu8; KEY_SIZE]);
        let rendered = format!("{key:?}");

        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("171"), "raw byte values must not appear");
    }

    #[test]
    fn test_algorithm_tag_display() {
        let tag = KeyAlgorithm::Argon2id {
            mem_cost_kib: 65536,
            time_cost: 3,
            parallelism: 4,
        };
        assert_eq!(tag.to_string(), "argon2id-v19-m65536-t3-p4");
        assert_eq!(KeyAlgorithm::Raw.to_string(), "raw");
    }

    #[test]
    fn test_different_params_are_distinguishable() {
        let a = KeyAlgorithm::Argon2id {
            mem_cost_kib: 65536,
            time_cost: 3,
            parallelism: 4,
        };
        let b = KeyAlgorithm::Argon2id {
            mem_cost_kib: 65536,
            time_cost: 4,
            parallelism: 4,
        };
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }
}
