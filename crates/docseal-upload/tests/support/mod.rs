//! Shared setup for the orchestrator integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use docseal_crypto::{KdfParams, Salt};
use docseal_session::{KeyLifecycleManager, SaltPolicy};
use docseal_upload::{AcceptRule, SecureUploadOrchestrator, UploadPolicy};
use secrecy::SecretString;

pub const PASSWORD: &str = "correct-password";

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (`cargo test -- --nocapture`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Fast KDF and a fixed salt, so signing in again reproduces the key.
pub fn manager() -> Arc<KeyLifecycleManager> {
    Arc::new(KeyLifecycleManager::new(
        KdfParams::insecure_fast(),
        SaltPolicy::Fixed(Salt::from_bytes([7u8; 16])),
    ))
}

/// Default policy plus `text/plain`, with a small size limit.
pub fn policy(max_size_bytes: u64) -> UploadPolicy {
    let accepted: Vec<AcceptRule> = ["image/*", ".pdf", "text/plain"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    UploadPolicy::new(max_size_bytes, accepted)
}

pub fn orchestrator() -> SecureUploadOrchestrator {
    init_tracing();
    SecureUploadOrchestrator::new(manager(), policy(1024 * 1024))
}

pub fn secret(s: &str) -> SecretString {
    SecretString::from(s)
}
