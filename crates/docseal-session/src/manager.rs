//! Key lifecycle manager: shared state for the single active session key

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use docseal_core::DocsealConfig;
use docseal_crypto::{derive_key, CryptoError, CryptoResult, KdfParams, KeyMaterial, Salt};
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::salt::SaltPolicy;

/// Result of asking for the session key.
#[derive(Debug, Clone)]
pub enum KeyState {
    Active(Arc<KeyMaterial>),
    /// No key: the caller should prompt for re-authentication
    Unavailable,
}

impl KeyState {
    pub fn is_active(&self) -> bool {
        matches!(self, KeyState::Active(_))
    }

    pub fn into_key(self) -> Option<Arc<KeyMaterial>> {
        match self {
            KeyState::Active(key) => Some(key),
            KeyState::Unavailable => None,
        }
    }
}

/// What `initialize_from_secret` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new key was derived and is now active
    Derived,
    /// A key was already active and was kept
    AlreadyActive,
    /// `clear` ran while the key was being derived; the new key was discarded
    Abandoned,
}

#[derive(Default)]
struct Slot {
    key: Option<Arc<KeyMaterial>>,
    /// Bumped by every `clear`
    epoch: u64,
    /// Salt for the current session under `SaltPolicy::PerSession`
    session_salt: Option<Salt>,
}

/// Snapshot taken before a derivation starts.
struct PendingInit {
    epoch: u64,
    salt: Salt,
}

/// Owns the session key.
///
/// Only this type creates or drops key material. Callers receive
/// `Arc<KeyMaterial>` references that stay valid for operations already in
/// flight; the bytes are zeroized once the last reference goes away.
pub struct KeyLifecycleManager {
    params: KdfParams,
    salt_policy: SaltPolicy,
    slot: RwLock<Slot>,
    /// Serializes initializations so two sign-ins never both derive
    init_lock: Mutex<()>,
    derivations: AtomicU64,
}

impl KeyLifecycleManager {
    pub fn new(params: KdfParams, salt_policy: SaltPolicy) -> Self {
        Self {
            params,
            salt_policy,
            slot: RwLock::new(Slot::default()),
            init_lock: Mutex::new(()),
            derivations: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &DocsealConfig) -> CryptoResult<Self> {
        let params = KdfParams::from_config(&config.kdf)?;
        let salt_policy = SaltPolicy::from_config(&config.kdf)?;
        Ok(Self::new(params, salt_policy))
    }

    /// Derive and install the session key unless one is already active.
    ///
    /// An active key is never replaced; call [`clear`](Self::clear) first.
    /// Derivation runs on a blocking thread.
    pub async fn initialize_from_secret(&self, secret: SecretString) -> CryptoResult<InitOutcome> {
        let _init = self.init_lock.lock().await;

        let Some(pending) = self.begin_init()? else {
            return Ok(InitOutcome::AlreadyActive);
        };

        let params = self.params.clone();
        let salt = pending.salt.clone();
        let key = tokio::task::spawn_blocking(move || derive_key(&secret, &salt, &params))
            .await
            .map_err(|e| CryptoError::Derivation(format!("derivation task failed: {e}")))??;
        self.derivations.fetch_add(1, Ordering::Relaxed);

        Ok(self.finish_init(pending, key))
    }

    /// Current key, if any. Never derives and never blocks on derivation.
    pub fn active_key(&self) -> KeyState {
        match &self.read_slot().key {
            Some(key) => KeyState::Active(Arc::clone(key)),
            None => KeyState::Unavailable,
        }
    }

    pub fn is_active(&self) -> bool {
        self.read_slot().key.is_some()
    }

    /// Drop the session key and end the session. Idempotent.
    ///
    /// Any derivation still running when this is called is abandoned.
    pub fn clear(&self) {
        let mut slot = self.write_slot();
        let had_key = slot.key.take().is_some();
        slot.session_salt = None;
        slot.epoch = slot.epoch.wrapping_add(1);

        if had_key {
            info!(epoch = slot.epoch, "session key cleared");
        } else {
            debug!(epoch = slot.epoch, "clear with no active session key");
        }
    }

    /// Number of `clear` calls so far.
    pub fn epoch(&self) -> u64 {
        self.read_slot().epoch
    }

    /// Number of completed key derivations.
    pub fn derivation_count(&self) -> u64 {
        self.derivations.load(Ordering::Relaxed)
    }

    fn begin_init(&self) -> CryptoResult<Option<PendingInit>> {
        let mut slot = self.write_slot();
        if slot.key.is_some() {
            debug!("session key already active; initialization skipped");
            return Ok(None);
        }

        let salt = match &self.salt_policy {
            SaltPolicy::Fixed(salt) => salt.clone(),
            SaltPolicy::PerSession => match &slot.session_salt {
                Some(salt) => salt.clone(),
                None => {
                    let salt = Salt::generate()?;
                    slot.session_salt = Some(salt.clone());
                    salt
                }
            },
        };

        Ok(Some(PendingInit {
            epoch: slot.epoch,
            salt,
        }))
    }

    fn finish_init(&self, pending: PendingInit, key: KeyMaterial) -> InitOutcome {
        let mut slot = self.write_slot();
        if slot.epoch != pending.epoch {
            info!(
                started = pending.epoch,
                now = slot.epoch,
                "session cleared during key derivation; derived key discarded"
            );
            return InitOutcome::Abandoned;
        }
        if slot.key.is_some() {
            return InitOutcome::AlreadyActive;
        }

        info!(algorithm = %key.algorithm(), epoch = slot.epoch, "session key initialized");
        slot.key = Some(Arc::new(key));
        InitOutcome::Derived
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for KeyLifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLifecycleManager")
            .field("params", &self.params)
            .field("salt_policy", &self.salt_policy)
            .field("active", &self.is_active())
            .field("epoch", &self.epoch())
            .finish()
    }
}
