//! docseal-session: session-scoped key lifecycle
//!
//! `KeyLifecycleManager` is the only owner of session key material. It is
//! created by the host and injected where keys are needed; there is no
//! process-global instance.
//!
//! ```text
//! Uninitialized --initialize_from_secret--> Active --clear--> Uninitialized
//! ```

pub mod manager;
pub mod salt;

pub use manager::{InitOutcome, KeyLifecycleManager, KeyState};
pub use salt::SaltPolicy;
