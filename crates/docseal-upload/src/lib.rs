//! docseal-upload: the caller-facing side of document encryption
//!
//! `SecureUploadOrchestrator` is the only component that combines the
//! session key with the file cipher:
//!
//! ```text
//! seal:  Upload --validate--> key? --FileCipher::encrypt--> SealedDocument
//! open:  SealedDocument --key?--> FileCipher::decrypt --> OpenedDocument
//! ```
//!
//! Failures are typed (`UploadError`) and collapse into a small set of
//! `UserAction`s for the host UI.

pub mod error;
pub mod orchestrator;
pub mod policy;

pub use error::{UploadError, UploadResult, ValidationError};
pub use orchestrator::{OpenedDocument, SealedDocument, SecureUploadOrchestrator, Upload};
pub use policy::{AcceptRule, UploadPolicy};
