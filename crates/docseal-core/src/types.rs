use serde::{Deserialize, Serialize};

/// Descriptive metadata stored next to (never inside) an encrypted file.
///
/// Field names serialize as `name`/`type`/`size` so the record can sit in
/// the same JSON document as the host's other attachment fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Original filename
    pub name: String,
    /// Declared MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Plaintext size in bytes
    #[serde(rename = "size")]
    pub original_size: u64,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, original_size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            original_size,
        }
    }

    /// Whether the file can be previewed inline as an image.
    pub fn is_image(&self) -> bool {
        self.mime_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

/// The closed set of recovery actions a host UI offers after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    /// Transient failure: try the same operation again
    Retry,
    /// No usable session key: sign in again
    Reauthenticate,
    /// The selected file was rejected: pick another one
    ChooseDifferentFile,
}

impl UserAction {
    /// Short prompt suitable for display.
    pub fn prompt(&self) -> &'static str {
        match self {
            UserAction::Retry => "Please try again.",
            UserAction::Reauthenticate => "Please sign in again.",
            UserAction::ChooseDifferentFile => "Please choose a different file.",
        }
    }
}
