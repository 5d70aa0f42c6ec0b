//! Upload validation: size limit and typed allow-list
//!
//! Accepted-type strings are parsed once, at configuration time:
//!
//! | string             | rule                                  |
//! |--------------------|---------------------------------------|
//! | `image/*`          | any MIME type in the `image` category |
//! | `application/pdf`  | that exact MIME type                  |
//! | `.pdf`             | filename extension                    |
//!
//! Matching is ASCII case-insensitive and ignores MIME parameters
//! (`text/plain; charset=utf-8` is `text/plain`).

use std::fmt;
use std::str::FromStr;

use docseal_core::config::UploadConfig;
use docseal_core::DocsealError;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptRule {
    /// `type/*`, holds the lowercase `type`
    MimeCategory(String),
    /// `type/subtype`, lowercase
    MimeExact(String),
    /// `.ext`, lowercase, dot included
    Extension(String),
}

impl AcceptRule {
    pub fn matches(&self, name: &str, mime_type: &str) -> bool {
        let mime = essence(mime_type);
        match self {
            AcceptRule::MimeCategory(category) => mime
                .split_once('/')
                .is_some_and(|(top, _)| top == category.as_str()),
            AcceptRule::MimeExact(exact) => mime == *exact,
            AcceptRule::Extension(ext) => name.to_ascii_lowercase().ends_with(ext.as_str()),
        }
    }
}

impl FromStr for AcceptRule {
    type Err = DocsealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rule = s.trim().to_ascii_lowercase();
        let invalid = |why: &str| DocsealError::Config(format!("accepted type {s:?}: {why}"));

        if let Some(ext) = rule.strip_prefix('.') {
            if ext.is_empty() || ext.contains(['/', '.', '*']) {
                return Err(invalid("bad extension"));
            }
            return Ok(AcceptRule::Extension(format!(".{ext}")));
        }

        match rule.split_once('/') {
            Some((top, "*")) if is_token(top) => Ok(AcceptRule::MimeCategory(top.to_string())),
            Some((top, sub)) if is_token(top) && is_token(sub) => {
                Ok(AcceptRule::MimeExact(format!("{top}/{sub}")))
            }
            _ => Err(invalid("expected `type/*`, `type/subtype` or `.ext`")),
        }
    }
}

impl fmt::Display for AcceptRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptRule::MimeCategory(category) => write!(f, "{category}/*"),
            AcceptRule::MimeExact(exact) => f.write_str(exact),
            AcceptRule::Extension(ext) => f.write_str(ext),
        }
    }
}

/// Size and type constraints checked before a file is encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    max_size_bytes: u64,
    accepted: Vec<AcceptRule>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: 10 * 1024 * 1024,
            accepted: vec![
                AcceptRule::MimeCategory("image".into()),
                AcceptRule::Extension(".pdf".into()),
            ],
        }
    }
}

impl UploadPolicy {
    pub fn new(max_size_bytes: u64, accepted: Vec<AcceptRule>) -> Self {
        Self {
            max_size_bytes,
            accepted,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Result<Self, DocsealError> {
        if config.accepted_types.is_empty() {
            return Err(DocsealError::Config(
                "upload.accepted_types must not be empty".into(),
            ));
        }
        let accepted = config
            .accepted_types
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<AcceptRule>, _>>()?;
        Ok(Self::new(config.max_size_bytes(), accepted))
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn accepted(&self) -> &[AcceptRule] {
        &self.accepted
    }

    /// Check a file against the policy. Size is checked before type.
    pub fn validate(&self, name: &str, mime_type: &str, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::Empty);
        }
        if size > self.max_size_bytes {
            return Err(ValidationError::TooLarge {
                size,
                max: self.max_size_bytes,
            });
        }
        if !self.accepted.iter().any(|rule| rule.matches(name, mime_type)) {
            return Err(ValidationError::TypeNotAllowed {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
            });
        }
        Ok(())
    }
}

fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
}
