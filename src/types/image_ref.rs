// ABOUTME: Container image reference validation.
// ABOUTME: Accepts repo[:tag][@digest] and keeps the original text verbatim for the task definition.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0:?}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),
}

/// An image reference as written into a container definition.
///
/// Unlike a registry client, the task definition wants the exact string the
/// user configured, so no `:latest` is implied and `Display` round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    raw: String,
    repository_end: usize,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        if let Some(c) = raw
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !"/:.-_@".contains(*c))
        {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        let (without_digest, digest) = match raw.split_once('@') {
            Some((before, after)) if !after.is_empty() => (before, Some(after.to_string())),
            Some(_) => return Err(ParseImageRefError::InvalidFormat(raw.to_string())),
            None => (raw, None),
        };

        // A colon followed by a slash belongs to a registry port, not a tag.
        let (repository, tag) = match without_digest.rsplit_once(':') {
            Some((before, after)) if !after.contains('/') => {
                if after.is_empty() {
                    return Err(ParseImageRefError::InvalidFormat(raw.to_string()));
                }
                (before, Some(after.to_string()))
            }
            _ => (without_digest, None),
        };

        if repository.is_empty() || repository.ends_with('/') || repository.starts_with('/') {
            return Err(ParseImageRefError::InvalidFormat(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            repository_end: repository.len(),
            tag,
            digest,
        })
    }

    /// Registry and repository path, without tag or digest.
    pub fn repository(&self) -> &str {
        &self.raw[..self.repository_end]
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
